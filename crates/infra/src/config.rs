//! Configuration loading and representation.
//!
//! Everything is read from the environment; unset or malformed values fall
//! back to defaults so a dev machine works without any setup.

use evbill_core::Region;
use evbill_invoicing::{DEFAULT_PAD_WIDTH, DocumentSequence};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_UAE_PREFIX: &str = "INV-UAE-";
const DEFAULT_SAUDI_PREFIX: &str = "INV-KSA-";

/// Runtime configuration of the billing stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub uae_invoice_prefix: String,
    pub saudi_invoice_prefix: String,
    pub sequence_pad_width: usize,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            uae_invoice_prefix: DEFAULT_UAE_PREFIX.to_string(),
            saudi_invoice_prefix: DEFAULT_SAUDI_PREFIX.to_string(),
            sequence_pad_width: DEFAULT_PAD_WIDTH,
        }
    }
}

impl BillingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            max_connections: parse_or(
                &lookup,
                "EVBILL_DB_MAX_CONNECTIONS",
                defaults.max_connections,
            ),
            uae_invoice_prefix: prefix_or(
                &lookup,
                "EVBILL_INVOICE_PREFIX_UAE",
                defaults.uae_invoice_prefix,
            ),
            saudi_invoice_prefix: prefix_or(
                &lookup,
                "EVBILL_INVOICE_PREFIX_SAUDI",
                defaults.saudi_invoice_prefix,
            ),
            sequence_pad_width: parse_or(
                &lookup,
                "EVBILL_SEQUENCE_PAD_WIDTH",
                defaults.sequence_pad_width,
            ),
        }
    }

    pub fn invoice_prefix(&self, region: Region) -> &str {
        match region {
            Region::Uae => &self.uae_invoice_prefix,
            Region::Saudi => &self.saudi_invoice_prefix,
        }
    }

    /// Seed rows for the per-region invoice sequences (counter at zero).
    pub fn sequences(&self) -> Vec<DocumentSequence> {
        Region::ALL
            .iter()
            .map(|region| DocumentSequence::new(*region, self.invoice_prefix(*region)))
            .collect()
    }
}

/// Invoice prefixes must be non-empty and end in a non-digit so the counter
/// can be read back from an issued number.
fn prefix_or<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) if raw.chars().last().is_some_and(|c| !c.is_ascii_digit()) => raw,
        Some(raw) => {
            tracing::warn!(key, value = %raw, %default, "invoice prefix must end in a non-digit; using default");
            default
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr + core::fmt::Display + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "invalid config value; using default");
            default
        }),
    }
}
