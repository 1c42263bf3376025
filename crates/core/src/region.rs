//! Operating regions.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Region a document, client or sequence belongs to.
///
/// Codes are case-sensitive and exhaustive: `"UAE"` and `"SAUDI"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "UAE")]
    Uae,
    #[serde(rename = "SAUDI")]
    Saudi,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Uae, Region::Saudi];

    /// Wire/storage code of the region.
    pub fn code(self) -> &'static str {
        match self {
            Region::Uae => "UAE",
            Region::Saudi => "SAUDI",
        }
    }
}

impl core::fmt::Display for Region {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UAE" => Ok(Region::Uae),
            "SAUDI" => Ok(Region::Saudi),
            other => Err(DomainError::invalid_id(format!("unknown region code '{other}'"))),
        }
    }
}
