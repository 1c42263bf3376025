use core::str::FromStr;
use serde::{Deserialize, Serialize};

use evbill_core::DomainError;

/// Lifecycle status shared by quotations and invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "sent" => Ok(DocumentStatus::Sent),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown document status '{other}'"))),
        }
    }
}

/// How a payment was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    BankTransfer,
    Cash,
    CreditCard,
    Cheque,
    Other,
}

impl PaymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Cash => "cash",
            PaymentMode::CreditCard => "credit_card",
            PaymentMode::Cheque => "cheque",
            PaymentMode::Other => "other",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(PaymentMode::BankTransfer),
            "cash" => Ok(PaymentMode::Cash),
            "credit_card" => Ok(PaymentMode::CreditCard),
            "cheque" => Ok(PaymentMode::Cheque),
            "other" => Ok(PaymentMode::Other),
            other => Err(DomainError::validation(format!("unknown payment mode '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_modes_parse_their_own_codes() {
        for mode in [
            PaymentMode::BankTransfer,
            PaymentMode::Cash,
            PaymentMode::CreditCard,
            PaymentMode::Cheque,
            PaymentMode::Other,
        ] {
            assert_eq!(mode.as_str().parse::<PaymentMode>().unwrap(), mode);
        }
        assert!("wire".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn statuses_parse_their_own_codes() {
        for status in [
            DocumentStatus::Draft,
            DocumentStatus::Sent,
            DocumentStatus::Approved,
            DocumentStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
        assert!("Draft".parse::<DocumentStatus>().is_err());
    }
}
