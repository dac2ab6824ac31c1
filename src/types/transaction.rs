//! Transaction data structures for fraud scoring

use serde::{Deserialize, Serialize};

/// Allowed transaction types.
pub const TRANSACTION_TYPES: &[&str] = &["ATM Withdrawal", "POS", "Online", "Transfer", "Payment"];

/// Allowed device types.
pub const DEVICE_TYPES: &[&str] = &["Mobile", "Laptop", "Tablet", "Desktop"];

/// Allowed card types.
pub const CARD_TYPES: &[&str] = &["Visa", "Mastercard", "Discover", "Amex"];

/// Allowed authentication methods.
pub const AUTH_METHODS: &[&str] = &["Biometric", "Password", "PIN", "OTP"];

/// One inbound fraud-scoring request's feature payload.
///
/// Only `transaction_amount` is required on the wire; every other field
/// defaults so that minimal payloads still score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction amount (must be positive)
    pub transaction_amount: f64,

    /// Account balance at transaction time
    #[serde(default)]
    pub account_balance: f64,

    /// Average transaction amount over the last 7 days
    #[serde(default)]
    pub avg_transaction_amount_7d: f64,

    /// Failed transactions over the last 7 days
    #[serde(default)]
    pub failed_transaction_count_7d: f64,

    /// Transactions so far today
    #[serde(default)]
    pub daily_transaction_count: u32,

    /// Count of previous confirmed fraudulent activity
    #[serde(default)]
    pub previous_fraudulent_activity: u32,

    /// Upstream risk score (0.0 - 1.0)
    #[serde(default)]
    pub risk_score: f64,

    /// Card age in days
    #[serde(default)]
    pub card_age: u32,

    /// Distance from the cardholder's usual location
    #[serde(default)]
    pub transaction_distance: f64,

    /// Flagged IP address (0 or 1)
    #[serde(default)]
    pub ip_address_flag: u8,

    /// Weekend transaction (0 or 1)
    #[serde(default)]
    pub is_weekend: u8,

    /// Hour of day (0-23); current hour when omitted
    #[serde(default)]
    pub hour: Option<u32>,

    /// Month (1-12); current month when omitted
    #[serde(default)]
    pub month: Option<u32>,

    /// Type of transaction (ATM Withdrawal, POS, Online, Transfer, Payment)
    #[serde(default)]
    pub transaction_type: Option<String>,

    /// Device used (Mobile, Laptop, Tablet, Desktop)
    #[serde(default)]
    pub device_type: Option<String>,

    /// Transaction location
    #[serde(default)]
    pub location: Option<String>,

    /// Merchant category
    #[serde(default)]
    pub merchant_category: Option<String>,

    /// Card type (Visa, Mastercard, Discover, Amex)
    #[serde(default)]
    pub card_type: Option<String>,

    /// Authentication method (Biometric, Password, PIN, OTP)
    #[serde(default)]
    pub authentication_method: Option<String>,
}

impl Transaction {
    /// Create a transaction with the given amount and defaults elsewhere.
    pub fn new(transaction_amount: f64) -> Self {
        Self {
            transaction_amount,
            account_balance: 0.0,
            avg_transaction_amount_7d: 0.0,
            failed_transaction_count_7d: 0.0,
            daily_transaction_count: 0,
            previous_fraudulent_activity: 0,
            risk_score: 0.0,
            card_age: 0,
            transaction_distance: 0.0,
            ip_address_flag: 0,
            is_weekend: 0,
            hour: None,
            month: None,
            transaction_type: None,
            device_type: None,
            location: None,
            merchant_category: None,
            card_type: None,
            authentication_method: None,
        }
    }

    /// Check all domain constraints, returning the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.transaction_amount <= 0.0 {
            return Err("transaction_amount must be greater than 0".to_string());
        }
        if self.account_balance < 0.0 {
            return Err("account_balance must be non-negative".to_string());
        }
        if self.avg_transaction_amount_7d < 0.0 {
            return Err("avg_transaction_amount_7d must be non-negative".to_string());
        }
        if self.failed_transaction_count_7d < 0.0 {
            return Err("failed_transaction_count_7d must be non-negative".to_string());
        }
        if self.transaction_distance < 0.0 {
            return Err("transaction_distance must be non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.risk_score) {
            return Err("risk_score must be between 0 and 1".to_string());
        }
        if self.ip_address_flag > 1 {
            return Err("ip_address_flag must be 0 or 1".to_string());
        }
        if self.is_weekend > 1 {
            return Err("is_weekend must be 0 or 1".to_string());
        }
        if let Some(hour) = self.hour {
            if hour > 23 {
                return Err("hour must be between 0 and 23".to_string());
            }
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err("month must be between 1 and 12".to_string());
            }
        }
        Self::check_vocabulary("transaction_type", &self.transaction_type, TRANSACTION_TYPES)?;
        Self::check_vocabulary("device_type", &self.device_type, DEVICE_TYPES)?;
        Self::check_vocabulary("card_type", &self.card_type, CARD_TYPES)?;
        Self::check_vocabulary(
            "authentication_method",
            &self.authentication_method,
            AUTH_METHODS,
        )?;
        Ok(())
    }

    fn check_vocabulary(
        field: &str,
        value: &Option<String>,
        allowed: &[&str],
    ) -> Result<(), String> {
        match value {
            Some(v) if !allowed.contains(&v.as_str()) => {
                Err(format!("{} must be one of: {}", field, allowed.join(", ")))
            }
            _ => Ok(()),
        }
    }
}

/// Fields computed from raw transaction values, never supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    /// 1.0 when any transaction failed in the last 7 days, 0.0 otherwise
    pub high_failure_flag: f64,
    /// Failed transactions per daily transaction; 0.0 when no daily activity
    pub failure_rate: f64,
    /// Absolute difference between the amount and its 7-day average
    pub amount_deviation: f64,
    /// Product of the risk score and the amount
    pub risk_amount_interaction: f64,
}
