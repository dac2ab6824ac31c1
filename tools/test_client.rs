//! Test Transaction Client
//!
//! Generates random transactions and POSTs them to a running Fraud Detection
//! API instance for load and smoke testing.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Request payload matching the API's transaction schema
#[derive(Debug, Clone, Serialize)]
struct Transaction {
    transaction_amount: f64,
    account_balance: f64,
    avg_transaction_amount_7d: f64,
    failed_transaction_count_7d: f64,
    daily_transaction_count: u32,
    previous_fraudulent_activity: u32,
    risk_score: f64,
    card_age: u32,
    transaction_distance: f64,
    ip_address_flag: u8,
    is_weekend: u8,
    transaction_type: String,
    device_type: String,
    location: String,
    merchant_category: String,
    card_type: String,
    authentication_method: String,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    fraud_probability: f64,
    is_fraud: bool,
    response_time_ms: f64,
}

/// Transaction generator for testing
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a random legitimate-looking transaction
    fn generate_legitimate(&mut self) -> Transaction {
        Transaction {
            transaction_amount: self.rng.gen_range(10.0..500.0),
            account_balance: self.rng.gen_range(1000.0..50000.0),
            avg_transaction_amount_7d: self.rng.gen_range(20.0..300.0),
            failed_transaction_count_7d: 0.0,
            daily_transaction_count: self.rng.gen_range(1..8),
            previous_fraudulent_activity: 0,
            risk_score: self.rng.gen_range(0.0..0.3),
            card_age: self.rng.gen_range(180..2000),
            transaction_distance: self.rng.gen_range(0.0..200.0),
            ip_address_flag: 0,
            is_weekend: if self.rng.gen_bool(0.3) { 1 } else { 0 },
            transaction_type: self
                .random_choice(&["POS", "Online", "Payment"])
                .to_string(),
            device_type: self.random_choice(&["Mobile", "Laptop", "Desktop"]).to_string(),
            location: self.random_choice(&["London", "New York", "Paris"]).to_string(),
            merchant_category: self
                .random_choice(&["Restaurants", "Groceries", "Electronics"])
                .to_string(),
            card_type: self.random_choice(&["Visa", "Mastercard"]).to_string(),
            authentication_method: self.random_choice(&["PIN", "Biometric"]).to_string(),
        }
    }

    /// Generate a suspicious-looking transaction
    fn generate_suspicious(&mut self) -> Transaction {
        Transaction {
            transaction_amount: self.rng.gen_range(2000.0..10000.0), // High amount
            account_balance: self.rng.gen_range(0.0..2000.0),
            avg_transaction_amount_7d: self.rng.gen_range(20.0..150.0),
            failed_transaction_count_7d: self.rng.gen_range(1.0..8.0), // Failed attempts
            daily_transaction_count: self.rng.gen_range(10..30),       // Bursty
            previous_fraudulent_activity: self.rng.gen_range(1..4),
            risk_score: self.rng.gen_range(0.7..1.0),
            card_age: self.rng.gen_range(1..60), // New card
            transaction_distance: self.rng.gen_range(1000.0..8000.0),
            ip_address_flag: 1,
            is_weekend: if self.rng.gen_bool(0.5) { 1 } else { 0 },
            transaction_type: self.random_choice(&["Transfer", "Online"]).to_string(),
            device_type: self.random_choice(&["Mobile", "Tablet"]).to_string(),
            location: self.random_choice(&["Unknown", "Remote"]).to_string(),
            merchant_category: self.random_choice(&["Travel", "Electronics"]).to_string(),
            card_type: self.random_choice(&["Visa", "Discover"]).to_string(),
            authentication_method: self.random_choice(&["Password", "OTP"]).to_string(),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_client=info".parse()?),
        )
        .init();

    info!("Starting Test Transaction Client");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let base_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("http://localhost:8000");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        base_url = %base_url,
        count = count,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = reqwest::Client::new();

    // Check the service is up before generating load
    let health_url = format!("{}/health", base_url);
    match client.get(&health_url).send().await {
        Ok(response) => {
            let health: serde_json::Value = response.json().await?;
            info!(model_loaded = %health["model_loaded"], "Service is up");
        }
        Err(e) => {
            warn!(error = %e, "Health check failed, is the service running?");
            return Ok(());
        }
    }

    let mut generator = TransactionGenerator::new();
    let predict_url = format!("{}/predict", base_url);

    info!("Posting {} transactions...", count);

    let mut legitimate_count = 0u64;
    let mut suspicious_count = 0u64;
    let mut flagged_count = 0u64;
    let mut error_count = 0u64;

    for i in 0..count {
        let suspicious = rand::thread_rng().gen_bool(fraud_rate);
        let transaction = if suspicious {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        match client.post(&predict_url).json(&transaction).send().await {
            Ok(response) if response.status().is_success() => {
                let prediction: PredictionResponse = response.json().await?;
                if prediction.is_fraud {
                    flagged_count += 1;
                    info!(
                        fraud_probability = prediction.fraud_probability,
                        response_time_ms = prediction.response_time_ms,
                        suspicious = suspicious,
                        "Transaction flagged as fraud"
                    );
                }
            }
            Ok(response) => {
                error_count += 1;
                warn!(status = %response.status(), "Prediction rejected");
            }
            Err(e) => {
                error_count += 1;
                warn!(error = %e, "Request failed");
            }
        }

        if (i + 1) % 10 == 0 {
            info!(
                "Posted {}/{} transactions ({} legitimate, {} suspicious, {} flagged)",
                i + 1,
                count,
                legitimate_count,
                suspicious_count,
                flagged_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Posted {} transactions ({} legitimate, {} suspicious, {} flagged, {} errors)",
        count, legitimate_count, suspicious_count, flagged_count, error_count
    );

    Ok(())
}
