use crate::{models::PriceEstimate, utils::features::TripFeatures};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Predicts ride fares from a feature vector.
#[async_trait]
pub trait PricePredictor: Send + Sync {
    async fn predict(&self, features: &TripFeatures) -> Result<PriceEstimate, String>;
}

// The ML service has answered in each of these shapes over time
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Single { price: f64 },
    Categories { prices: BTreeMap<String, f64> },
    Flat(BTreeMap<String, f64>),
    Bare(f64),
}

impl From<PredictResponse> for PriceEstimate {
    fn from(response: PredictResponse) -> Self {
        match response {
            PredictResponse::Single { price } | PredictResponse::Bare(price) => PriceEstimate::Single { price },
            PredictResponse::Categories { prices } | PredictResponse::Flat(prices) => {
                PriceEstimate::Categories { prices }
            }
        }
    }
}

/// HTTP client for the ML microservice's `/predict` endpoint.
pub struct MlClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl MlClient {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl PricePredictor for MlClient {
    async fn predict(&self, features: &TripFeatures) -> Result<PriceEstimate, String> {
        log::info!("🤖 Requesting price prediction");
        log::debug!("   ML payload: {:?}", features);

        let url = format!("{}/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(features)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("Failed to call ML service: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("ML service error: {} {}", status, body));
        }

        let estimate: PriceEstimate = response
            .json::<PredictResponse>()
            .await
            .map_err(|e| format!("Failed to parse ML response: {}", e))?
            .into();

        if !estimate.is_finite() {
            return Err("ML service returned no usable price".to_string());
        }

        log::info!("✅ Price prediction: {:?}", estimate);
        Ok(estimate)
    }
}
