use axum::body::Bytes;
use reqwest::{Client, RequestBuilder};
use serde_json::json;

use crate::error::Fault;
use crate::food::config::NutritionixConfig;
use crate::providers::utils::send_json;

#[derive(Clone)]
pub struct NutritionixClient {
    config: Option<NutritionixConfig>,
    base_url: String,
    client: Client,
}

impl NutritionixClient {
    pub fn new(config: Option<NutritionixConfig>, base_url: String, client: Client) -> Self {
        Self {
            config,
            base_url,
            client,
        }
    }

    /// Fails with a configuration fault unless both app id and key are set.
    pub fn require_credentials(&self) -> Result<&NutritionixConfig, Fault> {
        self.config
            .as_ref()
            .ok_or_else(|| Fault::MissingCredential("Server missing Nutritionix credentials".to_string()))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, Fault> {
        let config = self.require_credentials()?;
        Ok(request
            .header("x-app-id", &config.app_id)
            .header("x-app-key", &config.app_key))
    }

    /// Natural-language nutrient search, e.g. "1 apple and a cup of milk".
    pub async fn search_nutrients(&self, query: &str) -> Result<Bytes, Fault> {
        let url = format!("{}/natural/nutrients", self.base_url);
        let request = self
            .authorized(self.client.post(url))?
            .json(&json!({ "query": query }));

        send_json(request).await
    }

    /// Item lookup by UPC. The identifier is sent as-is, only URL-encoded.
    pub async fn lookup_barcode(&self, upc: &str) -> Result<Bytes, Fault> {
        let url = format!("{}/search/item?upc={}", self.base_url, urlencoding::encode(upc));
        let request = self.authorized(self.client.get(url))?;

        send_json(request).await
    }
}
