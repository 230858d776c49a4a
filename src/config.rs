use std::env;
use thiserror::Error;

use crate::food::config::NutritionixConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_NUTRITIONIX_API_URL: &str = "https://trackapi.nutritionix.com/v2";
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://henrikmose.github.io",
    "http://localhost:3000",
    "http://localhost:5500",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid PORT value '{0}'")]
    InvalidPort(String),
}

/// Which cross-origin callers the gateway accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsProfile {
    /// Only the listed origins, with GET/POST/OPTIONS and the
    /// `Content-Type`/`Authorization` headers.
    Strict { origins: Vec<String> },
    Permissive,
}

impl Default for CorsProfile {
    fn default() -> Self {
        CorsProfile::Strict {
            origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl CorsProfile {
    fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == "*" {
            return CorsProfile::Permissive;
        }

        let origins: Vec<String> = value
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() {
            CorsProfile::default()
        } else {
            CorsProfile::Strict { origins }
        }
    }
}

/// Everything the gateway needs, read once at startup.
///
/// Missing credentials are not an error here: each route checks for the
/// credential it needs when it is called.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_chat_model: String,
    pub nutritionix: Option<NutritionixConfig>,
    pub nutritionix_api_url: String,
    pub port: u16,
    pub cors: CorsProfile,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            openai_chat_model: DEFAULT_OPENAI_CHAT_MODEL.to_string(),
            nutritionix: None,
            nutritionix_api_url: DEFAULT_NUTRITIONIX_API_URL.to_string(),
            port: DEFAULT_PORT,
            cors: CorsProfile::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let nutritionix = NutritionixConfig::from_parts(var("NUTRITIONIX_APP_ID"), var("NUTRITIONIX_APP_KEY"));

        Ok(Self {
            openai_api_key: var("OPENAI_API_KEY"),
            openai_api_url: var("OPENAI_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            openai_chat_model: var("OPENAI_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_CHAT_MODEL.to_string()),
            nutritionix,
            nutritionix_api_url: var("NUTRITIONIX_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_NUTRITIONIX_API_URL.to_string()),
            port,
            cors: var("CORS_ALLOWED_ORIGINS")
                .map(|v| CorsProfile::parse(&v))
                .unwrap_or_default(),
        })
    }

    /// Names of the credentials that are not configured.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if self.nutritionix.is_none() {
            missing.push("NUTRITIONIX_APP_ID/NUTRITIONIX_APP_KEY");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.openai_api_url, DEFAULT_OPENAI_API_URL);
        assert_eq!(config.openai_chat_model, "gpt-4o-mini");
        assert_eq!(config.nutritionix_api_url, DEFAULT_NUTRITIONIX_API_URL);
        assert!(config.openai_api_key.is_none());
        assert!(config.nutritionix.is_none());
        assert_eq!(config.cors, CorsProfile::default());
        match &config.cors {
            CorsProfile::Strict { origins } => {
                assert!(origins.contains(&"https://henrikmose.github.io".to_string()))
            }
            CorsProfile::Permissive => panic!("default profile should be strict"),
        }
        assert_eq!(config.missing_credentials().len(), 2);
    }

    #[test]
    fn test_reads_credentials_and_port() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("NUTRITIONIX_APP_ID", "app-id"),
            ("NUTRITIONIX_APP_KEY", "app-key"),
            ("PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        let nutritionix = config.nutritionix.as_ref().unwrap();
        assert_eq!(nutritionix.app_id, "app-id");
        assert_eq!(nutritionix.app_key, "app-key");
        assert!(config.missing_credentials().is_empty());
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let config = config_from(&[
            ("OPENAI_API_KEY", ""),
            ("NUTRITIONIX_APP_ID", "app-id"),
            ("NUTRITIONIX_APP_KEY", "  "),
        ])
        .unwrap();

        assert!(config.openai_api_key.is_none());
        assert!(config.nutritionix.is_none());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("not-a-port"));
    }

    #[test]
    fn test_base_urls_lose_trailing_slash() {
        let config = config_from(&[
            ("OPENAI_API_URL", "http://localhost:9000/v1/"),
            ("NUTRITIONIX_API_URL", "http://localhost:9001/"),
        ])
        .unwrap();

        assert_eq!(config.openai_api_url, "http://localhost:9000/v1");
        assert_eq!(config.nutritionix_api_url, "http://localhost:9001");
    }

    #[test]
    fn test_cors_profiles() {
        let config = config_from(&[("CORS_ALLOWED_ORIGINS", "*")]).unwrap();
        assert_eq!(config.cors, CorsProfile::Permissive);

        let config = config_from(&[(
            "CORS_ALLOWED_ORIGINS",
            "https://example.github.io, http://localhost:5500,",
        )])
        .unwrap();
        assert_eq!(
            config.cors,
            CorsProfile::Strict {
                origins: vec![
                    "https://example.github.io".to_string(),
                    "http://localhost:5500".to_string(),
                ]
            }
        );
    }
}
