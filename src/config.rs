use anyhow::{Context, Result};
use std::env;

/// Application settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    // WhatsApp Cloud API
    pub whatsapp_api_token: String,
    pub whatsapp_phone_number_id: String,
    pub whatsapp_verify_token: String,
    pub whatsapp_api_base_url: String,
    /// HMAC secret for webhook signature checks; verification is skipped
    /// when unset.
    pub whatsapp_webhook_secret: Option<String>,

    // USDA FoodData Central API
    pub usda_api_key: String,
    pub usda_api_base_url: String,

    // Hugging Face vision (optional; stub vision is used when unset)
    pub hugging_face_token: Option<String>,
    pub vision_model: String,

    pub max_image_size_mb: u64,
    pub webhook_addr: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            whatsapp_api_token: require("WHATSAPP_API_TOKEN")?,
            whatsapp_phone_number_id: require("WHATSAPP_PHONE_NUMBER_ID")?,
            whatsapp_verify_token: require("WHATSAPP_VERIFY_TOKEN")?,
            whatsapp_api_base_url: env::var("WHATSAPP_API_BASE_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com/v18.0".to_string()),
            whatsapp_webhook_secret: env::var("WHATSAPP_WEBHOOK_SECRET").ok(),
            usda_api_key: require("USDA_API_KEY")?,
            usda_api_base_url: env::var("USDA_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.nal.usda.gov/fdc/v1".to_string()),
            hugging_face_token: env::var("HUGGING_FACE_TOKEN").ok(),
            vision_model: env::var("VISION_MODEL").unwrap_or_else(|_| "nateraw/food".to_string()),
            max_image_size_mb: env::var("MAX_IMAGE_SIZE_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            webhook_addr: env::var("WEBHOOK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }

    pub fn max_image_size_bytes(&self) -> u64 {
        self.max_image_size_mb * 1024 * 1024
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} must be set in .env file", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_image_size_bytes() {
        let settings = Settings {
            whatsapp_api_token: "t".to_string(),
            whatsapp_phone_number_id: "p".to_string(),
            whatsapp_verify_token: "v".to_string(),
            whatsapp_api_base_url: "https://graph.facebook.com/v18.0".to_string(),
            whatsapp_webhook_secret: None,
            usda_api_key: "k".to_string(),
            usda_api_base_url: "https://api.nal.usda.gov/fdc/v1".to_string(),
            hugging_face_token: None,
            vision_model: "nateraw/food".to_string(),
            max_image_size_mb: 10,
            webhook_addr: "0.0.0.0:8080".to_string(),
        };

        assert_eq!(settings.max_image_size_bytes(), 10 * 1024 * 1024);
    }
}
