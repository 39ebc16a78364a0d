use anyhow::Result;
use serde::Deserialize;
use std::fs;

/// One labeled detection from the vision model.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// Opaque image-classification capability.
///
/// Returns predictions ordered by the model, best first. Implementations are
/// swapped at process wiring time; pipeline logic never branches on which one
/// is active.
#[async_trait::async_trait]
pub trait VisionCapability: Send + Sync {
    async fn classify(&self, image_path: &str) -> Result<Vec<Prediction>>;
}

/// Hugging Face inference API client for food image classification.
pub struct HuggingFaceVision {
    token: String,
    model: String,
    client: reqwest::Client,
}

impl HuggingFaceVision {
    pub fn new(token: String, model: String) -> Self {
        Self {
            token,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn model_url(&self) -> String {
        format!("https://api-inference.huggingface.co/models/{}", self.model)
    }
}

#[async_trait::async_trait]
impl VisionCapability for HuggingFaceVision {
    async fn classify(&self, image_path: &str) -> Result<Vec<Prediction>> {
        log::debug!("📸 Starting image classification for: {}", image_path);

        let image_data = fs::read(image_path)?;
        log::debug!("📊 Image file size: {} bytes", image_data.len());

        let mime_type = if image_path.ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        };

        log::info!("🤖 Sending request to Hugging Face model: {}", self.model);

        let response = self
            .client
            .post(self.model_url())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", mime_type)
            .body(image_data)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Vision response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Vision API error response: {}", error_text);
            anyhow::bail!("Vision API error ({}): {}", status, error_text);
        }

        let predictions: Vec<Prediction> = response.json().await?;
        log::info!("✅ Vision model returned {} prediction(s)", predictions.len());

        Ok(predictions)
    }
}

/// Deterministic stand-in for the vision model.
///
/// Returns a fixed healthy-meal detection set. Selected at wiring time when
/// no Hugging Face token is configured, and used directly in tests.
pub struct StubVision {
    predictions: Vec<Prediction>,
}

impl StubVision {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self { predictions }
    }
}

impl Default for StubVision {
    fn default() -> Self {
        Self::new(vec![
            Prediction {
                label: "grilled_chicken_breast".to_string(),
                score: 0.88,
            },
            Prediction {
                label: "steamed_broccoli".to_string(),
                score: 0.82,
            },
            Prediction {
                label: "brown_rice".to_string(),
                score: 0.85,
            },
        ])
    }
}

#[async_trait::async_trait]
impl VisionCapability for StubVision {
    async fn classify(&self, image_path: &str) -> Result<Vec<Prediction>> {
        log::info!("📸 Stub vision classifying {} with fixed detections", image_path);
        Ok(self.predictions.clone())
    }
}
