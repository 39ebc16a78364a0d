use std::sync::Arc;

use crate::error::PipelineError;
use crate::models::FoodItem;
use crate::services::portion;
use crate::services::vision::VisionCapability;

/// Predictions beyond this rank are ignored.
const MAX_PREDICTIONS: usize = 5;
/// Predictions at or below this score are treated as noise.
const MIN_SCORE: f64 = 0.10;

/// Converts raw vision detections into candidate food items.
pub struct FoodRecognizer {
    vision: Arc<dyn VisionCapability>,
}

impl FoodRecognizer {
    pub fn new(vision: Arc<dyn VisionCapability>) -> Self {
        Self { vision }
    }

    /// Classify the image and build the filtered food item list.
    ///
    /// An empty list means "no food detected" and is not an error; only a
    /// failing vision call is.
    pub async fn recognize(&self, image_path: &str) -> Result<Vec<FoodItem>, PipelineError> {
        let predictions = self
            .vision
            .classify(image_path)
            .await
            .map_err(PipelineError::Vision)?;

        let mut items = Vec::new();
        for prediction in predictions.into_iter().take(MAX_PREDICTIONS) {
            if prediction.score <= MIN_SCORE {
                log::debug!(
                    "🔇 Dropping low-confidence prediction '{}' ({:.2})",
                    prediction.label,
                    prediction.score
                );
                continue;
            }

            let name = normalize_label(&prediction.label);
            let grams = portion::estimate_grams(&name, prediction.score);
            match FoodItem::new(name, grams, prediction.score) {
                Ok(item) => {
                    log::info!(
                        "🍴 Detected: {} ({:.0}g, confidence {:.0}%)",
                        item.name,
                        item.quantity,
                        item.confidence * 100.0
                    );
                    items.push(item);
                }
                Err(e) => log::warn!("⚠️ Skipping malformed detection: {}", e),
            }
        }

        if items.is_empty() {
            log::warn!("🤔 No food items survived filtering for {}", image_path);
        }

        Ok(items)
    }
}

/// Arithmetic mean of per-item confidences; 0.0 for an empty list.
pub fn overall_confidence(items: &[FoodItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }

    let total: f64 = items.iter().map(|item| item.confidence).sum();
    total / items.len() as f64
}

/// Clean up a raw model label: separators become spaces, words are
/// title-cased ("grilled_chicken-breast" → "Grilled Chicken Breast").
fn normalize_label(label: &str) -> String {
    label
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
