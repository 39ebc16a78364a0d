use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::formatting;
use crate::image::{self, TempImage};
use crate::models::NutritionResult;
use crate::services::calculator;
use crate::services::recognizer::{self, FoodRecognizer};
use crate::services::resolver::NutrientResolver;
use crate::services::whatsapp::MessagingService;

/// One inbound meal image to analyze and reply to.
#[derive(Debug, Clone)]
pub struct MealImageRequest {
    pub sender: String,
    pub image_path: String,
}

/// The meal-analysis pipeline: image → recognize → resolve → compute →
/// format → send.
///
/// Stateless per request; one instance is shared across concurrent runs.
pub struct MealPipeline {
    recognizer: FoodRecognizer,
    resolver: NutrientResolver,
    messaging: Arc<dyn MessagingService>,
    max_image_bytes: u64,
}

impl MealPipeline {
    pub fn new(
        recognizer: FoodRecognizer,
        resolver: NutrientResolver,
        messaging: Arc<dyn MessagingService>,
        max_image_bytes: u64,
    ) -> Self {
        Self {
            recognizer,
            resolver,
            messaging,
            max_image_bytes,
        }
    }

    /// Execute one full run, sending exactly one reply unless cancelled.
    ///
    /// The image asset is deleted on every exit path, including failure and
    /// cancellation. Cancellation aborts cleanly with no partial sends.
    pub async fn run(&self, request: MealImageRequest, cancel: CancellationToken) {
        let _asset = TempImage::new(&request.image_path);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::warn!("🛑 Analysis cancelled for {}, no reply sent", request.sender);
            }
            _ = self.analyze_and_reply(&request) => {}
        }
    }

    async fn analyze_and_reply(&self, request: &MealImageRequest) {
        match self.analyze(&request.image_path).await {
            Ok(result) => {
                log::info!(
                    "✅ Analysis complete for {}: {:.0} kcal, {} item(s)",
                    request.sender,
                    result.total_calories,
                    result.detected_foods.len()
                );
                let message = formatting::format_result(&result);
                if let Err(e) = self.messaging.send_message(&request.sender, &message).await {
                    log::error!("❌ Failed to send analysis to {}: {}", request.sender, e);
                }
            }
            Err(e) => {
                log::error!("❌ Meal analysis failed for {}: {}", request.sender, e);
                let details = match &e {
                    PipelineError::Vision(cause) => Some(cause.to_string()),
                    _ => None,
                };
                let message = formatting::format_error(e.user_error_kind(), details.as_deref());
                if let Err(send_err) = self.messaging.send_message(&request.sender, &message).await
                {
                    log::error!(
                        "❌ Failed to send error message to {}: {}",
                        request.sender,
                        send_err
                    );
                }
            }
        }
    }

    /// The analysis stages alone, without messaging.
    pub async fn analyze(&self, image_path: &str) -> Result<NutritionResult, PipelineError> {
        image::validate_image(image_path, self.max_image_bytes)
            .map_err(PipelineError::ImageUnavailable)?;

        let items = self.recognizer.recognize(image_path).await?;
        if items.is_empty() {
            return Err(PipelineError::NoFoodDetected);
        }

        let total = self.resolver.aggregate(&items).await;
        let confidence = recognizer::overall_confidence(&items);

        Ok(calculator::create_result(&total, items, confidence))
    }
}
