use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::ErrorKind;
use crate::formatting;
use crate::handlers::pipeline::{MealImageRequest, MealPipeline};
use crate::image;
use crate::services::whatsapp::MessagingService;

/// Routes parsed inbound messages to the right response path.
///
/// Image messages are dispatched as independent background pipeline runs so
/// the webhook acknowledgment never waits on analysis; everything else gets
/// an immediate canned reply.
pub struct MessageHandler {
    pipeline: Arc<MealPipeline>,
    messaging: Arc<dyn MessagingService>,
    shutdown: CancellationToken,
}

impl MessageHandler {
    pub fn new(
        pipeline: Arc<MealPipeline>,
        messaging: Arc<dyn MessagingService>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pipeline,
            messaging,
            shutdown,
        }
    }

    /// Download the media asset, then spawn the analysis pipeline for it.
    pub async fn handle_image_message(&self, from: &str, media_id: &str) -> Result<()> {
        log::info!("📸 Image message from {}: media_id={}", from, media_id);

        let output_path = image::temp_image_path(media_id)?;
        let output = output_path.to_string_lossy().to_string();

        match self.messaging.download_media(media_id, &output).await {
            Ok(local_path) => {
                let request = MealImageRequest {
                    sender: from.to_string(),
                    image_path: local_path,
                };
                let pipeline = self.pipeline.clone();
                let cancel = self.shutdown.child_token();
                tokio::spawn(async move {
                    pipeline.run(request, cancel).await;
                });
                Ok(())
            }
            Err(e) => {
                log::error!("❌ Failed to download media {}: {}", media_id, e);
                self.messaging
                    .send_message(from, &formatting::format_error(ErrorKind::InvalidImage, None))
                    .await
            }
        }
    }

    /// Text messages: welcome for a greeting, otherwise point at the camera.
    pub async fn handle_text_message(&self, from: &str, text: &str) -> Result<()> {
        log::info!("💬 Text message from {}: {}", from, text);

        let reply = if is_greeting(text) {
            formatting::format_welcome()
        } else {
            formatting::format_error(ErrorKind::UnsupportedMessage, None)
        };

        self.messaging.send_message(from, &reply).await
    }
}

fn is_greeting(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "hi" | "hello" | "hey" | "start" | "help"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::whatsapp::MockWhatsAppClient;
    use crate::services::{FoodRecognizer, NutrientResolver, StubVision, UsdaClient};

    #[test]
    fn test_is_greeting() {
        assert!(is_greeting("hi"));
        assert!(is_greeting("  Hello "));
        assert!(is_greeting("HEY"));
        assert!(!is_greeting("what did I eat today"));
        assert!(!is_greeting(""));
    }

    #[tokio::test]
    async fn test_text_messages_get_replies() {
        let pipeline = Arc::new(MealPipeline::new(
            FoodRecognizer::new(Arc::new(StubVision::default())),
            NutrientResolver::new(Arc::new(UsdaClient::new(
                "test_key".to_string(),
                "http://localhost".to_string(),
            ))),
            Arc::new(MockWhatsAppClient),
            1024,
        ));
        let handler = MessageHandler::new(
            pipeline,
            Arc::new(MockWhatsAppClient),
            CancellationToken::new(),
        );

        handler
            .handle_text_message("+15551234567", "hello")
            .await
            .unwrap();
        handler
            .handle_text_message("+15551234567", "analyze my day")
            .await
            .unwrap();
    }
}
