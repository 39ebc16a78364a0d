mod config;
mod error;
mod formatting;
mod handlers;
mod image;
mod models;
mod services;
mod webhook;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use config::Settings;
use handlers::{MealPipeline, MessageHandler};
use services::{
    CompositionLookup, FoodRecognizer, HuggingFaceVision, MessagingService, NutrientResolver,
    StubVision, UsdaClient, VisionCapability, WhatsAppCloudClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting SnapCalories bot...");

    let settings = Arc::new(Settings::from_env()?);
    log::info!("✅ Configuration loaded");

    // Vision capability: real model when a token is configured, fixed demo
    // detections otherwise. Chosen here, never inside pipeline logic.
    let vision: Arc<dyn VisionCapability> = match &settings.hugging_face_token {
        Some(token) => {
            log::info!("✅ Vision service initialized with model: {}", settings.vision_model);
            Arc::new(HuggingFaceVision::new(
                token.clone(),
                settings.vision_model.clone(),
            ))
        }
        None => {
            log::warn!("⚠️ HUGGING_FACE_TOKEN not set, using stub vision (demo detections)");
            Arc::new(StubVision::default())
        }
    };

    let lookup: Arc<dyn CompositionLookup> = Arc::new(UsdaClient::new(
        settings.usda_api_key.clone(),
        settings.usda_api_base_url.clone(),
    ));
    log::info!("✅ USDA FoodData Central client initialized");

    let messaging: Arc<dyn MessagingService> = Arc::new(WhatsAppCloudClient::new(
        settings.whatsapp_api_token.clone(),
        settings.whatsapp_phone_number_id.clone(),
        settings.whatsapp_api_base_url.clone(),
    ));
    log::info!("✅ WhatsApp Cloud API client initialized");

    // Cancelling this token aborts all in-flight pipeline runs.
    let shutdown = CancellationToken::new();

    let pipeline = Arc::new(MealPipeline::new(
        FoodRecognizer::new(vision),
        NutrientResolver::new(lookup),
        messaging.clone(),
        settings.max_image_size_bytes(),
    ));

    let message_handler = Arc::new(MessageHandler::new(
        pipeline,
        messaging.clone(),
        shutdown.clone(),
    ));
    log::info!("✅ Message handler initialized");

    #[cfg(feature = "webhook-server")]
    {
        use webhook::server::create_webhook_router;

        let webhook_addr = settings.webhook_addr.clone();
        let webhook_app = create_webhook_router(message_handler.clone(), settings.clone());

        log::info!("🌐 Webhook server starting on {}", webhook_addr);

        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&webhook_addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    log::error!("❌ Failed to bind webhook server on {}: {}", webhook_addr, e);
                    return;
                }
            };
            if let Err(e) = axum::serve(listener, webhook_app).await {
                log::error!("❌ Webhook server error: {}", e);
            }
        });

        log::info!("✅ Webhook server started");
    }

    log::info!("🎉 Bot is ready! Send a meal photo to get a nutrition breakdown.");

    // Keep running
    tokio::signal::ctrl_c().await?;

    log::info!("🛑 Shutting down...");
    shutdown.cancel();

    Ok(())
}
