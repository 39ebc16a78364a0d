pub mod calculator;
pub mod portion;
pub mod recognizer;
pub mod resolver;
pub mod usda;
pub mod vision;
pub mod whatsapp;

pub use recognizer::FoodRecognizer;
pub use resolver::NutrientResolver;
pub use usda::{CompositionLookup, UsdaClient};
pub use vision::{HuggingFaceVision, StubVision, VisionCapability};
pub use whatsapp::{MessagingService, WhatsAppCloudClient};
