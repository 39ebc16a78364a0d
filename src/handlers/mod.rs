pub mod message_handler;
pub mod pipeline;

pub use message_handler::MessageHandler;
pub use pipeline::{MealImageRequest, MealPipeline};
