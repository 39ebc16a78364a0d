use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

use crate::handlers::MessageHandler;

/// WhatsApp Cloud API webhook payload structures.
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Change {
    pub value: ChangeValue,
    #[serde(default)]
    pub field: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InboundMessage {
    pub from: String,
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub image: Option<ImageBody>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ImageBody {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Parsed inbound image notification.
#[derive(Debug, Clone)]
pub struct ImageNotification {
    pub sender: String,
    pub media_id: String,
    pub message_id: String,
}

/// First image message in the payload, if any.
pub fn extract_image_message(payload: &WebhookPayload) -> Option<ImageNotification> {
    for entry in &payload.entry {
        for change in &entry.changes {
            for message in &change.value.messages {
                if message.msg_type == "image" {
                    if let Some(image) = &message.image {
                        return Some(ImageNotification {
                            sender: message.from.clone(),
                            media_id: image.id.clone(),
                            message_id: message.id.clone(),
                        });
                    }
                }
            }
        }
    }
    None
}

/// First text message in the payload as `(sender, body)`, if any.
pub fn extract_text_message(payload: &WebhookPayload) -> Option<(String, String)> {
    for entry in &payload.entry {
        for change in &entry.changes {
            for message in &change.value.messages {
                if message.msg_type == "text" {
                    if let Some(text) = &message.text {
                        return Some((message.from.clone(), text.body.clone()));
                    }
                }
            }
        }
    }
    None
}

/// Route one parsed webhook payload to the message handler.
pub async fn handle_webhook(
    handler: Arc<MessageHandler>,
    payload: WebhookPayload,
) -> anyhow::Result<()> {
    if let Some(image) = extract_image_message(&payload) {
        log::info!(
            "📨 Inbound image from {} (message {})",
            image.sender,
            image.message_id
        );
        handler
            .handle_image_message(&image.sender, &image.media_id)
            .await?;
    } else if let Some((sender, text)) = extract_text_message(&payload) {
        handler.handle_text_message(&sender, &text).await?;
    } else {
        log::debug!("ℹ️ Webhook carried no processable message");
    }

    Ok(())
}

/// Verify webhook signature using HMAC-SHA256.
fn verify_webhook_signature(payload: &str, signature: &str, secret: &str) -> bool {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };

    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    // Meta sends the signature as "sha256=<hex>"
    let provided_signature = signature.strip_prefix("sha256=").unwrap_or(signature);

    expected_signature == provided_signature
}

// Axum integration (optional - requires axum dependency)
#[cfg(feature = "webhook-server")]
pub mod server {
    use super::*;
    use crate::config::Settings;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::get,
        Router,
    };
    use std::collections::HashMap;

    pub struct AppState {
        pub message_handler: Arc<MessageHandler>,
        pub settings: Arc<Settings>,
    }

    pub fn create_webhook_router(
        message_handler: Arc<MessageHandler>,
        settings: Arc<Settings>,
    ) -> Router {
        let state = Arc::new(AppState {
            message_handler,
            settings,
        });

        Router::new()
            .route("/", get(root_handler))
            .route("/webhook", get(verify_handler).post(webhook_handler))
            .route("/health", get(health_check))
            .with_state(state)
    }

    /// Webhook verification handshake during Meta app setup.
    async fn verify_handler(
        State(state): State<Arc<AppState>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, String) {
        let mode = params.get("hub.mode");
        let token = params.get("hub.verify_token");
        let challenge = params.get("hub.challenge");

        log::info!("🔔 Webhook verification request: mode={:?}", mode);

        let (Some(mode), Some(token)) = (mode, token) else {
            return (StatusCode::BAD_REQUEST, "Missing parameters".to_string());
        };

        if mode == "subscribe" && *token == state.settings.whatsapp_verify_token {
            log::info!("✅ Webhook verified successfully");
            return (
                StatusCode::OK,
                challenge.cloned().unwrap_or_default(),
            );
        }

        log::warn!("⚠️ Webhook verification failed");
        (StatusCode::FORBIDDEN, "Verification failed".to_string())
    }

    async fn webhook_handler(
        State(state): State<Arc<AppState>>,
        headers: axum::http::HeaderMap,
        body: String,
    ) -> StatusCode {
        log::debug!("🔔 Webhook received ({} bytes)", body.len());

        // Verify against the raw body: re-serialized JSON can change
        // whitespace/key ordering and break the HMAC.
        if let Some(secret) = &state.settings.whatsapp_webhook_secret {
            let signature = headers
                .get("x-hub-signature-256")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            if signature.is_empty() {
                log::warn!("⚠️ No signature header on webhook request");
            } else if !verify_webhook_signature(&body, signature, secret) {
                log::error!("❌ Webhook signature verification failed");
                return StatusCode::FORBIDDEN;
            }
        }

        let payload: WebhookPayload = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(e) => {
                log::error!("❌ Failed to parse webhook payload: {}", e);
                // acknowledge anyway so Meta does not retry malformed events
                return StatusCode::OK;
            }
        };

        // Acknowledge immediately; analysis continues in the background.
        let handler = state.message_handler.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_webhook(handler, payload).await {
                log::error!("❌ Webhook processing error: {}", e);
            }
        });

        StatusCode::OK
    }

    async fn root_handler() -> &'static str {
        "SnapCalories Webhook Server - Use /webhook for WhatsApp Cloud API notifications"
    }

    async fn health_check() -> &'static str {
        "OK"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE_PAYLOAD: &str = r#"{
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "entry_1",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "messages": [{
                        "from": "15551234567",
                        "id": "wamid.abc",
                        "timestamp": "1722855600",
                        "type": "image",
                        "image": {
                            "id": "media_789",
                            "mime_type": "image/jpeg"
                        }
                    }]
                }
            }]
        }]
    }"#;

    #[test]
    fn test_webhook_deserialization() {
        let payload: WebhookPayload = serde_json::from_str(IMAGE_PAYLOAD).unwrap();

        assert_eq!(payload.object, "whatsapp_business_account");
        assert_eq!(payload.entry.len(), 1);

        let message = &payload.entry[0].changes[0].value.messages[0];
        assert_eq!(message.from, "15551234567");
        assert_eq!(message.msg_type, "image");
        assert_eq!(message.image.as_ref().unwrap().id, "media_789");
    }

    #[test]
    fn test_extract_image_message() {
        let payload: WebhookPayload = serde_json::from_str(IMAGE_PAYLOAD).unwrap();
        let image = extract_image_message(&payload).unwrap();

        assert_eq!(image.sender, "15551234567");
        assert_eq!(image.media_id, "media_789");
        assert_eq!(image.message_id, "wamid.abc");
        assert!(extract_text_message(&payload).is_none());
    }

    #[test]
    fn test_extract_text_message() {
        let json = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "entry_1",
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "15551234567",
                            "id": "wamid.def",
                            "type": "text",
                            "text": {"body": "hello"}
                        }]
                    }
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        let (sender, body) = extract_text_message(&payload).unwrap();

        assert_eq!(sender, "15551234567");
        assert_eq!(body, "hello");
        assert!(extract_image_message(&payload).is_none());
    }

    #[test]
    fn test_empty_payload_extracts_nothing() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"object": "whatsapp_business_account"}"#).unwrap();
        assert!(extract_image_message(&payload).is_none());
        assert!(extract_text_message(&payload).is_none());
    }

    #[test]
    fn test_verify_webhook_signature() {
        type HmacSha256 = Hmac<Sha256>;

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(b"payload");
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(verify_webhook_signature(
            "payload",
            &format!("sha256={}", signature),
            "secret"
        ));
        // also accepted without the scheme prefix
        assert!(verify_webhook_signature("payload", &signature, "secret"));
        assert!(!verify_webhook_signature("payload", "sha256=deadbeef", "secret"));
        assert!(!verify_webhook_signature("tampered", &signature, "secret"));
    }
}
