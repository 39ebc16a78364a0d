use anyhow::Result;
use serde::Serialize;

/// Messaging capability the pipeline delivers replies through.
///
/// The core hands over a `(recipient, text)` pair and does not manage
/// delivery retries. Media download is used by the transport layer to fetch
/// inbound image assets before a pipeline run starts.
#[async_trait::async_trait]
pub trait MessagingService: Send + Sync {
    async fn send_message(&self, to: &str, message: &str) -> Result<()>;
    async fn download_media(&self, media_id: &str, output_path: &str) -> Result<String>;
}

/// WhatsApp Cloud API (graph.facebook.com) client.
pub struct WhatsAppCloudClient {
    api_token: String,
    phone_number_id: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessageRequest {
    messaging_product: String,
    recipient_type: String,
    to: String,
    #[serde(rename = "type")]
    msg_type: String,
    text: TextContent,
}

#[derive(Serialize)]
struct TextContent {
    body: String,
}

impl WhatsAppCloudClient {
    pub fn new(api_token: String, phone_number_id: String, base_url: String) -> Self {
        Self {
            api_token,
            phone_number_id,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.base_url, self.phone_number_id)
    }
}

#[async_trait::async_trait]
impl MessagingService for WhatsAppCloudClient {
    async fn send_message(&self, to: &str, message: &str) -> Result<()> {
        let request = MessageRequest {
            messaging_product: "whatsapp".to_string(),
            recipient_type: "individual".to_string(),
            to: to.to_string(),
            msg_type: "text".to_string(),
            text: TextContent {
                body: message.to_string(),
            },
        };

        let response = self
            .client
            .post(self.messages_url())
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("WhatsApp API error: {}", error_text);
        }

        log::info!("📤 OUTGOING MESSAGE - To: {} | {} chars", to, message.len());
        Ok(())
    }

    async fn download_media(&self, media_id: &str, output_path: &str) -> Result<String> {
        // Cloud API media workflow: resolve the media ID to a short-lived
        // URL, then fetch the bytes from it.
        log::info!("📥 Downloading media from WhatsApp: media_id={}", media_id);

        let lookup_url = format!("{}/{}", self.base_url, media_id);
        let response = self
            .client
            .get(&lookup_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("WhatsApp media lookup error ({}): {}", status, error_text);
        }

        let media_info: serde_json::Value = response.json().await?;
        let media_url = media_info
            .get("url")
            .and_then(|u| u.as_str())
            .ok_or_else(|| anyhow::anyhow!("media lookup response missing url field"))?;

        let response = self
            .client
            .get(media_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download media: HTTP {}", response.status());
        }

        let bytes = response.bytes().await?;
        std::fs::write(output_path, &bytes)?;

        log::info!("✅ Media downloaded to: {} ({} bytes)", output_path, bytes.len());
        Ok(output_path.to_string())
    }
}

/// Logging stand-in used in tests and local runs without API credentials.
pub struct MockWhatsAppClient;

#[async_trait::async_trait]
impl MessagingService for MockWhatsAppClient {
    async fn send_message(&self, to: &str, message: &str) -> Result<()> {
        log::info!("📱 [mock] Sending message to {}: {}", to, message);
        Ok(())
    }

    async fn download_media(&self, media_id: &str, output_path: &str) -> Result<String> {
        log::info!("📥 [mock] Downloading media {} to {}", media_id, output_path);
        Ok(output_path.to_string())
    }
}
