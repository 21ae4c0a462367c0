// notifier/telegram/sender.rs

use crate::model::NotifyError;
use crate::notifier::telegram::format::truncate;
use crate::notifier::telegram::TelegramNotifier;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Sends a text message to the configured chat.
pub async fn send_text(notifier: &TelegramNotifier, text: &str) -> Result<(), NotifyError> {
    send_to(notifier, notifier.chat_id, text).await
}

async fn send_to(notifier: &TelegramNotifier, chat_id: i64, text: &str) -> Result<(), NotifyError> {
    let params = [("chat_id", chat_id.to_string()), ("text", truncate(text))];
    let response = match timeout(
        Duration::from_secs(10),
        notifier.client.post(notifier.api_url("sendMessage")).form(&params).send(),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!("❌ Telegram send() failed: {:?}", e);
            return Err(NotifyError::ApiError(e));
        }
        Err(_) => {
            warn!("⏳ Telegram send() timed out");
            return Err(NotifyError::Unreachable);
        }
    };

    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("❌ Telegram API responded [{}]: {}", status, body);
        return Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    debug!("✅ Telegram text sent [{}]", status);
    Ok(())
}
