//! Minimal Telegram Bot API client: long polling and replies.

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::dispatch::Outgoing;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardMarkup {
    pub fn single(text: &str, callback_data: &str) -> Self {
        InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.to_string(),
                callback_data: callback_data.to_string(),
            }]],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

pub struct TelegramClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(base_url: &str, token: &str, poll_timeout: Duration) -> Result<Self> {
        // Leave room for the server to hold a long poll open
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()?;
        Ok(TelegramClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        debug!(method, "Calling Telegram Bot API");
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            // Request URLs embed the bot token
            .map_err(|e| anyhow!("Request error: {} for method: {}", e.without_url(), method))?;

        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Failed to parse {method} response (HTTP {status})"))?;

        if !envelope.ok {
            return Err(anyhow!(
                "Telegram API error for {}: {}",
                method,
                envelope.description.as_deref().unwrap_or("unknown error")
            ));
        }
        envelope
            .result
            .ok_or_else(|| anyhow!("Telegram API returned no result for {}", method))
    }

    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout.as_secs(),
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
        keyboard: Option<&InlineKeyboardMarkup>,
        reply_to: Option<i64>,
    ) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(keyboard)?;
        }
        if let Some(message_id) = reply_to {
            body["reply_parameters"] = json!({ "message_id": message_id });
        }
        let _: serde_json::Value = self.call("sendMessage", body).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn execute(&self, action: &Outgoing) -> Result<()> {
        match action {
            Outgoing::Send {
                chat_id,
                text,
                markdown,
                keyboard,
            } => {
                self.send_message(*chat_id, text, *markdown, keyboard.as_ref(), None)
                    .await
            }
            Outgoing::Reply {
                chat_id,
                reply_to,
                text,
            } => {
                self.send_message(*chat_id, text, false, None, Some(*reply_to))
                    .await
            }
            Outgoing::AnswerCallback { id } => self.answer_callback_query(id).await,
        }
    }
}
