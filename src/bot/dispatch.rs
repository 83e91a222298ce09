//! Routes inbound updates to handlers and turns every outcome into replies.

use tracing::{debug, warn};

use super::command::{self, Command, VALUES_CALLBACK};
use super::reply;
use super::telegram::{CallbackQuery, InlineKeyboardMarkup, Message, Update};
use crate::core::{CommandError, ConversionRequest, CurrencyConverter};

/// An action the transport should perform on behalf of a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Send {
        chat_id: i64,
        text: String,
        markdown: bool,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Reply {
        chat_id: i64,
        reply_to: i64,
        text: String,
    },
    AnswerCallback {
        id: String,
    },
}

impl Outgoing {
    fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Outgoing::Send {
            chat_id,
            text: text.into(),
            markdown: false,
            keyboard: None,
        }
    }

    /// Message text, if this action carries one.
    pub fn message_text(&self) -> Option<&str> {
        match self {
            Outgoing::Send { text, .. } | Outgoing::Reply { text, .. } => Some(text),
            Outgoing::AnswerCallback { .. } => None,
        }
    }
}

pub struct Dispatcher<C: CurrencyConverter> {
    converter: C,
    currencies: Vec<String>,
}

impl<C: CurrencyConverter> Dispatcher<C> {
    pub fn new(converter: C, currencies: Vec<String>) -> Self {
        Dispatcher {
            converter,
            currencies,
        }
    }

    pub async fn handle_update(&self, update: &Update) -> Vec<Outgoing> {
        if let Some(message) = &update.message {
            return self.handle_message(message).await;
        }
        if let Some(callback) = &update.callback_query {
            return self.handle_callback(callback);
        }
        debug!(update_id = update.update_id, "Ignoring update without message");
        Vec::new()
    }

    async fn handle_message(&self, message: &Message) -> Vec<Outgoing> {
        match &message.text {
            Some(text) => {
                self.handle_text(message.chat.id, message.message_id, text)
                    .await
            }
            None => Vec::new(),
        }
    }

    fn handle_callback(&self, callback: &CallbackQuery) -> Vec<Outgoing> {
        let mut actions = Vec::new();
        match (callback.data.as_deref(), &callback.message) {
            (Some(VALUES_CALLBACK), Some(message)) => actions.push(self.values(message.chat.id)),
            (data, _) => debug!(?data, "Ignoring callback"),
        }
        actions.push(Outgoing::AnswerCallback {
            id: callback.id.clone(),
        });
        actions
    }

    /// Handles one text message. Errors never escape: each becomes a reply.
    pub async fn handle_text(&self, chat_id: i64, message_id: i64, text: &str) -> Vec<Outgoing> {
        match self.run(chat_id, text).await {
            Ok(actions) => actions,
            Err(err) => {
                if err.is_user_error() {
                    debug!(kind = err.kind(), error = %err, "Rejected user command");
                } else {
                    warn!(kind = err.kind(), error = %err, "Failed to handle command");
                }
                vec![Outgoing::Reply {
                    chat_id,
                    reply_to: message_id,
                    text: reply::error(&err),
                }]
            }
        }
    }

    async fn run(&self, chat_id: i64, text: &str) -> Result<Vec<Outgoing>, CommandError> {
        let actions = match command::parse(text)? {
            Command::Start => vec![Outgoing::text(chat_id, reply::GREETING), self.help(chat_id)],
            Command::Help => vec![self.help(chat_id)],
            Command::Values => vec![self.values(chat_id)],
            Command::Convert(request) => vec![self.convert(chat_id, &request).await?],
        };
        Ok(actions)
    }

    async fn convert(
        &self,
        chat_id: i64,
        request: &ConversionRequest,
    ) -> Result<Outgoing, CommandError> {
        let result = self
            .converter
            .convert(&request.source, &request.target, request.amount)
            .await?;
        Ok(Outgoing::text(chat_id, reply::conversion(request, result)))
    }

    fn help(&self, chat_id: i64) -> Outgoing {
        Outgoing::Send {
            chat_id,
            text: reply::INSTRUCTION.to_string(),
            markdown: true,
            keyboard: Some(InlineKeyboardMarkup::single(
                reply::VALUES_BUTTON,
                VALUES_CALLBACK,
            )),
        }
    }

    fn values(&self, chat_id: i64) -> Outgoing {
        Outgoing::text(chat_id, reply::currency_list(&self.currencies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::telegram::Chat;
    use crate::core::{ConversionError, CurrencyMapping};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolves names like the real converter but answers from a fixed outcome.
    struct StubConverter {
        mapping: CurrencyMapping,
        outcome: Result<f64, ConversionError>,
        calls: AtomicUsize,
    }

    impl StubConverter {
        fn with_rate(rate: f64) -> Self {
            Self::with_outcome(Ok(rate))
        }

        fn with_outcome(outcome: Result<f64, ConversionError>) -> Self {
            StubConverter {
                mapping: CurrencyMapping::new([("евро", "EUR"), ("рубль", "RUB")]),
                outcome,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CurrencyConverter for StubConverter {
        async fn convert(
            &self,
            source: &str,
            target: &str,
            amount: f64,
        ) -> Result<f64, ConversionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.mapping.query(source, target)?;
            self.outcome.clone().map(|rate| rate * amount)
        }
    }

    fn dispatcher(converter: StubConverter) -> Dispatcher<StubConverter> {
        Dispatcher::new(converter, vec!["евро".into(), "рубль".into()])
    }

    fn reply_text(actions: &[Outgoing]) -> &str {
        match actions {
            [Outgoing::Reply { text, .. }] => text.as_str(),
            other => panic!("Expected a single reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_conversion_reply() {
        let dispatcher = dispatcher(StubConverter::with_rate(100.0));
        let actions = dispatcher.handle_text(42, 1, "Евро РУБЛЬ 10").await;
        assert_eq!(
            actions,
            vec![Outgoing::text(42, "Цена 10 евро в рубль - 1000.0")]
        );
        assert_eq!(dispatcher.converter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bad_argument_count_skips_converter() {
        let dispatcher = dispatcher(StubConverter::with_rate(100.0));
        for text in ["евро рубль", "евро рубль 10 20"] {
            let actions = dispatcher.handle_text(42, 5, text).await;
            assert!(reply_text(&actions).starts_with("Ошибка пользователя:\nBadArgumentCount: "));
        }
        assert_eq!(dispatcher.converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_amount_skips_converter() {
        let dispatcher = dispatcher(StubConverter::with_rate(100.0));
        for text in ["евро рубль -5", "евро рубль abc"] {
            let actions = dispatcher.handle_text(42, 5, text).await;
            assert!(reply_text(&actions).starts_with("Ошибка пользователя:\nInvalidAmount: "));
        }
        assert_eq!(dispatcher.converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_currency_is_a_user_error() {
        let dispatcher = dispatcher(StubConverter::with_rate(100.0));
        let actions = dispatcher.handle_text(42, 5, "юань рубль 1").await;
        assert_eq!(
            actions,
            vec![Outgoing::Reply {
                chat_id: 42,
                reply_to: 5,
                text: "Ошибка пользователя:\nUnknownCurrency: Невозможно обработать валюту \"юань\""
                    .into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_then_next_message() {
        let failing = dispatcher(StubConverter::with_outcome(Err(
            ConversionError::ProviderUnavailable("HTTP error: 503 Service Unavailable".into()),
        )));
        let actions = failing.handle_text(42, 5, "евро рубль 1").await;
        let text = reply_text(&actions);
        assert!(text.starts_with("Не удалось обработать команду:\nProviderUnavailable: "));

        let actions = failing.handle_text(42, 6, "/values").await;
        assert_eq!(
            actions[0].message_text(),
            Some("Доступные для конвертации валюты:\n- евро\n- рубль")
        );
    }

    #[tokio::test]
    async fn test_start_sends_greeting_and_help() {
        let dispatcher = dispatcher(StubConverter::with_rate(1.0));
        let actions = dispatcher.handle_text(42, 1, "/start").await;
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].message_text(), Some(reply::GREETING));
        match &actions[1] {
            Outgoing::Send {
                text,
                markdown,
                keyboard,
                ..
            } => {
                assert_eq!(text, reply::INSTRUCTION);
                assert!(*markdown);
                let keyboard = keyboard.as_ref().expect("help should carry a keyboard");
                assert_eq!(keyboard.inline_keyboard[0][0].callback_data, "/values");
            }
            other => panic!("Expected help message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_values_callback() {
        let dispatcher = dispatcher(StubConverter::with_rate(1.0));
        let update = Update {
            update_id: 3,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-1".into(),
                data: Some("/values".into()),
                message: Some(Message {
                    message_id: 9,
                    chat: Chat { id: 42 },
                    text: None,
                }),
            }),
        };

        let actions = dispatcher.handle_update(&update).await;
        assert_eq!(actions.len(), 2);
        assert!(actions[0].message_text().unwrap().contains("- рубль"));
        assert_eq!(actions[1], Outgoing::AnswerCallback { id: "cb-1".into() });
    }

    #[tokio::test]
    async fn test_unknown_callback_is_only_answered() {
        let dispatcher = dispatcher(StubConverter::with_rate(1.0));
        let update = Update {
            update_id: 4,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-2".into(),
                data: Some("/other".into()),
                message: None,
            }),
        };

        let actions = dispatcher.handle_update(&update).await;
        assert_eq!(actions, vec![Outgoing::AnswerCallback { id: "cb-2".into() }]);
    }

    #[tokio::test]
    async fn test_message_without_text_is_ignored() {
        let dispatcher = dispatcher(StubConverter::with_rate(1.0));
        let update = Update {
            update_id: 5,
            message: Some(Message {
                message_id: 1,
                chat: Chat { id: 42 },
                text: None,
            }),
            callback_query: None,
        };

        assert!(dispatcher.handle_update(&update).await.is_empty());
    }
}
