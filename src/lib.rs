pub mod bot;
pub mod cli;
pub mod core;
pub mod providers;

use crate::bot::Dispatcher;
use crate::core::config::AppConfig;
use crate::providers::RateApiConverter;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Start the bot and poll for messages
    Run,
    /// Handle one message text locally and print the replies
    Convert { text: String },
    /// Print the supported currencies
    Values,
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        provider = %config.converter.url,
        currencies = config.converter.currencies_mapping.len(),
        "Loaded config"
    );
    Ok(config)
}

pub fn build_dispatcher(config: &AppConfig) -> Result<Dispatcher<RateApiConverter>> {
    let converter = RateApiConverter::from_config(&config.converter)?;
    Ok(Dispatcher::new(converter, config.display_currencies()))
}

/// Runs `command` and returns the text it would show the user.
pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<String> {
    let config = load_config(config_path)?;

    match command {
        AppCommand::Run => {
            info!("Currency bot starting...");
            let token = config.telegram.resolve_token()?;
            let poll_timeout = Duration::from_secs(config.telegram.poll_timeout_secs);
            let client = bot::TelegramClient::new(&config.telegram.base_url, &token, poll_timeout)?;
            let dispatcher = build_dispatcher(&config)?;
            bot::runner::run_polling(Arc::new(client), Arc::new(dispatcher), poll_timeout).await?;
            Ok(String::new())
        }
        AppCommand::Convert { text } => {
            let dispatcher = build_dispatcher(&config)?;
            let replies: Vec<String> = dispatcher
                .handle_text(0, 0, &text)
                .await
                .iter()
                .filter_map(|action| action.message_text().map(str::to_string))
                .collect();
            Ok(replies.join("\n\n"))
        }
        AppCommand::Values => Ok(bot::reply::currency_list(&config.display_currencies())),
    }
}
