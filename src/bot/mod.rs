//! Telegram front-end: parsing, dispatch, replies and transport.

pub mod command;
pub mod dispatch;
pub mod reply;
pub mod runner;
pub mod telegram;

pub use dispatch::{Dispatcher, Outgoing};
pub use telegram::TelegramClient;
