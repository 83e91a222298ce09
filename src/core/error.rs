//! Error types for conversions and bot commands.

/// Failures of a single currency conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Невозможно обработать валюту \"{0}\"")]
    UnknownCurrency(String),

    #[error("Сервис курсов валют недоступен: {0}")]
    ProviderUnavailable(String),

    #[error("Некорректный ответ сервиса курсов валют: {0}")]
    MalformedResponse(String),
}

impl ConversionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::UnknownCurrency(_) => "UnknownCurrency",
            ConversionError::ProviderUnavailable(_) => "ProviderUnavailable",
            ConversionError::MalformedResponse(_) => "MalformedResponse",
        }
    }

    /// True when the user can fix the request themselves.
    pub fn is_user_error(&self) -> bool {
        matches!(self, ConversionError::UnknownCurrency(_))
    }
}

/// Failures while handling one inbound message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Неверное количество аргументов команды: ожидалось 3, получено {0}")]
    BadArgumentCount(usize),

    #[error("Количество валюты должно быть неотрицательным числом, получено \"{0}\"")]
    InvalidAmount(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::BadArgumentCount(_) => "BadArgumentCount",
            CommandError::InvalidAmount(_) => "InvalidAmount",
            CommandError::Conversion(e) => e.kind(),
        }
    }

    pub fn is_user_error(&self) -> bool {
        match self {
            CommandError::BadArgumentCount(_) | CommandError::InvalidAmount(_) => true,
            CommandError::Conversion(e) => e.is_user_error(),
        }
    }
}
