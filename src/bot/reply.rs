use crate::core::{CommandError, ConversionRequest};

pub const GREETING: &str = "Привет! Я бот для конвертации валют!";

pub const INSTRUCTION: &str = "Ты можешь использовать следующие команды:\n\
    /start - для получения приветственного сообщения и инструкции по использованию бота\n\
    /help - для получения инструкции по использованию бота\n\
    /values - для получения списка доступных валют\n\
    \nДля конвертации одной валюты в другую нужно просто отправить мне сообщение вида:\n\
    _<из какой валюты> <в какую валюту> <количество>_\n\
    *Пример*: евро рубль 10";

pub const VALUES_BUTTON: &str = "Доступные валюты";

pub fn currency_list<S: AsRef<str>>(names: &[S]) -> String {
    let lines: Vec<String> = names
        .iter()
        .map(|name| format!("- {}", name.as_ref()))
        .collect();
    format!("Доступные для конвертации валюты:\n{}", lines.join("\n"))
}

pub fn conversion(request: &ConversionRequest, result: f64) -> String {
    // Debug keeps the fractional part of whole numbers: 1000.0, not 1000
    format!(
        "Цена {} {} в {} - {:?}",
        request.amount_text, request.source, request.target, result
    )
}

pub fn error(err: &CommandError) -> String {
    let heading = if err.is_user_error() {
        "Ошибка пользователя"
    } else {
        "Не удалось обработать команду"
    };
    format!("{heading}:\n{}: {err}", err.kind())
}
