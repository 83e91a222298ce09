//! Parsing of inbound message text into bot commands.

use crate::core::{CommandError, ConversionRequest};

/// Callback data carried by the inline "available currencies" button.
pub const VALUES_CALLBACK: &str = "/values";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Values,
    Convert(ConversionRequest),
}

/// Parses a message of the form `/command` or `<source> <target> <amount>`.
pub fn parse(text: &str) -> Result<Command, CommandError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if let Some(command) = tokens.first().and_then(|t| parse_slash_command(t)) {
        return Ok(command);
    }

    let [source, target, amount] = tokens.as_slice() else {
        return Err(CommandError::BadArgumentCount(tokens.len()));
    };

    Ok(Command::Convert(ConversionRequest {
        source: source.to_lowercase(),
        target: target.to_lowercase(),
        amount: parse_amount(amount)?,
        amount_text: amount.to_string(),
    }))
}

fn parse_slash_command(token: &str) -> Option<Command> {
    let name = token.strip_prefix('/')?;
    // Group chats address commands as /help@bot_name
    let name = name.split('@').next().unwrap_or(name);
    match name {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        "values" => Some(Command::Values),
        _ => None,
    }
}

fn parse_amount(token: &str) -> Result<f64, CommandError> {
    match token.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(CommandError::InvalidAmount(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(text: &str) -> ConversionRequest {
        match parse(text) {
            Ok(Command::Convert(request)) => request,
            other => panic!("Expected a conversion, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_conversion() {
        let request = convert("  Евро   РУБЛЬ 10 ");
        assert_eq!(request.source, "евро");
        assert_eq!(request.target, "рубль");
        assert_eq!(request.amount, 10.0);
        assert_eq!(request.amount_text, "10");
    }

    #[test]
    fn test_parse_fractional_and_zero_amounts() {
        assert_eq!(convert("евро рубль 2.5").amount, 2.5);
        assert_eq!(convert("евро рубль 0").amount, 0.0);
        assert_eq!(convert("евро рубль 1e3").amount, 1000.0);
    }

    #[test]
    fn test_bad_argument_count() {
        assert_eq!(parse("евро рубль"), Err(CommandError::BadArgumentCount(2)));
        assert_eq!(
            parse("евро рубль 10 20"),
            Err(CommandError::BadArgumentCount(4))
        );
        assert_eq!(parse("   "), Err(CommandError::BadArgumentCount(0)));
    }

    #[test]
    fn test_invalid_amount() {
        for token in ["-5", "abc", "NaN", "inf", "10,5"] {
            assert_eq!(
                parse(&format!("евро рубль {token}")),
                Err(CommandError::InvalidAmount(token.to_string())),
                "{token}"
            );
        }
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse("/start"), Ok(Command::Start));
        assert_eq!(parse("/help"), Ok(Command::Help));
        assert_eq!(parse("/values"), Ok(Command::Values));
        assert_eq!(parse("/help@ratebot extra"), Ok(Command::Help));
        assert_eq!(parse(VALUES_CALLBACK), Ok(Command::Values));
    }

    #[test]
    fn test_unknown_slash_command_is_a_conversion_attempt() {
        assert_eq!(parse("/convert"), Err(CommandError::BadArgumentCount(1)));
    }
}
