use std::error::Error;
use tgsum::errors::BotError;

#[test]
fn test_bot_error_implements_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    let error = BotError::ParseError("test error".to_string());
    assert_error(&error);
}

#[test]
fn test_bot_error_display() {
    let error = BotError::ApiError("chat not found".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to access Telegram API: chat not found"
    );

    let error = BotError::OpenAIError("Deployment unavailable".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to access Azure OpenAI API: Deployment unavailable"
    );

    let error = BotError::HttpError("Connection error".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: Connection error"
    );

    let error = BotError::GeneralError("plain".to_string());
    assert_eq!(format!("{error}"), "plain");
}

#[test]
fn test_bot_error_from_conversions() {
    let err = anyhow::anyhow!("test error");
    let bot_err: BotError = err.into();
    match bot_err {
        BotError::GeneralError(msg) => assert!(msg.contains("test error")),
        _ => panic!("Unexpected error type"),
    }

    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let bot_err: BotError = json_err.into();
    assert!(matches!(bot_err, BotError::ParseError(_)));

    // Compile-time check that reqwest errors convert.
    #[allow(unused)]
    #[allow(clippy::items_after_statements)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> BotError {
        BotError::from(err)
    }
}
