use std::env;
use std::time::Duration;

use url::Url;

/// Deployment name used when `AZURE_OPENAI_DEPLOYMENT` is not set.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4.1";

/// HTTP timeout on the summarization call when `SUMMARY_TIMEOUT_SECS` is not set.
pub const DEFAULT_SUMMARY_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub azure_openai_api_key: String,
    pub azure_openai_endpoint: Url,
    pub azure_openai_api_version: String,
    pub azure_openai_deployment: String,
    pub summary_timeout: Duration,
}

impl AppConfig {
    /// Reads configuration from the process environment, loading a `.env`
    /// file first when one is present.
    ///
    /// # Errors
    ///
    /// Returns a description of the first required variable that is missing,
    /// empty, or malformed.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is normal in deployed environments.
        let _ = dotenvy::dotenv();

        let endpoint_raw = required("AZURE_OPENAI_ENDPOINT")?;
        let azure_openai_endpoint = Url::parse(&endpoint_raw)
            .map_err(|e| format!("AZURE_OPENAI_ENDPOINT: {}", e))?;

        let summary_timeout = match env::var("SUMMARY_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_SUMMARY_TIMEOUT_SECS),
        };

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_SUM_BOT_TOKEN")?,
            azure_openai_api_key: required("AZURE_OPENAI_API_KEY")?,
            azure_openai_endpoint,
            azure_openai_api_version: required("AZURE_OPENAI_API_VERSION")?,
            azure_openai_deployment: env::var("AZURE_OPENAI_DEPLOYMENT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            summary_timeout,
        })
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, String> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("SUMMARY_TIMEOUT_SECS: {}", e))?;
    if secs == 0 {
        return Err("SUMMARY_TIMEOUT_SECS: must be positive".to_string());
    }
    Ok(Duration::from_secs(secs))
}

fn required(name: &str) -> Result<String, String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(format!("{} not set", name)),
        Err(e) => Err(format!("{}: {}", name, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_accepts_positive_seconds() {
        assert_eq!(parse_timeout_secs(" 90 "), Ok(Duration::from_secs(90)));
    }

    #[test]
    fn test_timeout_rejects_zero() {
        assert_eq!(
            parse_timeout_secs("0"),
            Err("SUMMARY_TIMEOUT_SECS: must be positive".to_string())
        );
    }

    #[test]
    fn test_timeout_rejects_garbage() {
        let err = parse_timeout_secs("soon").unwrap_err();
        assert!(err.starts_with("SUMMARY_TIMEOUT_SECS:"));
    }
}
