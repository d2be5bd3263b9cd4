use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the OpenAI-compatible model endpoint.
    pub api_key: String,
    /// Base URL of the model endpoint (the `/chat/completions` path is
    /// appended by the client).
    pub base_url: String,
    /// Model allow-list. The first entry is the default model.
    pub models: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let models = parse_models(&require_env("LLM_MODELS")?)
            .context("LLM_MODELS must contain at least one model name")?;

        Ok(Config {
            api_key: require_env("LLM_API_KEY")?,
            base_url: require_env("LLM_BASE_URL")?,
            models,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Splits the comma-separated model list, trimming blanks. The order is
/// preserved — the first model is the default offered to callers.
fn parse_models(raw: &str) -> Option<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    if models.is_empty() {
        None
    } else {
        Some(models)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_models_preserves_order() {
        let models = parse_models("meta-llama-3.1-8b-instruct, codestral-22b").unwrap();
        assert_eq!(models, vec!["meta-llama-3.1-8b-instruct", "codestral-22b"]);
    }

    #[test]
    fn test_parse_models_skips_blank_entries() {
        let models = parse_models("a,, b ,").unwrap();
        assert_eq!(models, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_models_rejects_empty_list() {
        assert!(parse_models(" , ,").is_none());
        assert!(parse_models("").is_none());
    }
}
