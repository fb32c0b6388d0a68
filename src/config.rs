//! Service configuration.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults,
//! 2. an optional YAML file (`config.yml` in the working directory, or the
//!    path given on the command line),
//! 3. environment variables prefixed `NICHE_` (`NICHE_API_KEY`,
//!    `NICHE_PROVIDER`, `NICHE_PORT`, ...). A `.env` file is loaded into the
//!    environment first by the binary.
//!
//! `NICHE_RENDERER_ARGS` is split on spaces.

use crate::client::LlmConfig;
use crate::error::Result;
use crate::exec_ctx::{ExecCtx, DEFAULT_MODEL};
use crate::logo::{BingImageLookup, LogoLookup, NoLogos};
use crate::render::CommandRenderer;
use crate::{backend::gemini::DEFAULT_GEMINI_URL, AnalysisError};
use config::{Config as ConfigBuilder, Environment, File, FileFormat, Map};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
/// Prefix of the environment overrides.
pub const ENV_PREFIX: &str = "NICHE";

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Which hosted model API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAi,
}

/// The resolved service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    /// Required for Gemini; optional bearer key for OpenAI-compatible servers.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Provider host. Defaults to the provider's public endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request HTTP timeout for model calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Resolve competitor logos through Bing. When off, logos are empty.
    #[serde(default = "default_logo_lookup")]
    pub logo_lookup: bool,
    #[serde(default = "default_renderer_program")]
    pub renderer_program: String,
    /// Renderer arguments; `{input}` and `{output}` are replaced by file paths.
    #[serde(default = "default_renderer_args")]
    pub renderer_args: Vec<String>,
}

fn default_provider() -> Provider {
    Provider::Gemini
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    LlmConfig::default().max_tokens
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_logo_lookup() -> bool {
    true
}

fn default_renderer_program() -> String {
    "wkhtmltopdf".to_string()
}

fn default_renderer_args() -> Vec<String> {
    vec!["--quiet".into(), "{input}".into(), "{output}".into()]
}

/// Load the configuration from the file layer and the process environment.
///
/// An explicitly given `path` must exist; the default `config.yml` is optional.
pub fn get_config(path: Option<&str>) -> Result<AppConfig> {
    load(path, None)
}

/// Same as [`get_config`] but reads overrides from `env` instead of the
/// process environment.
pub fn load(path: Option<&str>, env: Option<Map<String, String>>) -> Result<AppConfig> {
    let (file, required) = match path {
        Some(p) => (p, true),
        None => (DEFAULT_CONFIG_FILE, false),
    };
    if required && !Path::new(file).exists() {
        return Err(AnalysisError::InvalidConfig(format!(
            "config file '{}' not found",
            file
        )));
    }
    if Path::new(file).exists() {
        info!("loading configuration from '{}'", file);
    }

    let settings = ConfigBuilder::builder()
        .add_source(File::new(file, FileFormat::Yaml).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true)
                .list_separator(" ")
                .with_list_parse_key("renderer_args")
                .source(env),
        )
        .build()
        .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;

    let config: AppConfig = settings
        .try_deserialize()
        .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    fn validate(&self) -> Result<()> {
        if self.provider == Provider::Gemini && self.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "api_key is required for the gemini provider (set NICHE_API_KEY)".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AnalysisError::InvalidConfig(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(AnalysisError::InvalidConfig("max_tokens must be positive".into()));
        }
        if self.renderer_program.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig("renderer_program must not be empty".into()));
        }
        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AnalysisError::InvalidConfig(format!("bad listen address: {}", e)))
    }

    /// Build the execution context every analysis runs with.
    pub fn exec_ctx(&self) -> Result<ExecCtx> {
        let llm = LlmConfig::default()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let builder = match self.provider {
            Provider::Gemini => {
                let base = self.base_url.as_deref().unwrap_or(DEFAULT_GEMINI_URL);
                ExecCtx::builder(base).gemini(self.api_key.clone().unwrap_or_default())
            }
            #[cfg(feature = "openai")]
            Provider::OpenAi => {
                let base = self.base_url.as_deref().unwrap_or(DEFAULT_OPENAI_URL);
                ExecCtx::builder(base).openai(self.api_key.clone())
            }
            #[cfg(not(feature = "openai"))]
            Provider::OpenAi => {
                return Err(AnalysisError::InvalidConfig(
                    "built without the `openai` feature".into(),
                ))
            }
        };

        builder
            .model(self.model.clone())
            .config(llm)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }

    pub fn logo_lookup(&self) -> Result<Arc<dyn LogoLookup>> {
        if !self.logo_lookup {
            return Ok(Arc::new(NoLogos));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AnalysisError::InvalidConfig(format!("HTTP client: {}", e)))?;
        Ok(Arc::new(BingImageLookup::new(client)))
    }

    pub fn renderer(&self) -> CommandRenderer {
        CommandRenderer::new(self.renderer_program.clone(), self.renderer_args.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_with_key_from_env() {
        let config = load(None, env(&[("NICHE_API_KEY", "AIza-test")])).unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.api_key.as_deref(), Some("AIza-test"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.port, 8000);
        assert!(config.logo_lookup);
        assert_eq!(config.renderer_args, vec!["--quiet", "{input}", "{output}"]);
    }

    #[test]
    fn test_gemini_requires_key() {
        let err = load(None, env(&[])).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[cfg(feature = "openai")]
    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "provider: openai\nbase_url: http://localhost:11434\nmodel: llama3\nport: 9000\nlogo_lookup: false"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = load(
            Some(&path),
            env(&[("NICHE_PORT", "9100"), ("NICHE_RENDERER_ARGS", "-q {input} {output}")]),
        )
        .unwrap();

        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, "llama3");
        assert_eq!(config.port, 9100);
        assert!(!config.logo_lookup);
        assert_eq!(config.renderer_args, vec!["-q", "{input}", "{output}"]);

        let ctx = config.exec_ctx().unwrap();
        assert_eq!(ctx.backend.name(), "openai");
        assert_eq!(ctx.base_url, "http://localhost:11434");
        assert_eq!(ctx.model, "llama3");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = load(Some("/nonexistent/niche.yml"), env(&[("NICHE_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_temperature_out_of_range() {
        let err = load(
            None,
            env(&[("NICHE_API_KEY", "k"), ("NICHE_TEMPERATURE", "3.5")]),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_gemini_ctx_uses_public_host() {
        let config = load(None, env(&[("NICHE_API_KEY", "k")])).unwrap();
        let ctx = config.exec_ctx().unwrap();
        assert_eq!(ctx.backend.name(), "gemini");
        assert_eq!(ctx.base_url, DEFAULT_GEMINI_URL);
        assert_eq!(config.addr().unwrap().port(), 8000);
    }
}
