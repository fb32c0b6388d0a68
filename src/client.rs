/// Sampling configuration for generation requests.
///
/// Outputs must be parseable rather than creative, so the temperature
/// defaults to the minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 8192,
        }
    }
}

impl LlmConfig {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_deterministic() {
        let config = LlmConfig::default();
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 8192);
    }

    #[test]
    fn test_builders() {
        let config = LlmConfig::default().with_temperature(0.2).with_max_tokens(512);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 512);
    }
}
