use std::fs::read_to_string;
use std::path::Path;

use pgxguard_vcf::{MAX_INPUT_BYTES, ParseOptions, SUPPORTED_VERSIONS};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

///
/// Run-independent knobs of the pipeline. Every field has a default, so an
/// empty TOML file is a valid config.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub max_input_bytes: usize,
    pub supported_versions: Vec<String>,
    pub require_pass_filter: bool,
    /// QUAL at or below scores 0, at or above `qual_max` scores 1
    pub qual_min: f64,
    pub qual_max: f64,
    pub depth_min: f64,
    pub depth_max: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_input_bytes: MAX_INPUT_BYTES,
            supported_versions: SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
            require_pass_filter: false,
            qual_min: 20.0,
            qual_max: 200.0,
            depth_min: 10.0,
            depth_max: 100.0,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_bytes == 0 {
            return Err(ConfigError::Invalid("max_input_bytes must be positive".to_string()));
        }
        if self.supported_versions.is_empty() {
            return Err(ConfigError::Invalid(
                "supported_versions must list at least one version".to_string(),
            ));
        }
        if !(self.qual_min < self.qual_max) {
            return Err(ConfigError::Invalid("qual_min must be below qual_max".to_string()));
        }
        if !(self.depth_min < self.depth_max) {
            return Err(ConfigError::Invalid("depth_min must be below depth_max".to_string()));
        }
        Ok(())
    }

    /// Parser options for one run.
    pub fn parse_options(
        &self,
        expected_version: Option<&str>,
        sample: Option<&str>,
    ) -> ParseOptions {
        ParseOptions {
            max_bytes: self.max_input_bytes,
            expected_version: expected_version.map(str::to_string),
            supported_versions: self.supported_versions.clone(),
            sample: sample.map(str::to_string),
            require_pass_filter: self.require_pass_filter,
        }
    }
}

impl TryFrom<&Path> for PipelineConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    #[rstest]
    fn test_empty_config_is_default() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.max_input_bytes, 5 * 1024 * 1024);
    }

    #[rstest]
    fn test_try_from_toml() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "require_pass_filter = true").unwrap();
        writeln!(file, "supported_versions = [\"VCFv4.2\"]").unwrap();

        let config = PipelineConfig::try_from(file.path()).unwrap();
        assert_eq!(config.require_pass_filter, true);
        assert_eq!(config.supported_versions, vec!["VCFv4.2".to_string()]);
        assert_eq!(config.qual_max, 200.0);
    }

    #[rstest]
    #[case("qual_min = 50.0\nqual_max = 10.0")]
    #[case("supported_versions = []")]
    #[case("max_input_bytes = 0")]
    fn test_try_from_rejects_invalid(#[case] content: &str) {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "{}", content).unwrap();
        let result = PipelineConfig::try_from(file.path());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[rstest]
    fn test_try_from_rejects_unknown_key() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "max_bytes = 10").unwrap();
        let result = PipelineConfig::try_from(file.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[rstest]
    fn test_parse_options_carry_config() {
        let config = PipelineConfig {
            require_pass_filter: true,
            ..PipelineConfig::default()
        };
        let options = config.parse_options(Some("VCFv4.2"), None);
        assert_eq!(options.expected_version.as_deref(), Some("VCFv4.2"));
        assert_eq!(options.require_pass_filter, true);
        assert_eq!(options.max_bytes, config.max_input_bytes);
    }
}
