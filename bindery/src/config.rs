//! Container configuration. By default, the config is created with opinionated default values,
//! which can then be overwritten by environment variables prefixed with `BINDERY_` or the
//! `bindery.json` file.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "BINDERY";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "bindery.json";

/// Behavior switches of a [Container](crate::container::Container).
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerConfig {
    /// Fail with a dependency cycle error instead of recursing endlessly when a binding depends on
    /// itself, directly or indirectly.
    pub detect_cycles: bool,
    /// Registering a binding with a name already present for its type replaces the old binding.
    /// When disabled, such registration fails.
    pub allow_binding_override: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            allow_binding_override: true,
        }
    }
}

impl From<OptionalContainerConfig> for ContainerConfig {
    fn from(value: OptionalContainerConfig) -> Self {
        let default = Self::default();
        Self {
            detect_cycles: value.detect_cycles.unwrap_or(default.detect_cycles),
            allow_binding_override: value
                .allow_binding_override
                .unwrap_or(default.allow_binding_override),
        }
    }
}

impl ContainerConfig {
    pub fn with_detect_cycles(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }

    pub fn with_allow_binding_override(mut self, allow_binding_override: bool) -> Self {
        self.allow_binding_override = allow_binding_override;
        self
    }

    /// Reads the config from the optional [CONFIG_FILE] and `BINDERY_*` environment variables.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalContainerConfig>())
            .map(|config| config.into())
    }
}

#[derive(Deserialize)]
struct OptionalContainerConfig {
    detect_cycles: Option<bool>,
    allow_binding_override: Option<bool>,
}

#[cfg(test)]
mod tests {
    use crate::config::{ContainerConfig, OptionalContainerConfig};

    #[test]
    fn should_fill_missing_values_with_defaults() {
        let config: ContainerConfig = OptionalContainerConfig {
            detect_cycles: Some(false),
            allow_binding_override: None,
        }
        .into();

        assert!(!config.detect_cycles);
        assert!(config.allow_binding_override);
    }

    #[test]
    fn should_build_config() {
        let config = ContainerConfig::default()
            .with_detect_cycles(false)
            .with_allow_binding_override(false);

        assert_eq!(
            config,
            ContainerConfig {
                detect_cycles: false,
                allow_binding_override: false,
            }
        );
    }
}
