//! Config command for statelog.
//!
//! Prints the effective configuration after all layers are applied.

use crate::config::Config;
use crate::error::Result;

/// Options for the config command.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Output as JSON instead of TOML.
    pub json: bool,
}

/// The config command implementation.
pub struct ConfigCommand {
    config: Config,
}

impl ConfigCommand {
    /// Create a config command for an already loaded config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Render the config.
    pub fn run(&self, options: &ConfigOptions) -> Result<String> {
        if options.json {
            Ok(serde_json::to_string_pretty(&self.config)?)
        } else {
            self.config.to_toml_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelogInterval;
    use std::time::Duration;

    #[test]
    fn test_toml_output() {
        let cmd = ConfigCommand::new(Config::default());
        let text = cmd.run(&ConfigOptions::default()).unwrap();

        assert!(text.contains("[logger]"));
        assert!(text.contains("interval = \"on-change\""));
        assert!(text.contains("error_level = \"error\""));
    }

    #[test]
    fn test_json_output() {
        let mut config = Config::default();
        config.logger.interval = RelogInterval::Every(Duration::from_secs(90));
        let cmd = ConfigCommand::new(config);

        let text = cmd.run(&ConfigOptions { json: true }).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["logger"]["interval"], "90s");
        assert_eq!(json["logger"]["success_level"], "info");
    }
}
