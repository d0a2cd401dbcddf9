//! Command to show the resolved configuration.

use crate::error::CliError;
use crate::utils::{load_settings, resolve_config, GlobalOptions};
use clap::{Args, ValueEnum};

/// Output format for the resolved configuration.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ResolveFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// Show the resolved configuration.
#[derive(Args)]
pub struct ResolveCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = ResolveFormat::Json)]
    pub format: ResolveFormat,
}

impl ResolveCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let settings = load_settings(global)?;
        let config = resolve_config(&settings)?;

        let output = match self.format {
            ResolveFormat::Json => serde_json::to_string_pretty(&config)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| CliError::Output(e.to_string()))?,
            ResolveFormat::Yaml => {
                serde_yaml::to_string(&config).map_err(|e| CliError::Output(e.to_string()))?
            }
        };

        print!("{output}");
        Ok(())
    }
}
