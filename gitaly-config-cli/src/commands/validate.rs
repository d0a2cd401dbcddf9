//! Command to validate gitaly settings.

use crate::error::CliError;
use crate::utils::{load_settings, resolve_config, GlobalOptions};
use clap::Args;
use gitaly_config::{DefaultsTable, DocumentRenderer, ServiceLayout};

/// Check that the settings resolve and render.
#[derive(Args)]
pub struct ValidateCommand {}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        for path in &global.settings {
            if !path.exists() {
                return Err(CliError::InvalidArguments(format!(
                    "File not found: {}",
                    path.display()
                )));
            }
        }

        let settings = match load_settings(global) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Parse error: {e}");
                return Err(CliError::SemanticFailure(
                    "Settings are invalid".to_string(),
                ));
            }
        };

        let checked = ServiceLayout::resolve(&settings, DefaultsTable::builtin())
            .map_err(CliError::from)
            .and_then(|_| resolve_config(&settings))
            .map(|config| DocumentRenderer::render(&config));

        match checked {
            Ok(_) => {
                println!("Configuration is valid");
                Ok(())
            }
            Err(e) => {
                eprintln!("Validation error: {e}");
                Err(CliError::SemanticFailure(
                    "Configuration validation failed".to_string(),
                ))
            }
        }
    }
}
