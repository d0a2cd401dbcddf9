//! Command to render gitaly's config.toml.

use crate::error::CliError;
use crate::utils::{render_document, GlobalOptions};
use clap::Args;
use gitaly_config::lifecycle::write_atomic;
use std::path::PathBuf;

const OUTPUT_MODE: u32 = 0o644;

/// Render config.toml to stdout or a file.
#[derive(Args)]
pub struct RenderCommand {
    /// Write the document to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let document = render_document(global)?;

        match self.output {
            Some(path) => {
                let changed = write_atomic(&path, document.as_bytes(), OUTPUT_MODE)?;
                if !global.quiet {
                    if changed {
                        eprintln!("Wrote {}", path.display());
                    } else {
                        eprintln!("{} is up to date", path.display());
                    }
                }
            }
            None => print!("{document}"),
        }

        Ok(())
    }
}
