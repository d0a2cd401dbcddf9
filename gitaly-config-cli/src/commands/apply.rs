//! Command to converge the gitaly service on disk.

use crate::error::CliError;
use crate::utils::{load_settings, GlobalOptions};
use clap::Args;
use gitaly_config::{DefaultsTable, LifecycleExecutor, ServiceLifecycle};
use std::path::PathBuf;

/// Converge the service on disk.
#[derive(Args)]
pub struct ApplyCommand {
    /// Filesystem root the service layout is created under
    #[arg(long, value_name = "DIR", default_value = "/")]
    pub root: PathBuf,

    /// Show what would change without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplyCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if !self.root.is_dir() {
            return Err(CliError::InvalidArguments(format!(
                "Root is not a directory: {}",
                self.root.display()
            )));
        }

        let settings = load_settings(global)?;
        let plan = ServiceLifecycle::plan_from_settings(&settings, DefaultsTable::builtin())?;

        let mut executor = LifecycleExecutor::new(&self.root);
        if self.dry_run {
            executor = executor.dry_run();
        }
        let result = executor.execute(&plan)?;

        for warning in &result.warnings {
            eprintln!("Warning: {warning}");
        }

        if result.dry_run {
            for action in &result.actions_taken {
                println!("Would: {action}");
            }
        } else if !global.quiet {
            for action in &result.actions_taken {
                println!("{action}");
            }
            eprintln!(
                "Applied {} of {} action(s); the rest were up to date",
                result.changed,
                result.actions_taken.len()
            );
        }

        Ok(())
    }
}
