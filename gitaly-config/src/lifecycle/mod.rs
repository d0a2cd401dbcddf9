//! Service lifecycle: converging the host toward a running gitaly.
//!
//! Convergence is split into planning and execution:
//!
//! - [`ServiceLifecycle`] turns a [`ServiceLayout`] and a rendered
//!   [`Document`] into a [`LifecyclePlan`] (pure)
//! - [`LifecycleExecutor`] applies a plan under a filesystem root, or only
//!   reports it in dry-run mode
//!
//! Runs against one service instance must be serialized by the caller.

pub mod executor;
pub mod layout;
pub mod plan;
pub mod runit;

pub use executor::{write_atomic, ExecutionResult, LifecycleExecutor};
pub use layout::{ServiceLayout, CONFIG_FILE_NAME, SERVICE_NAME};
pub use plan::{LifecycleAction, LifecyclePlan, Ownership};

use crate::error::Result;
use crate::render::{Document, DocumentRenderer};
use crate::resolve::ConfigResolver;
use crate::settings::{DefaultsTable, SettingsTree};

const PRIVATE_DIR_MODE: u32 = 0o700;
const PUBLIC_DIR_MODE: u32 = 0o755;
const ENV_FILE_MODE: u32 = 0o644;
const CONFIG_FILE_MODE: u32 = 0o640;

/// Plans convergence of the gitaly service.
///
/// # Examples
///
/// ```
/// use gitaly_config::lifecycle::{LifecycleAction, ServiceLifecycle};
/// use gitaly_config::settings::{DefaultsTable, SettingsTree};
///
/// let plan = ServiceLifecycle::plan_from_settings(&SettingsTree::new(), DefaultsTable::builtin())
///     .unwrap();
/// assert!(matches!(
///     plan.actions.last(),
///     Some(LifecycleAction::RegisterService { .. })
/// ));
///
/// let disabled = SettingsTree::new().with("gitaly.enable", false);
/// let plan = ServiceLifecycle::plan_from_settings(&disabled, DefaultsTable::builtin()).unwrap();
/// assert!(plan.is_empty());
/// ```
pub struct ServiceLifecycle;

impl ServiceLifecycle {
    /// Plans the actions for `layout`, writing `document` as the config.
    ///
    /// The enabled plan creates the data, log and env directories, writes
    /// the env files and the config document, and registers the service
    /// last so it never starts without its configuration. A disabled layout
    /// yields an empty plan.
    #[must_use]
    pub fn plan(layout: &ServiceLayout, document: &Document) -> LifecyclePlan {
        if !layout.enabled {
            return Self::disabled_plan();
        }

        let service_owner = Ownership::user(layout.user.clone());
        let mut plan = LifecyclePlan::new("Converge gitaly service")
            .add_action(LifecycleAction::CreateDirectory {
                path: layout.data_dir.clone(),
                owner: service_owner.clone(),
                mode: PRIVATE_DIR_MODE,
            })
            .add_action(LifecycleAction::CreateDirectory {
                path: layout.log_dir.clone(),
                owner: service_owner,
                mode: PRIVATE_DIR_MODE,
            })
            .add_action(LifecycleAction::CreateDirectory {
                path: layout.env_dir.clone(),
                owner: Ownership::root(),
                mode: PUBLIC_DIR_MODE,
            });

        if layout.env.is_empty() {
            plan = plan.add_warning(format!(
                "No environment variables configured; {} will be empty",
                layout.env_dir.display()
            ));
        }
        for (name, value) in &layout.env {
            plan = plan.add_action(LifecycleAction::WriteFile {
                path: layout.env_dir.join(name),
                contents: value.clone(),
                owner: Ownership::root(),
                mode: ENV_FILE_MODE,
            });
        }

        plan.add_action(LifecycleAction::WriteFile {
            path: layout.config_path(),
            contents: document.as_str().to_string(),
            owner: Ownership::user_and_group("root", layout.group.clone()),
            mode: CONFIG_FILE_MODE,
        })
        .add_action(LifecycleAction::RegisterService {
            name: SERVICE_NAME.to_string(),
            definition_dir: layout.service_definition_dir(),
            link_path: layout.service_link(),
            run_script: runit::run_script(layout),
            log_run_script: runit::log_run_script(layout),
        })
    }

    /// Resolves, renders and plans in one step.
    ///
    /// When the service is disabled the configuration is not resolved at
    /// all, so settings that would fail resolution do not block a disabled
    /// service.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout or, for an enabled service, the
    /// configuration cannot be resolved.
    pub fn plan_from_settings(
        settings: &SettingsTree,
        defaults: &DefaultsTable,
    ) -> Result<LifecyclePlan> {
        let layout = ServiceLayout::resolve(settings, defaults)?;
        if !layout.enabled {
            return Ok(Self::disabled_plan());
        }

        let config = ConfigResolver::new(defaults).resolve(settings)?;
        let document = DocumentRenderer::render(&config);
        Ok(Self::plan(&layout, &document))
    }

    fn disabled_plan() -> LifecyclePlan {
        log::info!("gitaly is disabled; nothing to converge");
        LifecyclePlan::new("Converge gitaly service")
            .add_warning("gitaly is disabled (gitaly.enable = false); no changes planned")
    }
}
