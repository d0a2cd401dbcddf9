//! Plan types for service lifecycle convergence.
//!
//! A plan lists the filesystem changes that bring the service into its
//! desired state without performing any of them.

use std::fmt;
use std::path::PathBuf;

/// Owner of a created path.
///
/// Recorded for reporting; the executor applies modes but does not change
/// ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    /// Owning user.
    pub user: String,
    /// Owning group, when it matters.
    pub group: Option<String>,
}

impl Ownership {
    /// Ownership by `user` alone.
    #[must_use]
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            group: None,
        }
    }

    /// Ownership by `user` and `group`.
    #[must_use]
    pub fn user_and_group(user: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            group: Some(group.into()),
        }
    }

    /// The superuser.
    #[must_use]
    pub fn root() -> Self {
        Self::user("root")
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group {
            Some(ref group) => write!(f, "{}:{group}", self.user),
            None => f.write_str(&self.user),
        }
    }
}

/// A single step of a lifecycle plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Ensure a directory exists with the given mode.
    CreateDirectory {
        /// Directory path.
        path: PathBuf,
        /// Intended owner.
        owner: Ownership,
        /// Permission bits.
        mode: u32,
    },

    /// Atomically write a file.
    WriteFile {
        /// File path.
        path: PathBuf,
        /// Full file contents.
        contents: String,
        /// Intended owner.
        owner: Ownership,
        /// Permission bits.
        mode: u32,
    },

    /// Register the process with the supervisor.
    RegisterService {
        /// Service name.
        name: String,
        /// Service definition directory.
        definition_dir: PathBuf,
        /// Active service link pointing at `definition_dir`.
        link_path: PathBuf,
        /// Contents of `<definition_dir>/run`.
        run_script: String,
        /// Contents of `<definition_dir>/log/run`.
        log_run_script: String,
    },
}

impl LifecycleAction {
    /// Returns a human-readable description of this action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateDirectory { path, owner, mode } => {
                format!("Create directory {} ({owner}, {mode:04o})", path.display())
            }
            Self::WriteFile {
                path, owner, mode, ..
            } => {
                format!("Write {} ({owner}, {mode:04o})", path.display())
            }
            Self::RegisterService {
                name, link_path, ..
            } => {
                format!("Register service {name} at {}", link_path.display())
            }
        }
    }
}

/// Ordered actions converging the service, plus notes for the user.
///
/// # Examples
///
/// ```
/// use gitaly_config::lifecycle::{LifecycleAction, LifecyclePlan, Ownership};
///
/// let plan = LifecyclePlan::new("Converge gitaly").add_action(LifecycleAction::CreateDirectory {
///     path: "/var/opt/gitlab/gitaly".into(),
///     owner: Ownership::user("git"),
///     mode: 0o700,
/// });
/// assert_eq!(plan.len(), 1);
/// assert!(plan.warnings.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePlan {
    /// A human-readable description of the plan.
    pub description: String,

    /// The sequence of actions to perform.
    pub actions: Vec<LifecycleAction>,

    /// Notes to communicate to the user.
    pub warnings: Vec<String>,
}

impl LifecyclePlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            actions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an action to the plan.
    #[must_use]
    pub fn add_action(mut self, action: LifecycleAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds a warning to the plan.
    #[must_use]
    pub fn add_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Checks if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_display() {
        assert_eq!(Ownership::root().to_string(), "root");
        assert_eq!(Ownership::user_and_group("root", "git").to_string(), "root:git");
    }

    #[test]
    fn test_descriptions() {
        let dir = LifecycleAction::CreateDirectory {
            path: PathBuf::from("/var/log/gitlab/gitaly"),
            owner: Ownership::user("git"),
            mode: 0o700,
        };
        assert_eq!(
            dir.description(),
            "Create directory /var/log/gitlab/gitaly (git, 0700)"
        );

        let file = LifecycleAction::WriteFile {
            path: PathBuf::from("/var/opt/gitlab/gitaly/config.toml"),
            contents: String::new(),
            owner: Ownership::user_and_group("root", "git"),
            mode: 0o640,
        };
        assert_eq!(
            file.description(),
            "Write /var/opt/gitlab/gitaly/config.toml (root:git, 0640)"
        );
    }

    #[test]
    fn test_plan_builder() {
        let plan = LifecyclePlan::new("test")
            .add_warning("careful")
            .add_action(LifecycleAction::CreateDirectory {
                path: PathBuf::from("/a"),
                owner: Ownership::root(),
                mode: 0o755,
            });
        assert_eq!(plan.len(), 1);
        assert!(!plan.is_empty());
        assert_eq!(plan.warnings, vec!["careful".to_string()]);
        assert!(LifecyclePlan::new("empty").is_empty());
    }
}
