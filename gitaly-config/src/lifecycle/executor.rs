//! Plan execution against the filesystem.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

use super::plan::{LifecycleAction, LifecyclePlan};

const SCRIPT_MODE: u32 = 0o755;

/// Result of executing a plan.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether this was a dry-run (no actual changes made).
    pub dry_run: bool,

    /// Descriptions of actions that were taken (or would be taken in dry-run).
    pub actions_taken: Vec<String>,

    /// Number of actions that changed something on disk.
    pub changed: usize,

    /// Warnings from the plan.
    pub warnings: Vec<String>,
}

impl ExecutionResult {
    fn new(plan: &LifecyclePlan, dry_run: bool, changed: usize) -> Self {
        Self {
            dry_run,
            actions_taken: plan.actions.iter().map(LifecycleAction::description).collect(),
            changed,
            warnings: plan.warnings.clone(),
        }
    }
}

/// Applies lifecycle plans under a filesystem root.
///
/// Plan paths are absolute; the executor re-roots them under its root, so
/// a plan can be applied to a staging tree as well as to `/`. Files are
/// written to a temporary file in the target directory and renamed into
/// place, so a failed write never leaves a partial file behind.
///
/// # Examples
///
/// ```
/// use gitaly_config::lifecycle::{LifecycleAction, LifecycleExecutor, LifecyclePlan, Ownership};
///
/// let root = tempfile::tempdir().unwrap();
/// let plan = LifecyclePlan::new("demo").add_action(LifecycleAction::CreateDirectory {
///     path: "/var/opt/gitlab/gitaly".into(),
///     owner: Ownership::user("git"),
///     mode: 0o700,
/// });
///
/// let result = LifecycleExecutor::new(root.path()).execute(&plan).unwrap();
/// assert_eq!(result.changed, 1);
/// assert!(root.path().join("var/opt/gitlab/gitaly").is_dir());
/// ```
#[derive(Debug, Clone)]
pub struct LifecycleExecutor {
    root: PathBuf,
    dry_run: bool,
}

impl Default for LifecycleExecutor {
    fn default() -> Self {
        Self::new("/")
    }
}

impl LifecycleExecutor {
    /// Creates an executor applying plans under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    /// Sets the executor to dry-run mode.
    ///
    /// In dry-run mode the plan is reported but the filesystem is left
    /// untouched.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// The filesystem root plans are applied under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Executes `plan`, stopping at the first failing action.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory, file or link cannot be created, or
    /// if an existing path is in the way of the service link.
    pub fn execute(&self, plan: &LifecyclePlan) -> Result<ExecutionResult> {
        if self.dry_run {
            for action in &plan.actions {
                log::info!("[dry-run] {}", action.description());
            }
            return Ok(ExecutionResult::new(plan, true, 0));
        }

        let mut changed = 0;
        for action in &plan.actions {
            if self.execute_action(action)? {
                log::info!("{}", action.description());
                changed += 1;
            } else {
                log::debug!("up to date: {}", action.description());
            }
        }

        Ok(ExecutionResult::new(plan, false, changed))
    }

    /// Returns whether the action changed anything.
    fn execute_action(&self, action: &LifecycleAction) -> Result<bool> {
        match action {
            LifecycleAction::CreateDirectory { path, mode, .. } => {
                create_directory(&self.rooted(path), *mode)
            }
            LifecycleAction::WriteFile {
                path,
                contents,
                mode,
                ..
            } => write_atomic(&self.rooted(path), contents.as_bytes(), *mode),
            LifecycleAction::RegisterService {
                definition_dir,
                link_path,
                run_script,
                log_run_script,
                ..
            } => {
                let staged_dir = self.rooted(definition_dir);
                let mut changed = write_atomic(
                    &staged_dir.join("run"),
                    run_script.as_bytes(),
                    SCRIPT_MODE,
                )?;
                changed |= write_atomic(
                    &staged_dir.join("log").join("run"),
                    log_run_script.as_bytes(),
                    SCRIPT_MODE,
                )?;
                // The link targets the deployed path, not the staged one.
                changed |= link_service(definition_dir, &self.rooted(link_path))?;
                Ok(changed)
            }
        }
    }

    /// Maps an absolute plan path under the executor's root.
    fn rooted(&self, path: &Path) -> PathBuf {
        let relative: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        self.root.join(relative)
    }
}

fn create_directory(path: &Path, mode: u32) -> Result<bool> {
    if path.exists() && !path.is_dir() {
        return Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "exists and is not a directory".into(),
        });
    }

    let created = !path.exists();
    if created {
        fs::create_dir_all(path)?;
    }
    let mode_changed = set_mode(path, mode)?;
    Ok(created || mode_changed)
}

/// Writes `contents` to `path` via a sibling temporary file and rename.
///
/// Returns whether anything changed. Unchanged contents are left alone
/// apart from the mode; missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the file or its parent directory cannot be written.
pub fn write_atomic(path: &Path, contents: &[u8], mode: u32) -> Result<bool> {
    if path.is_file() && fs::read(path)? == contents {
        return set_mode(path, mode);
    }

    let dir = path.parent().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "has no parent directory".into(),
    })?;
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    set_mode(tmp.path(), mode)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(true)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let current = fs::metadata(path)?.permissions().mode() & 0o7777;
    if current == mode {
        return Ok(false);
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(true)
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<bool> {
    Ok(false)
}

#[cfg(unix)]
fn link_service(target: &Path, link: &Path) -> Result<bool> {
    match fs::read_link(link) {
        Ok(existing) if existing == target => return Ok(false),
        Ok(existing) => {
            return Err(Error::InvalidPath {
                path: link.to_path_buf(),
                reason: format!("already links to {}", existing.display()),
            });
        }
        Err(_) if link.symlink_metadata().is_ok() => {
            return Err(Error::InvalidPath {
                path: link.to_path_buf(),
                reason: "exists and is not a symlink".into(),
            });
        }
        Err(_) => {}
    }

    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(target, link)?;
    Ok(true)
}

#[cfg(not(unix))]
fn link_service(_target: &Path, link: &Path) -> Result<bool> {
    Err(Error::InvalidPath {
        path: link.to_path_buf(),
        reason: "service links require a unix platform".into(),
    })
}
