//! Supervisor scripts for the gitaly service.

use crate::lifecycle::layout::ServiceLayout;

/// The `run` script starting gitaly under the service account.
#[must_use]
pub fn run_script(layout: &ServiceLayout) -> String {
    let owner = format!("{}:{}", layout.user, layout.group);
    format!(
        "#!/bin/sh\n\
         set -e\n\
         \n\
         exec 2>&1\n\
         umask 077\n\
         exec chpst -e {env_dir} -P -U {owner} -u {owner} {bin} {config}\n",
        env_dir = layout.env_dir.display(),
        bin = layout.bin_path.display(),
        config = layout.config_path().display(),
    )
}

/// The `log/run` script feeding output into the log directory.
#[must_use]
pub fn log_run_script(layout: &ServiceLayout) -> String {
    format!(
        "#!/bin/sh\nexec svlogd -tt {}\n",
        layout.log_dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DefaultsTable, SettingsTree};

    fn layout() -> ServiceLayout {
        ServiceLayout::resolve(&SettingsTree::new(), DefaultsTable::builtin()).unwrap()
    }

    #[test]
    fn test_run_script() {
        let script = run_script(&layout());
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.ends_with(
            "exec chpst -e /opt/gitlab/etc/gitaly -P -U git:git -u git:git \
             /opt/gitlab/embedded/bin/gitaly /var/opt/gitlab/gitaly/config.toml\n"
        ));
    }

    #[test]
    fn test_log_run_script() {
        assert_eq!(
            log_run_script(&layout()),
            "#!/bin/sh\nexec svlogd -tt /var/log/gitlab/gitaly\n"
        );
    }
}
