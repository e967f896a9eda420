//! Local ansible-playbook wrapper
//!
//! Used by the `update` command to re-run configuration against an existing
//! inventory from the control machine. The bootstrap flow runs its playbook
//! on the bastion instead (see `operations::bootstrap`).

use std::path::{Path, PathBuf};

use crate::error::{KcdError, Result};
use crate::process::CommandRunner;
use crate::provider::ProviderProfile;

pub struct AnsibleManager<'a, R: CommandRunner> {
    runner: &'a R,
    ansible_dir: PathBuf,
    inventory_file: String,
    provider: ProviderProfile,
}

impl<'a, R: CommandRunner> AnsibleManager<'a, R> {
    pub fn new(runner: &'a R, provider: ProviderProfile) -> Self {
        Self {
            runner,
            ansible_dir: PathBuf::from("ansible"),
            inventory_file: provider.inventory_path(),
            provider,
        }
    }

    fn playbook_args(&self, tags: Option<&str>) -> Vec<String> {
        let mut arguments = vec![
            "-i".to_string(),
            self.inventory_file.clone(),
            "site.yml".to_string(),
        ];

        // Provider-specific vars file, when the playbook tree carries one
        let provider_vars = format!("vars/{}.yml", self.provider.name());
        if self.ansible_dir.join(&provider_vars).is_file() {
            arguments.push("-e".to_string());
            arguments.push(format!("@{}", provider_vars));
        }

        if let Some(tags) = tags {
            arguments.push("-t".to_string());
            arguments.push(tags.to_string());
        }

        arguments
    }

    /// Run `site.yml` against the provider inventory
    pub fn run_playbook(&self, tags: Option<&str>) -> Result<()> {
        let arguments = self.playbook_args(tags);
        let code = self.runner.run_streaming(
            Some(Path::new(&self.ansible_dir)),
            "ansible-playbook",
            &arguments,
        )?;
        if code != Some(0) {
            return Err(KcdError::AnsibleFailed {
                reason: match code {
                    Some(c) => format!("exit code {}", c),
                    None => "terminated by signal".to_string(),
                },
            });
        }
        Ok(())
    }

    /// Syntax-check `site.yml` without executing it
    pub fn validate_playbook(&self) -> Result<()> {
        let arguments = vec![
            "--syntax-check".to_string(),
            "-i".to_string(),
            self.inventory_file.clone(),
            "site.yml".to_string(),
        ];
        let code = self.runner.run_streaming(
            Some(Path::new(&self.ansible_dir)),
            "ansible-playbook",
            &arguments,
        )?;
        if code != Some(0) {
            return Err(KcdError::AnsibleFailed {
                reason: "playbook syntax check failed".to_string(),
            });
        }
        Ok(())
    }
}
