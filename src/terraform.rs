//! Terraform invocation wrapper
//!
//! Works inside `terraform/<provider>` and streams command output to the
//! operator. `status()` parses `terraform show -json` into a resource
//! address to status-string map.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{KcdError, Result};
use crate::process::{CommandRunner, args};
use crate::provider::ProviderProfile;

pub struct TerraformManager<'a, R: CommandRunner> {
    runner: &'a R,
    tf_dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
struct TfShow {
    #[serde(default)]
    values: TfValues,
}

#[derive(Debug, Deserialize, Default)]
struct TfValues {
    #[serde(default)]
    root_module: TfModule,
}

#[derive(Debug, Deserialize, Default)]
struct TfModule {
    #[serde(default)]
    resources: Vec<TfResource>,
}

#[derive(Debug, Deserialize)]
struct TfResource {
    address: String,
    #[serde(default)]
    values: serde_json::Map<String, serde_json::Value>,
}

impl<'a, R: CommandRunner> TerraformManager<'a, R> {
    pub fn new(runner: &'a R, provider: ProviderProfile) -> Self {
        Self {
            runner,
            tf_dir: PathBuf::from(provider.terraform_dir()),
        }
    }

    fn run_streaming(&self, operation: &str, arguments: &[String]) -> Result<()> {
        let code = self
            .runner
            .run_streaming(Some(&self.tf_dir), "terraform", arguments)?;
        if code != Some(0) {
            return Err(KcdError::TerraformFailed {
                operation: operation.to_string(),
                reason: match code {
                    Some(c) => format!("exit code {}", c),
                    None => "terminated by signal".to_string(),
                },
            });
        }
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.run_streaming("init", &args(&["init"]))
    }

    pub fn plan(&self) -> Result<()> {
        self.run_streaming("plan", &args(&["plan"]))
    }

    pub fn apply(&self) -> Result<()> {
        self.run_streaming("apply", &args(&["apply", "-auto-approve"]))
    }

    pub fn destroy(&self) -> Result<()> {
        self.run_streaming("destroy", &args(&["destroy", "-auto-approve"]))
    }

    /// Map each resource address in the state to its status attribute
    pub fn status(&self) -> Result<BTreeMap<String, String>> {
        let output = self.runner.run(
            "terraform",
            &args(&[
                &format!("-chdir={}", self.tf_dir.display()),
                "show",
                "-json",
            ]),
        )?;
        if !output.success() {
            return Err(KcdError::TerraformFailed {
                operation: "show".to_string(),
                reason: output.failure_reason(),
            });
        }
        parse_state_status(&output.stdout)
    }
}

/// Extract resource statuses from `terraform show -json` output
pub fn parse_state_status(json: &str) -> Result<BTreeMap<String, String>> {
    let show: TfShow = serde_json::from_str(json)?;
    let mut status = BTreeMap::new();
    for resource in show.values.root_module.resources {
        let state = resource
            .values
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        status.insert(resource.address, state);
    }
    Ok(status)
}
