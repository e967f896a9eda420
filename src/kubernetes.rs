//! kubectl wrapper for cluster status
//!
//! Queries the cluster through the retrieved per-provider kubeconfig and
//! parses `-o json` output into name/status pairs.

use serde::Deserialize;

use crate::config::kubeconfig_destination;
use crate::error::{KcdError, Result};
use crate::process::{CommandRunner, args};
use crate::provider::ProviderProfile;

/// Name and status of one cluster object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStatus {
    pub name: String,
    pub status: String,
}

pub struct KubernetesManager<'a, R: CommandRunner> {
    runner: &'a R,
    kubeconfig: String,
}

#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Object>,
}

#[derive(Debug, Deserialize)]
struct Object {
    metadata: Metadata,
    #[serde(default)]
    status: ObjectStatus,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
}

#[derive(Debug, Deserialize, Default)]
struct ObjectStatus {
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    phase: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

impl<'a, R: CommandRunner> KubernetesManager<'a, R> {
    pub fn new(runner: &'a R, provider: ProviderProfile) -> Self {
        Self {
            runner,
            kubeconfig: kubeconfig_destination(provider).display().to_string(),
        }
    }

    fn kubectl(&self, arguments: &[&str]) -> Result<String> {
        let mut full = vec!["--kubeconfig".to_string(), self.kubeconfig.clone()];
        full.extend(args(arguments));
        let output = self.runner.run("kubectl", &full)?;
        if !output.success() {
            return Err(KcdError::KubernetesFailed {
                reason: output.failure_reason(),
            });
        }
        Ok(output.stdout)
    }

    /// Whether the cluster responds to `cluster-info`
    pub fn is_available(&self) -> bool {
        self.kubectl(&["cluster-info"]).is_ok()
    }

    /// Ready state of every node
    pub fn nodes(&self) -> Result<Vec<ResourceStatus>> {
        let output = self.kubectl(&["get", "nodes", "-o", "json"])?;
        parse_node_statuses(&output)
    }

    /// Phase of every kube-system pod
    pub fn system_pods(&self) -> Result<Vec<ResourceStatus>> {
        let output = self.kubectl(&["get", "pods", "-n", "kube-system", "-o", "json"])?;
        parse_pod_statuses(&output)
    }
}

/// Parse `kubectl get nodes -o json` into Ready/NotReady per node
pub fn parse_node_statuses(json: &str) -> Result<Vec<ResourceStatus>> {
    let list: ObjectList = serde_json::from_str(json).map_err(|e| KcdError::KubernetesFailed {
        reason: format!("invalid node list: {}", e),
    })?;
    Ok(list
        .items
        .into_iter()
        .map(|node| {
            let ready = node
                .status
                .conditions
                .iter()
                .find(|c| c.kind == "Ready")
                .map(|c| c.status == "True")
                .unwrap_or(false);
            ResourceStatus {
                name: node.metadata.name,
                status: if ready { "Ready" } else { "NotReady" }.to_string(),
            }
        })
        .collect())
}

/// Parse `kubectl get pods -o json` into pod phases
pub fn parse_pod_statuses(json: &str) -> Result<Vec<ResourceStatus>> {
    let list: ObjectList = serde_json::from_str(json).map_err(|e| KcdError::KubernetesFailed {
        reason: format!("invalid pod list: {}", e),
    })?;
    Ok(list
        .items
        .into_iter()
        .map(|pod| ResourceStatus {
            status: pod.status.phase.unwrap_or_else(|| "Unknown".to_string()),
            name: pod.metadata.name,
        })
        .collect())
}
