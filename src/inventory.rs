//! Ansible inventory synthesis
//!
//! Discovered instances are classified into control-plane and worker groups
//! by name substring and rendered into the two-section hosts file consumed by
//! the configuration run. Classification is total: names matching neither
//! substring become [`HostRole::Unclassified`] and are reported, never
//! silently dropped.

use crate::discovery::InstanceRecord;
#[cfg(test)]
use crate::error::{KcdError, Result};
use crate::provider::ProviderProfile;
use crate::remote::RemoteCredentials;

/// Role of a node in the cluster, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRole {
    ControlPlane,
    Worker,
    Unclassified,
}

/// Classify an instance name into a role
pub fn classify(name: &str) -> HostRole {
    if name.contains("master") {
        HostRole::ControlPlane
    } else if name.contains("worker") {
        HostRole::Worker
    } else {
        HostRole::Unclassified
    }
}

/// Ordered grouping of instances by role, preserving discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub control_plane: Vec<InstanceRecord>,
    pub workers: Vec<InstanceRecord>,
    pub unclassified: Vec<InstanceRecord>,
}

/// Group records by role; pure and deterministic
pub fn synthesize_inventory(records: &[InstanceRecord]) -> Inventory {
    let mut inventory = Inventory {
        control_plane: Vec::new(),
        workers: Vec::new(),
        unclassified: Vec::new(),
    };
    for record in records {
        match classify(&record.name) {
            HostRole::ControlPlane => inventory.control_plane.push(record.clone()),
            HostRole::Worker => inventory.workers.push(record.clone()),
            HostRole::Unclassified => inventory.unclassified.push(record.clone()),
        }
    }
    inventory
}

fn render_host_line(record: &InstanceRecord, creds: &RemoteCredentials, control_plane: bool) -> String {
    format!(
        "{} ansible_user={} ansible_ssh_private_key_file={} node_name={} control_plane={}",
        record.address,
        creds.remote_user,
        creds.pem_key_path,
        record.name,
        if control_plane { "yes" } else { "no" }
    )
}

/// Render the inventory into the `[master]`/`[worker]` hosts file format
pub fn render_inventory(inventory: &Inventory, creds: &RemoteCredentials) -> String {
    let mut text = String::from("[master]\n");
    for record in &inventory.control_plane {
        text.push_str(&render_host_line(record, creds, true));
        text.push('\n');
    }
    text.push_str("[worker]\n");
    for record in &inventory.workers {
        text.push_str(&render_host_line(record, creds, false));
        text.push('\n');
    }
    text
}

/// Remote path of the rendered inventory inside the ansible tree
pub fn remote_inventory_path(provider: ProviderProfile) -> String {
    format!("ansible/{}", provider.inventory_path())
}

/// Parse a rendered hosts file back into `(name, address, role)` triples
///
/// Inverse of [`render_inventory`] for the sections it emits; only needed to
/// check generated artifacts.
#[cfg(test)]
fn parse_rendered(text: &str) -> Result<Vec<(String, String, HostRole)>> {
    let mut triples = Vec::new();
    let mut role = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "[master]" => role = Some(HostRole::ControlPlane),
            "[worker]" => role = Some(HostRole::Worker),
            _ => {
                let role = role.ok_or_else(|| KcdError::MalformedDiscoveryLine {
                    line: line.to_string(),
                })?;
                let mut fields = line.split_whitespace();
                let address = fields
                    .next()
                    .ok_or_else(|| KcdError::MalformedDiscoveryLine {
                        line: line.to_string(),
                    })?
                    .to_string();
                let name = fields
                    .find_map(|f| f.strip_prefix("node_name="))
                    .ok_or_else(|| KcdError::MalformedDiscoveryLine {
                        line: line.to_string(),
                    })?
                    .to_string();
                triples.push((name, address, role));
            }
        }
    }
    Ok(triples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, address: &str) -> InstanceRecord {
        InstanceRecord {
            name: name.to_string(),
            address: address.to_string(),
        }
    }

    fn creds() -> RemoteCredentials {
        RemoteCredentials {
            pem_key_path: "/home/ec2-user/cluster.pem".to_string(),
            remote_user: "ec2-user".to_string(),
        }
    }

    #[test]
    fn test_classification_by_substring() {
        assert_eq!(classify("k8s-master-1"), HostRole::ControlPlane);
        assert_eq!(classify("k8s-worker-2"), HostRole::Worker);
        assert_eq!(classify("k8s-etcd-1"), HostRole::Unclassified);
    }

    #[test]
    fn test_synthesize_preserves_discovery_order() {
        let records = vec![
            record("k8s-worker-2", "10.0.0.3"),
            record("k8s-master-1", "10.0.0.1"),
            record("k8s-worker-1", "10.0.0.2"),
        ];
        let inventory = synthesize_inventory(&records);
        assert_eq!(inventory.workers[0].name, "k8s-worker-2");
        assert_eq!(inventory.workers[1].name, "k8s-worker-1");
        assert_eq!(inventory.control_plane.len(), 1);
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let records = vec![
            record("k8s-master-1", "10.0.0.1"),
            record("k8s-worker-1", "10.0.0.2"),
        ];
        let first = render_inventory(&synthesize_inventory(&records), &creds());
        let second = render_inventory(&synthesize_inventory(&records), &creds());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unclassified_hosts_are_kept_aside() {
        let records = vec![
            record("k8s-master-1", "10.0.0.1"),
            record("k8s-lb-1", "10.0.0.9"),
        ];
        let inventory = synthesize_inventory(&records);
        assert_eq!(inventory.unclassified.len(), 1);
        assert_eq!(inventory.unclassified[0].name, "k8s-lb-1");
        // but never rendered
        let text = render_inventory(&inventory, &creds());
        assert!(!text.contains("10.0.0.9"));
    }

    #[test]
    fn test_rendered_sections_and_markers() {
        let records = vec![
            record("k8s-master-1", "10.0.0.1"),
            record("k8s-worker-1", "10.0.0.2"),
            record("k8s-worker-2", "10.0.0.3"),
        ];
        let text = render_inventory(&synthesize_inventory(&records), &creds());

        let master_lines: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "[master]")
            .skip(1)
            .take_while(|l| *l != "[worker]")
            .collect();
        assert_eq!(master_lines.len(), 1);
        assert!(master_lines[0].starts_with("10.0.0.1 "));
        assert!(master_lines[0].ends_with("control_plane=yes"));
        assert!(master_lines[0].contains("ansible_user=ec2-user"));
        assert!(
            master_lines[0].contains("ansible_ssh_private_key_file=/home/ec2-user/cluster.pem")
        );

        let worker_lines: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "[worker]")
            .skip(1)
            .collect();
        assert_eq!(worker_lines.len(), 2);
        assert!(worker_lines.iter().all(|l| l.ends_with("control_plane=no")));
    }

    #[test]
    fn test_render_parse_round_trip() {
        let records = vec![
            record("k8s-master-1", "10.0.0.1"),
            record("k8s-worker-1", "10.0.0.2"),
            record("k8s-worker-2", "10.0.0.3"),
        ];
        let text = render_inventory(&synthesize_inventory(&records), &creds());
        let triples = parse_rendered(&text).unwrap();
        assert_eq!(
            triples,
            vec![
                (
                    "k8s-master-1".to_string(),
                    "10.0.0.1".to_string(),
                    HostRole::ControlPlane
                ),
                (
                    "k8s-worker-1".to_string(),
                    "10.0.0.2".to_string(),
                    HostRole::Worker
                ),
                (
                    "k8s-worker-2".to_string(),
                    "10.0.0.3".to_string(),
                    HostRole::Worker
                ),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_host_line_before_section() {
        let err = parse_rendered("10.0.0.1 node_name=x\n").unwrap_err();
        assert!(matches!(err, KcdError::MalformedDiscoveryLine { .. }));
    }

    #[test]
    fn test_remote_inventory_path() {
        assert_eq!(
            remote_inventory_path(ProviderProfile::Aws),
            "ansible/inventories/aws/hosts"
        );
    }
}
