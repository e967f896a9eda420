//! Instance discovery via cloud provider CLIs
//!
//! Builds the provider-specific listing query (aws/az/gcloud), runs it
//! through the [`CommandRunner`] collaborator, and parses the two-column
//! `<name> <address>` output into [`InstanceRecord`]s. Malformed lines fail
//! with a named error instead of being skipped.

use crate::error::{KcdError, Result};
use crate::process::CommandRunner;
use crate::provider::{AttributeKind, ProviderProfile};

/// One discovered instance: a name and the requested address attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub name: String,
    pub address: String,
}

/// Build the provider CLI invocation for a discovery query
///
/// Selects running instances whose name matches `name_filter` and projects
/// `(name, attribute)` pairs as plain text, one instance per line.
pub fn discovery_command(
    profile: ProviderProfile,
    name_filter: &str,
    attribute: AttributeKind,
) -> (&'static str, Vec<String>) {
    let projection = attribute.projection(profile);
    match profile {
        ProviderProfile::Aws => (
            "aws",
            vec![
                "ec2".to_string(),
                "describe-instances".to_string(),
                "--filters".to_string(),
                format!("Name=tag:Name,Values={}", name_filter),
                "Name=instance-state-name,Values=running".to_string(),
                "--query".to_string(),
                format!(
                    "Reservations[].Instances[].[Tags[?Key=='Name'].Value | [0], {}]",
                    projection
                ),
                "--output".to_string(),
                "text".to_string(),
            ],
        ),
        ProviderProfile::Azure => (
            "az",
            vec![
                "vm".to_string(),
                "list".to_string(),
                "--show-details".to_string(),
                "--query".to_string(),
                format!(
                    "[?contains(name, '{}') && powerState=='VM running'].[name, {}]",
                    name_filter, projection
                ),
                "--output".to_string(),
                "tsv".to_string(),
            ],
        ),
        ProviderProfile::Gcp => (
            "gcloud",
            vec![
                "compute".to_string(),
                "instances".to_string(),
                "list".to_string(),
                "--filter".to_string(),
                format!("name ~ '{}' AND status=RUNNING", name_filter),
                "--format".to_string(),
                format!("value(name,{})", projection),
            ],
        ),
    }
}

/// Query the provider for running instances matching `name_filter`
///
/// Returns an empty vector when nothing matches; callers that require a host
/// must treat that as a terminable condition.
pub fn fetch_instances<R: CommandRunner>(
    runner: &R,
    profile: ProviderProfile,
    name_filter: &str,
    attribute: AttributeKind,
) -> Result<Vec<InstanceRecord>> {
    let (program, args) = discovery_command(profile, name_filter, attribute);
    let output = runner.run(program, &args)?;

    if !output.success() {
        return Err(KcdError::DiscoveryFailed {
            reason: output.failure_reason(),
        });
    }

    parse_instance_lines(&output.stdout)
}

/// Parse discovery output: one instance per non-empty line, exactly two
/// whitespace-separated fields
pub fn parse_instance_lines(text: &str) -> Result<Vec<InstanceRecord>> {
    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let record = match (fields.next(), fields.next(), fields.next()) {
            (Some(name), Some(address), None) => InstanceRecord {
                name: name.to_string(),
                address: address.to_string(),
            },
            _ => {
                return Err(KcdError::MalformedDiscoveryLine {
                    line: line.to_string(),
                });
            }
        };
        records.push(record);
    }
    Ok(records)
}

/// Fetch instances and require at least one match
pub fn fetch_instances_required<R: CommandRunner>(
    runner: &R,
    profile: ProviderProfile,
    name_filter: &str,
    attribute: AttributeKind,
) -> Result<Vec<InstanceRecord>> {
    let records = fetch_instances(runner, profile, name_filter, attribute)?;
    if records.is_empty() {
        return Err(KcdError::NoInstancesFound {
            filter: name_filter.to_string(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    #[test]
    fn test_parse_yields_one_record_per_nonempty_line() {
        let text = "k8s-master-1 10.0.0.1\n\nk8s-worker-1 10.0.0.2\nk8s-worker-2 10.0.0.3\n";
        let records = parse_instance_lines(text).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            InstanceRecord {
                name: "k8s-master-1".to_string(),
                address: "10.0.0.1".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_single_field_line() {
        let err = parse_instance_lines("k8s-master-1 10.0.0.1\nlonely-field\n").unwrap_err();
        match err {
            KcdError::MalformedDiscoveryLine { line } => assert_eq!(line, "lonely-field"),
            other => panic!("expected MalformedDiscoveryLine, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_three_field_line() {
        let err = parse_instance_lines("name 10.0.0.1 extra\n").unwrap_err();
        assert!(matches!(err, KcdError::MalformedDiscoveryLine { .. }));
    }

    #[test]
    fn test_parse_empty_output_is_empty_not_error() {
        assert!(parse_instance_lines("").unwrap().is_empty());
        assert!(parse_instance_lines("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_aws_command_shape() {
        let (program, args) =
            discovery_command(ProviderProfile::Aws, "k8s-node", AttributeKind::PrivateIp);
        assert_eq!(program, "aws");
        assert!(args.contains(&"Name=tag:Name,Values=k8s-node".to_string()));
        assert!(args.iter().any(|a| a.contains("PrivateIpAddress")));
        assert!(args.contains(&"Name=instance-state-name,Values=running".to_string()));
    }

    #[test]
    fn test_azure_command_shape() {
        let (program, args) =
            discovery_command(ProviderProfile::Azure, "bastion", AttributeKind::PublicIp);
        assert_eq!(program, "az");
        assert!(args.iter().any(|a| a.contains("VM running")));
        assert!(args.iter().any(|a| a.contains("publicIps")));
    }

    #[test]
    fn test_gcp_command_shape() {
        let (program, args) =
            discovery_command(ProviderProfile::Gcp, "bastion", AttributeKind::PublicIp);
        assert_eq!(program, "gcloud");
        assert!(args.iter().any(|a| a.contains("status=RUNNING")));
    }

    #[test]
    fn test_fetch_instances_query_failure() {
        let runner = ScriptedRunner::new();
        runner.push_failure(255, "Unable to locate credentials");
        let err = fetch_instances(
            &runner,
            ProviderProfile::Aws,
            "k8s-node",
            AttributeKind::PrivateIp,
        )
        .unwrap_err();
        match err {
            KcdError::DiscoveryFailed { reason } => {
                assert!(reason.contains("Unable to locate credentials"));
            }
            other => panic!("expected DiscoveryFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_instances_required_empty_result() {
        let runner = ScriptedRunner::new();
        runner.push_success("");
        let err = fetch_instances_required(
            &runner,
            ProviderProfile::Aws,
            "bastion",
            AttributeKind::PublicIp,
        )
        .unwrap_err();
        assert!(matches!(err, KcdError::NoInstancesFound { .. }));
    }

    #[test]
    fn test_fetch_instances_parses_runner_output() {
        let runner = ScriptedRunner::new();
        runner.push_success("bastion-1 54.1.2.3\n");
        let records = fetch_instances(
            &runner,
            ProviderProfile::Aws,
            "bastion",
            AttributeKind::PublicIp,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, "54.1.2.3");
        assert_eq!(runner.call_count(), 1);
    }
}
