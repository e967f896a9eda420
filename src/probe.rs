//! Combined remote probe of the bastion host
//!
//! Reads `/etc/os-release` and checks the available package manager in a
//! single pass, both over the same SSH session. The SSH login user is
//! classified from the OS text; the package manager is detected on the
//! bastion itself, not on the control machine.

use std::fmt;

use crate::error::Result;
use crate::process::CommandRunner;
use crate::remote::SshSession;

/// Package manager available on the bastion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Unknown,
}

impl PackageManager {
    pub fn command(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Facts gathered from the bastion in one probe
#[derive(Debug, Clone)]
pub struct HostFacts {
    pub os_release: String,
    pub remote_user: String,
    pub package_manager: PackageManager,
}

/// Classify the SSH login user from `/etc/os-release` text
pub fn classify_remote_user(os_release: &str) -> String {
    if os_release.contains("Ubuntu") {
        "ubuntu".to_string()
    } else if ["Amazon", "CentOS", "Red Hat"]
        .iter()
        .any(|d| os_release.contains(d))
    {
        "ec2-user".to_string()
    } else {
        "Unknown".to_string()
    }
}

/// Parse the output of the remote package-manager check
///
/// The probe emits the first manager found in dnf, yum, apt order, or
/// `none` when nothing matched.
pub fn parse_package_manager(output: &str) -> PackageManager {
    match output.trim() {
        "dnf" => PackageManager::Dnf,
        "yum" => PackageManager::Yum,
        "apt" => PackageManager::Apt,
        _ => PackageManager::Unknown,
    }
}

const PACKAGE_MANAGER_PROBE: &str = "if command -v dnf >/dev/null 2>&1; then echo dnf; \
     elif command -v yum >/dev/null 2>&1; then echo yum; \
     elif command -v apt >/dev/null 2>&1; then echo apt; \
     else echo none; fi";

/// Probe the bastion for its OS family and package manager
pub fn probe_host<R: CommandRunner>(session: &SshSession<'_, R>) -> Result<HostFacts> {
    let os_release = session.run("cat /etc/os-release")?;
    let pm_output = session.run(PACKAGE_MANAGER_PROBE)?;

    Ok(HostFacts {
        remote_user: classify_remote_user(&os_release),
        package_manager: parse_package_manager(&pm_output),
        os_release,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;
    use crate::remote::RemoteCredentials;

    #[test]
    fn test_ubuntu_maps_to_ubuntu_user() {
        assert_eq!(
            classify_remote_user("NAME=\"Ubuntu\"\nVERSION=\"Ubuntu 22.04\""),
            "ubuntu"
        );
    }

    #[test]
    fn test_rhel_family_maps_to_ec2_user() {
        assert_eq!(classify_remote_user("NAME=\"Amazon Linux\""), "ec2-user");
        assert_eq!(classify_remote_user("NAME=\"CentOS Stream\""), "ec2-user");
        assert_eq!(
            classify_remote_user("NAME=\"Red Hat Enterprise Linux\""),
            "ec2-user"
        );
    }

    #[test]
    fn test_unrecognized_os_maps_to_unknown() {
        assert_eq!(classify_remote_user("NAME=\"Alpine Linux\""), "Unknown");
    }

    #[test]
    fn test_parse_package_manager() {
        assert_eq!(parse_package_manager("dnf\n"), PackageManager::Dnf);
        assert_eq!(parse_package_manager("yum"), PackageManager::Yum);
        assert_eq!(parse_package_manager("apt\n"), PackageManager::Apt);
        assert_eq!(parse_package_manager("none"), PackageManager::Unknown);
        assert_eq!(parse_package_manager(""), PackageManager::Unknown);
    }

    #[test]
    fn test_probe_runs_both_checks_remotely() {
        let runner = ScriptedRunner::new();
        runner.push_success("NAME=\"Amazon Linux\"\n");
        runner.push_success("dnf\n");

        let creds = RemoteCredentials {
            pem_key_path: "/keys/cluster.pem".to_string(),
            remote_user: "ec2-user".to_string(),
        };
        let session = SshSession::new(&runner, creds, "54.1.2.3");
        let facts = probe_host(&session).unwrap();

        assert_eq!(facts.remote_user, "ec2-user");
        assert_eq!(facts.package_manager, PackageManager::Dnf);

        // both probes went over ssh, none ran locally
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(program, _)| program == "ssh"));
        assert!(calls[1].1.iter().any(|a| a.contains("command -v dnf")));
    }
}
