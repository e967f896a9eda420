//! Cluster bootstrap orchestration
//!
//! Four sequential stages, each consuming the previous stage's output:
//!
//! 1. discover the bastion's public IP,
//! 2. probe the bastion for its OS family and package manager,
//! 3. provision the bastion (hostname, ansible install, key and playbook
//!    transfer),
//! 4. synthesize the node inventory, run the playbook on the bastion,
//!    retrieve the kubeconfig, and verify the cluster.
//!
//! Every failure aborts the run. There is no automatic teardown; the failure
//! report names the last completed stage so the operator knows what
//! `kcdcli destroy` has to clean up.

use std::fmt;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;

use tempfile::NamedTempFile;

use crate::config::BootstrapConfig;
use crate::discovery::{InstanceRecord, fetch_instances_required};
use crate::error::{KcdError, Result};
use crate::inventory::{remote_inventory_path, render_inventory, synthesize_inventory};
use crate::probe::{HostFacts, PackageManager, probe_host};
use crate::process::CommandRunner;
use crate::provider::AttributeKind;
use crate::remote::{RemoteCredentials, SshSession};
use crate::ui;

/// Login user used for the initial probe, before the OS is known
const PROBE_USER: &str = "ec2-user";

/// Hostname assigned to the bastion during provisioning
const BASTION_HOSTNAME: &str = "bastion-node";

/// Where the playbook leaves the generated cluster credentials on the bastion
const REMOTE_ADMIN_CONF: &str = "/tmp/admin.conf";

/// Bootstrap stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BastionDiscovery,
    HostProbe,
    BastionProvisioning,
    ClusterBootstrap,
    Verification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::BastionDiscovery => "bastion discovery",
            Stage::HostProbe => "host probe",
            Stage::BastionProvisioning => "bastion provisioning",
            Stage::ClusterBootstrap => "cluster bootstrap",
            Stage::Verification => "cluster verification",
        };
        f.write_str(name)
    }
}

/// Result of a completed bootstrap run
#[derive(Debug)]
pub struct BootstrapReport {
    pub bastion_address: String,
    pub node_count: usize,
    pub kubeconfig_path: String,
}

/// Build the remote script that provisions ansible onto the bastion
///
/// The package manager is validated before anything mutates remote state, so
/// an unsupported manager never leaves a renamed host behind.
pub fn provisioning_script(package_manager: PackageManager) -> Result<String> {
    let install = match package_manager {
        PackageManager::Apt => "sudo apt update -y\n\
             sudo apt install -y software-properties-common\n\
             sudo apt-add-repository --yes --update ppa:ansible/ansible\n\
             sudo apt install -y ansible"
            .to_string(),
        PackageManager::Dnf | PackageManager::Yum => {
            let pm = package_manager.command();
            format!(
                "sudo {pm} update -y\n\
                 sudo {pm} install -y epel-release ansible"
            )
        }
        PackageManager::Unknown => {
            return Err(KcdError::UnsupportedPackageManager {
                found: package_manager.command().to_string(),
            });
        }
    };

    Ok(format!(
        "sudo hostnamectl set-hostname \"{BASTION_HOSTNAME}\"\n{install}"
    ))
}

/// Build the remote script that runs the playbook and stages the kubeconfig
pub fn execution_script(inventory_path: &str, remote_user: &str) -> String {
    format!(
        "cd ansible/\n\
         ansible-playbook -i {inventory_path} site.yml\n\
         cd ~/\n\
         sudo mkdir -p /home/{remote_user}/.kube\n\
         sudo cp {REMOTE_ADMIN_CONF} /home/{remote_user}/.kube/config\n\
         sudo chown -R {remote_user}:{remote_user} /home/{remote_user}/.kube\n\
         sudo chmod 600 /home/{remote_user}/.kube/config\n\
         echo \"export KUBECONFIG=/home/{remote_user}/.kube/config\" >> /home/{remote_user}/.bashrc"
    )
}

/// Path of the copied PEM key on the bastion, as referenced by inventory lines
fn remote_key_path(remote_dst: &str, key_name: &str) -> String {
    format!("{}/{}", remote_dst.trim_end_matches('/'), key_name)
}

fn discover_bastion<R: CommandRunner>(
    runner: &R,
    config: &BootstrapConfig,
) -> Result<InstanceRecord> {
    let mut records = fetch_instances_required(
        runner,
        config.provider,
        &config.bastion_filter,
        AttributeKind::PublicIp,
    )?;
    Ok(records.remove(0))
}

fn probe_credentials(config: &BootstrapConfig, facts: &HostFacts) -> RemoteCredentials {
    let remote_user = if facts.remote_user == "Unknown" {
        ui::warn(&format!(
            "unrecognized OS on bastion, continuing as '{}'",
            PROBE_USER
        ));
        PROBE_USER.to_string()
    } else {
        facts.remote_user.clone()
    };
    RemoteCredentials {
        pem_key_path: config.pem_key_path.display().to_string(),
        remote_user,
    }
}

fn secure_local_kubeconfig(config: &BootstrapConfig) -> Result<()> {
    let path = &config.kubeconfig_dst;
    let mut perms = fs::metadata(path)
        .map_err(|e| KcdError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms).map_err(|e| KcdError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Run the full bootstrap flow
pub fn run<R: CommandRunner>(runner: &R, config: &BootstrapConfig) -> Result<BootstrapReport> {
    config.validate()?;

    let mut completed: Option<Stage> = None;
    let result = run_stages(runner, config, &mut completed);
    if let Err(ref err) = result {
        report_failure(completed, err);
    }
    result
}

fn report_failure(completed: Option<Stage>, err: &KcdError) {
    let failed_after = match completed {
        Some(stage) => format!("completed through {}", stage),
        None => "no stage completed".to_string(),
    };
    eprintln!(
        "Bootstrap aborted ({}): {}. Partially-applied infrastructure is left in place; \
         run 'kcdcli destroy' to tear it down.",
        failed_after, err
    );
}

fn run_stages<R: CommandRunner>(
    runner: &R,
    config: &BootstrapConfig,
    completed: &mut Option<Stage>,
) -> Result<BootstrapReport> {
    // Stage 1: find the bastion
    ui::heading("Fetching bastion instance public IP...");
    let bastion = discover_bastion(runner, config)?;
    ui::success(&format!("Bastion public IP: {}", bastion.address));
    *completed = Some(Stage::BastionDiscovery);

    // Stage 2: probe OS and package manager over one SSH session
    ui::heading("Probing bastion OS and package manager...");
    let probe_creds = RemoteCredentials {
        pem_key_path: config.pem_key_path.display().to_string(),
        remote_user: PROBE_USER.to_string(),
    };
    let probe_session = SshSession::new(runner, probe_creds, &bastion.address)
        .with_connect_timeout(config.connect_timeout);
    let facts = probe_host(&probe_session)?;
    if let Some(os_line) = facts.os_release.lines().next() {
        ui::success(&format!("Detected OS: {}", os_line.trim()));
    }
    ui::success(&format!(
        "SSH user: {}, package manager: {}",
        facts.remote_user, facts.package_manager
    ));
    *completed = Some(Stage::HostProbe);

    let creds = probe_credentials(config, &facts);
    let session = SshSession::new(runner, creds.clone(), &bastion.address)
        .with_connect_timeout(config.connect_timeout);

    // Stage 3: provision the bastion; package manager is validated first so
    // the hostname never changes for an install that cannot succeed
    ui::heading("Installing ansible on bastion...");
    let script = provisioning_script(facts.package_manager)?;
    let pb = ui::spinner("installing ansible");
    let install_result = session.run(&script);
    pb.finish_and_clear();
    install_result?;

    session.copy(&config.pem_key_path, &config.remote_dst, false)?;
    session.copy(std::path::Path::new("ansible"), &config.remote_dst, true)?;
    ui::success("Bastion provisioned");
    *completed = Some(Stage::BastionProvisioning);

    // Stage 4: inventory synthesis and cluster bootstrap
    ui::heading("Generating inventory from node instances...");
    let nodes = fetch_instances_required(
        runner,
        config.provider,
        &config.node_filter,
        AttributeKind::PrivateIp,
    )?;
    let inventory = synthesize_inventory(&nodes);
    for record in &inventory.unclassified {
        ui::warn(&format!(
            "instance '{}' matches neither master nor worker, excluded from inventory",
            record.name
        ));
    }

    // Inventory lines reference the key where the transfer above put it
    let remote_key_creds = RemoteCredentials {
        pem_key_path: remote_key_path(&config.remote_dst, &config.pem_key_name()),
        remote_user: creds.remote_user.clone(),
    };
    let rendered = render_inventory(&inventory, &remote_key_creds);

    let mut hosts_file = NamedTempFile::new()?;
    hosts_file.write_all(rendered.as_bytes())?;
    hosts_file.flush()?;
    let inventory_path = remote_inventory_path(config.provider);
    session.copy(hosts_file.path(), &inventory_path, false)?;

    ui::heading("Running ansible playbook on bastion...");
    let script = execution_script(&config.provider.inventory_path(), &creds.remote_user);
    let pb = ui::spinner("running playbook");
    let playbook_result = session.run(&script);
    pb.finish_and_clear();
    playbook_result.map_err(|e| KcdError::PlaybookFailed {
        reason: e.to_string(),
    })?;
    *completed = Some(Stage::ClusterBootstrap);

    // Retrieve the credentials file and lock down its permissions
    if let Some(parent) = config.kubeconfig_dst.parent() {
        fs::create_dir_all(parent)?;
    }
    session.fetch(REMOTE_ADMIN_CONF, &config.kubeconfig_dst)?;
    secure_local_kubeconfig(config)?;
    ui::success(&format!(
        "Kubeconfig retrieved to {}",
        config.kubeconfig_dst.display()
    ));

    // Single post-condition check: the cluster answers a node listing
    session
        .run("kubectl get nodes")
        .map_err(|e| KcdError::VerificationFailed {
            reason: e.to_string(),
        })?;
    *completed = Some(Stage::Verification);
    ui::success("Cluster is reachable");

    Ok(BootstrapReport {
        bastion_address: bastion.address,
        node_count: inventory.control_plane.len() + inventory.workers.len(),
        kubeconfig_path: config.kubeconfig_dst.display().to_string(),
    })
}
