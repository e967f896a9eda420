//! Bootstrap command CLI wrapper
//!
//! Builds the run configuration from the positional arguments and delegates
//! to `operations::bootstrap` for the staged flow.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::BootstrapArgs;
use crate::config::{BootstrapConfig, kubeconfig_destination};
use crate::error::Result;
use crate::operations;
use crate::process::SystemRunner;
use crate::provider::ProviderProfile;
use crate::ui;

pub fn run(args: BootstrapArgs, verbose: bool) -> Result<()> {
    // Provider and key path are validated before any external call
    let provider: ProviderProfile = args.cloud_provider.parse()?;

    let config = BootstrapConfig {
        provider,
        node_filter: args.k8s_filter,
        bastion_filter: args.bastion_filter,
        pem_key_path: PathBuf::from(args.pem_key_location),
        remote_dst: args.dst_location,
        connect_timeout: Duration::from_secs(args.connect_timeout),
        kubeconfig_dst: kubeconfig_destination(provider),
    };

    let runner = SystemRunner::new(verbose);
    let report = operations::bootstrap::run(&runner, &config)?;

    ui::success(&format!(
        "Cluster bootstrapped through {} ({} nodes); kubeconfig at {}",
        report.bastion_address, report.node_count, report.kubeconfig_path
    ));
    Ok(())
}
