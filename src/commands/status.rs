//! Status command: terraform state plus cluster node and pod health

use console::Style;

use crate::cli::StatusArgs;
use crate::error::Result;
use crate::kubernetes::KubernetesManager;
use crate::process::SystemRunner;
use crate::provider::ProviderProfile;
use crate::terraform::TerraformManager;
use crate::ui;

pub fn run(args: StatusArgs, verbose: bool) -> Result<()> {
    let provider: ProviderProfile = args.provider.parse()?;
    let runner = SystemRunner::new(verbose);

    ui::heading(&format!("Infrastructure status ({})", provider));
    let status = TerraformManager::new(&runner, provider).status()?;
    if status.is_empty() {
        println!("  {}", Style::new().dim().apply_to("no resources in state"));
    }
    for (address, state) in &status {
        println!("  {:<50} {}", address, style_state(state));
    }

    let k8s = KubernetesManager::new(&runner, provider);
    if !k8s.is_available() {
        ui::warn("cluster is not reachable; skipping node and pod status");
        return Ok(());
    }

    ui::heading("Nodes");
    for node in k8s.nodes()? {
        println!("  {:<50} {}", node.name, style_state(&node.status));
    }

    ui::heading("System pods");
    for pod in k8s.system_pods()? {
        println!("  {:<50} {}", pod.name, style_state(&pod.status));
    }

    Ok(())
}

fn style_state(state: &str) -> String {
    let style = match state {
        "Ready" | "Running" | "running" | "Healthy" => Style::new().green(),
        "unknown" | "Unknown" => Style::new().dim(),
        _ => Style::new().red(),
    };
    style.apply_to(state).to_string()
}
