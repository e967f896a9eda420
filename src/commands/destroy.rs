//! Destroy command: terraform destroy with confirmation

use inquire::Confirm;

use crate::cli::DestroyArgs;
use crate::error::Result;
use crate::process::SystemRunner;
use crate::provider::ProviderProfile;
use crate::terraform::TerraformManager;
use crate::ui;

pub fn run(args: DestroyArgs, verbose: bool) -> Result<()> {
    let provider: ProviderProfile = args.provider.parse()?;

    if !args.auto_approve {
        let confirmed = Confirm::new(&format!(
            "Are you sure you want to destroy the {} infrastructure?",
            provider
        ))
        .with_default(false)
        .prompt()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    ui::heading(&format!("Destroying infrastructure on {}...", provider));
    let runner = SystemRunner::new(verbose);
    TerraformManager::new(&runner, provider).destroy()?;

    ui::success(&format!("Infrastructure on {} destroyed", provider));
    Ok(())
}
