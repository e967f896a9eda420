//! Update command: re-plan infrastructure, then re-run configuration

use inquire::Confirm;

use crate::ansible::AnsibleManager;
use crate::cli::UpdateArgs;
use crate::error::Result;
use crate::process::SystemRunner;
use crate::provider::ProviderProfile;
use crate::terraform::TerraformManager;
use crate::ui;

pub fn run(args: UpdateArgs, verbose: bool) -> Result<()> {
    let provider: ProviderProfile = args.provider.parse()?;
    let runner = SystemRunner::new(verbose);
    let tf = TerraformManager::new(&runner, provider);

    tf.plan()?;

    if !args.yes {
        let confirmed = Confirm::new("Do you want to apply the changes?")
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    tf.apply()?;
    ui::success("Infrastructure updated");

    let ansible = AnsibleManager::new(&runner, provider);
    ansible.validate_playbook()?;
    ansible.run_playbook(args.tags.as_deref())?;
    ui::success("Configuration updated");

    ui::success("Cluster update completed");
    Ok(())
}
