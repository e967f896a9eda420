//! Deploy command: terraform init, plan, apply

use crate::cli::DeployArgs;
use crate::error::Result;
use crate::process::SystemRunner;
use crate::provider::ProviderProfile;
use crate::terraform::TerraformManager;
use crate::ui;

pub fn run(args: DeployArgs, verbose: bool) -> Result<()> {
    let provider: ProviderProfile = args.provider.parse()?;
    ui::heading(&format!("Deploying to {}...", provider));

    let runner = SystemRunner::new(verbose);
    let tf = TerraformManager::new(&runner, provider);

    tf.init()?;
    tf.plan()?;
    tf.apply()?;

    ui::success(&format!("Deployment to {} completed", provider));
    Ok(())
}
