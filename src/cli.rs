//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

/// kcdcli - Kubernetes cluster deployment CLI
///
/// Provision and inspect Kubernetes clusters across AWS, Azure, and GCP.
#[derive(Parser, Debug)]
#[command(
    name = "kcdcli",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "CLI for managing Kubernetes cluster deployments across cloud providers",
    long_about = "kcdcli wraps terraform, ansible, and kubectl to provision infrastructure, \
                  bootstrap a Kubernetes cluster through a bastion host, and inspect the result \
                  on AWS, Azure, or GCP.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  kcdcli deploy --provider aws\n    \
                  kcdcli bootstrap k8s-node k8s-bastion ./cluster.pem /home/ec2-user\n    \
                  kcdcli status --provider aws\n    \
                  kcdcli destroy --provider aws --auto-approve"
)]
pub struct Cli {
    /// Echo external command invocations as they run
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision infrastructure with terraform (init, plan, apply)
    Deploy(DeployArgs),

    /// Destroy provisioned infrastructure
    Destroy(DestroyArgs),

    /// Show infrastructure and cluster status
    Status(StatusArgs),

    /// Re-plan infrastructure and re-run configuration
    Update(UpdateArgs),

    /// Bootstrap a Kubernetes cluster through the bastion host
    Bootstrap(BootstrapArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the deploy command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Deploy to AWS:\n    kcdcli deploy --provider aws\n\n\
                  Deploy to GCP:\n    kcdcli deploy --provider gcp")]
pub struct DeployArgs {
    /// Cloud provider (aws, azure, gcp)
    #[arg(long, short = 'p')]
    pub provider: String,
}

/// Arguments for the destroy command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Destroy with confirmation:\n    kcdcli destroy --provider aws\n\n\
                  Destroy without prompting:\n    kcdcli destroy --provider aws --auto-approve")]
pub struct DestroyArgs {
    /// Cloud provider (aws, azure, gcp)
    #[arg(long, short = 'p')]
    pub provider: String,

    /// Skip interactive approval
    #[arg(long)]
    pub auto_approve: bool,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show AWS infrastructure and cluster status:\n    kcdcli status --provider aws")]
pub struct StatusArgs {
    /// Cloud provider (aws, azure, gcp)
    #[arg(long, short = 'p')]
    pub provider: String,
}

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Update the AWS cluster:\n    kcdcli update --provider aws\n\n\
                  Update without prompting:\n    kcdcli update --provider aws --yes\n\n\
                  Run only tagged tasks:\n    kcdcli update --provider aws --tags kubelet")]
pub struct UpdateArgs {
    /// Cloud provider (aws, azure, gcp)
    #[arg(long, short = 'p')]
    pub provider: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Run only tasks with these ansible tags
    #[arg(long)]
    pub tags: Option<String>,
}

/// Arguments for the bootstrap command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Bootstrap on AWS (default provider):\n    \
                  kcdcli bootstrap k8s-node k8s-bastion ./cluster.pem /home/ec2-user\n\n\
                  Bootstrap on GCP:\n    \
                  kcdcli bootstrap k8s-node k8s-bastion ./cluster.pem /home/ubuntu gcp\n\n\
                  Longer SSH connect timeout:\n    \
                  kcdcli bootstrap k8s-node k8s-bastion ./cluster.pem /home/ec2-user --connect-timeout 60")]
pub struct BootstrapArgs {
    /// Name filter matching the Kubernetes node instances
    pub k8s_filter: String,

    /// Name filter matching the bastion instance
    pub bastion_filter: String,

    /// Path to the PEM private key for SSH
    pub pem_key_location: String,

    /// Remote directory on the bastion for the key and playbooks
    pub dst_location: String,

    /// Cloud provider (aws, azure, gcp)
    #[arg(default_value = "aws")]
    pub cloud_provider: String,

    /// SSH connect timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub connect_timeout: u64,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    kcdcli completions --shell bash > ~/.bash_completion.d/kcdcli\n\n\
                  Generate zsh completions:\n    kcdcli completions --shell zsh > ~/.zfunc/_kcdcli")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
