//! Error types and handling for kcdcli
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//! Variants are grouped by the stage that raises them: discovery, remote
//! execution, bootstrap, and the terraform/ansible/kubectl wrappers.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for kcdcli operations
#[derive(Error, Diagnostic, Debug)]
pub enum KcdError {
    // Discovery errors
    #[error("Unsupported cloud provider: {provider}")]
    #[diagnostic(
        code(kcd::discovery::unsupported_provider),
        help("Supported providers: aws, azure, gcp")
    )]
    UnsupportedProvider { provider: String },

    #[error("Instance discovery query failed: {reason}")]
    #[diagnostic(
        code(kcd::discovery::query_failed),
        help("Check that the provider CLI is installed and credentials are configured")
    )]
    DiscoveryFailed { reason: String },

    #[error("Malformed discovery output line: '{line}'")]
    #[diagnostic(
        code(kcd::discovery::malformed_line),
        help("Expected exactly two whitespace-separated fields: <name> <address>")
    )]
    MalformedDiscoveryLine { line: String },

    #[error("No running instances matched filter '{filter}'")]
    #[diagnostic(
        code(kcd::discovery::no_instances),
        help("Verify the name filter and that the instances are running")
    )]
    NoInstancesFound { filter: String },

    // Remote execution errors
    #[error("Remote command failed on {host}: {reason}")]
    #[diagnostic(code(kcd::remote::command_failed))]
    RemoteCommandFailed { host: String, reason: String },

    #[error("File transfer to {host} failed: {reason}")]
    #[diagnostic(code(kcd::remote::copy_failed))]
    CopyFailed { host: String, reason: String },

    // Bootstrap errors
    #[error("Unsupported package manager on bastion: {found}")]
    #[diagnostic(
        code(kcd::bootstrap::unsupported_package_manager),
        help("The bastion must provide apt, dnf, or yum")
    )]
    UnsupportedPackageManager { found: String },

    #[error("PEM key file not found: {path}")]
    #[diagnostic(
        code(kcd::bootstrap::pem_key_not_found),
        help("Pass the path to the private key used to reach the bastion")
    )]
    PemKeyNotFound { path: String },

    // Execution errors
    #[error("Configuration run failed: {reason}")]
    #[diagnostic(
        code(kcd::execution::playbook_failed),
        help("Inspect the ansible-playbook output on the bastion; re-run bootstrap after fixing")
    )]
    PlaybookFailed { reason: String },

    #[error("Cluster verification failed: {reason}")]
    #[diagnostic(
        code(kcd::execution::verification_failed),
        help("The playbook completed but 'kubectl get nodes' did not succeed")
    )]
    VerificationFailed { reason: String },

    // Terraform errors
    #[error("Terraform {operation} failed: {reason}")]
    #[diagnostic(code(kcd::terraform::command_failed))]
    TerraformFailed { operation: String, reason: String },

    #[error("Failed to parse terraform state: {reason}")]
    #[diagnostic(code(kcd::terraform::state_parse_failed))]
    TerraformStateParseFailed { reason: String },

    // Ansible errors
    #[error("Ansible playbook execution failed: {reason}")]
    #[diagnostic(code(kcd::ansible::playbook_failed))]
    AnsibleFailed { reason: String },

    // Kubernetes errors
    #[error("Kubernetes command failed: {reason}")]
    #[diagnostic(
        code(kcd::kubernetes::command_failed),
        help("Check that the retrieved kubeconfig exists and the cluster is reachable")
    )]
    KubernetesFailed { reason: String },

    // Process errors
    #[error("Failed to spawn '{program}': {reason}")]
    #[diagnostic(
        code(kcd::process::spawn_failed),
        help("Check that the binary is installed and on PATH")
    )]
    SpawnFailed { program: String, reason: String },

    // File system errors
    #[error("Failed to write file: {path}")]
    #[diagnostic(code(kcd::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(kcd::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for KcdError {
    fn from(err: std::io::Error) -> Self {
        KcdError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KcdError {
    fn from(err: serde_json::Error) -> Self {
        KcdError::TerraformStateParseFailed {
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for KcdError {
    fn from(err: inquire::InquireError) -> Self {
        KcdError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, KcdError>;
