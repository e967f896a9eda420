//! Remote shell and file transfer over ssh/scp
//!
//! All bastion interaction goes through [`SshSession`]: command execution,
//! uploads, and downloads. Transient connection refusal gets one retry via
//! the configured [`RetryPolicy`]; command-level failures surface
//! immediately.

use std::path::Path;
use std::time::Duration;

use crate::error::{KcdError, Result};
use crate::process::CommandRunner;
use crate::retry::{RetryPolicy, transient_connection};

/// Credentials for reaching the bastion; never persisted
#[derive(Debug, Clone)]
pub struct RemoteCredentials {
    pub pem_key_path: String,
    pub remote_user: String,
}

/// One SSH target plus the options shared by every operation against it
pub struct SshSession<'a, R: CommandRunner> {
    runner: &'a R,
    creds: RemoteCredentials,
    host: String,
    connect_timeout: Duration,
    retry: RetryPolicy,
}

impl<'a, R: CommandRunner> SshSession<'a, R> {
    pub fn new(runner: &'a R, creds: RemoteCredentials, host: &str) -> Self {
        Self {
            runner,
            creds,
            host: host.to_string(),
            connect_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn common_options(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.creds.pem_key_path.clone(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
        ]
    }

    fn target(&self) -> String {
        format!("{}@{}", self.creds.remote_user, self.host)
    }

    /// Execute a command on the remote host, returning its stdout
    pub fn run(&self, command: &str) -> Result<String> {
        self.retry.run(transient_connection, || {
            let mut args = self.common_options();
            args.push(self.target());
            args.push(command.to_string());

            let output = self.runner.run("ssh", &args)?;
            if !output.success() {
                return Err(KcdError::RemoteCommandFailed {
                    host: self.host.clone(),
                    reason: output.failure_reason(),
                });
            }
            Ok(output.stdout)
        })
    }

    /// Copy a local file or directory to the remote host
    pub fn copy(&self, local: &Path, remote: &str, recursive: bool) -> Result<()> {
        self.retry.run(transient_connection, || {
            let mut args = self.common_options();
            if recursive {
                args.push("-r".to_string());
            }
            args.push(local.display().to_string());
            args.push(format!("{}:{}", self.target(), remote));

            let output = self.runner.run("scp", &args)?;
            if !output.success() {
                return Err(KcdError::CopyFailed {
                    host: self.host.clone(),
                    reason: output.failure_reason(),
                });
            }
            Ok(())
        })
    }

    /// Fetch a remote file to a local path
    pub fn fetch(&self, remote: &str, local: &Path) -> Result<()> {
        self.retry.run(transient_connection, || {
            let mut args = self.common_options();
            args.push(format!("{}:{}", self.target(), remote));
            args.push(local.display().to_string());

            let output = self.runner.run("scp", &args)?;
            if !output.success() {
                return Err(KcdError::CopyFailed {
                    host: self.host.clone(),
                    reason: output.failure_reason(),
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;
    use std::path::PathBuf;

    fn creds() -> RemoteCredentials {
        RemoteCredentials {
            pem_key_path: "/keys/cluster.pem".to_string(),
            remote_user: "ec2-user".to_string(),
        }
    }

    #[test]
    fn test_run_builds_ssh_invocation() {
        let runner = ScriptedRunner::new();
        runner.push_success("ok\n");

        let session = SshSession::new(&runner, creds(), "54.1.2.3");
        let stdout = session.run("cat /etc/os-release").unwrap();
        assert_eq!(stdout, "ok\n");

        let calls = runner.calls.borrow();
        let (program, args) = &calls[0];
        assert_eq!(program, "ssh");
        assert!(args.contains(&"-i".to_string()));
        assert!(args.contains(&"/keys/cluster.pem".to_string()));
        assert!(args.contains(&"StrictHostKeyChecking=no".to_string()));
        assert!(args.contains(&"ConnectTimeout=30".to_string()));
        assert!(args.contains(&"ec2-user@54.1.2.3".to_string()));
        assert!(args.contains(&"cat /etc/os-release".to_string()));
    }

    #[test]
    fn test_run_failure_surfaces_stderr() {
        let runner = ScriptedRunner::new();
        runner.push_failure(1, "Permission denied (publickey)");

        let session = SshSession::new(&runner, creds(), "54.1.2.3").with_retry(RetryPolicy::none());
        let err = session.run("hostname").unwrap_err();
        match err {
            KcdError::RemoteCommandFailed { host, reason } => {
                assert_eq!(host, "54.1.2.3");
                assert!(reason.contains("Permission denied"));
            }
            other => panic!("expected RemoteCommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_run_retries_connection_refused_once() {
        let runner = ScriptedRunner::new();
        runner.push_failure(255, "Connection refused");
        runner.push_success("hello\n");

        let retry = RetryPolicy {
            max_attempts: 2,
            backoff: Duration::ZERO,
        };
        let session = SshSession::new(&runner, creds(), "54.1.2.3").with_retry(retry);
        assert_eq!(session.run("echo hello").unwrap(), "hello\n");
        assert_eq!(runner.call_count(), 2);
    }

    #[test]
    fn test_copy_recursive_uses_dash_r() {
        let runner = ScriptedRunner::new();
        runner.push_success("");

        let session = SshSession::new(&runner, creds(), "54.1.2.3");
        session
            .copy(&PathBuf::from("ansible"), "/home/ec2-user", true)
            .unwrap();

        let calls = runner.calls.borrow();
        let (program, args) = &calls[0];
        assert_eq!(program, "scp");
        assert!(args.contains(&"-r".to_string()));
        assert!(args.contains(&"ec2-user@54.1.2.3:/home/ec2-user".to_string()));
    }

    #[test]
    fn test_fetch_reverses_endpoints() {
        let runner = ScriptedRunner::new();
        runner.push_success("");

        let session = SshSession::new(&runner, creds(), "54.1.2.3");
        session
            .fetch("/tmp/admin.conf", &PathBuf::from("/tmp/local.conf"))
            .unwrap();

        let calls = runner.calls.borrow();
        let (_, args) = &calls[0];
        assert!(args.contains(&"ec2-user@54.1.2.3:/tmp/admin.conf".to_string()));
        assert!(args.contains(&"/tmp/local.conf".to_string()));
    }

    #[test]
    fn test_custom_connect_timeout() {
        let runner = ScriptedRunner::new();
        runner.push_success("");

        let session = SshSession::new(&runner, creds(), "54.1.2.3")
            .with_connect_timeout(Duration::from_secs(10));
        session.run("true").unwrap();

        let calls = runner.calls.borrow();
        let (_, args) = &calls[0];
        assert!(args.contains(&"ConnectTimeout=10".to_string()));
    }
}
