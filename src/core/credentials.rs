//! Transport credential resolution via an external credential helper.
//!
//! Network operations that need authentication go through the user's existing
//! system-level credential configuration by spawning `git credential fill`
//! with the standard line-oriented protocol: the engine writes `protocol=`,
//! `host=` and `path=` fields plus a blank line, and parses `key=value` lines
//! from the helper's output.
//!
//! Resolution never fails: any problem (spawn failure, unparseable URL,
//! timeout, missing fields) degrades to anonymous default credentials so the
//! subsequent network call fails with a clear transport error instead of the
//! resolver crashing. Secret values are never logged and live only for the
//! single resolution.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;
use url::Url;
use wait_timeout::ChildExt;

/// How long to wait for the credential helper before giving up.
const HELPER_TIMEOUT: Duration = Duration::from_secs(10);

/// Short-lived transport credentials for one network operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Anonymous/default credentials, used whenever resolution fails.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

/// Resolves credentials by delegating to an external helper process.
///
/// The helper program is configurable so tests can substitute a missing or
/// scripted binary; production use keeps the default `git credential fill`.
pub struct CredentialResolver {
    helper: String,
    helper_args: Vec<String>,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self {
            helper: "git".to_string(),
            helper_args: vec!["credential".to_string(), "fill".to_string()],
        }
    }
}

impl CredentialResolver {
    /// Create a resolver using a custom helper command.
    pub fn with_helper(helper: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            helper: helper.into(),
            helper_args: args,
        }
    }

    /// Resolve credentials for `remote_url`, degrading to anonymous on any
    /// failure.
    pub fn resolve(&self, remote_url: &str) -> Credentials {
        match self.try_resolve(remote_url) {
            Some(credentials) => credentials,
            None => {
                log::warn!("Credential resolution failed for remote, using anonymous credentials");
                Credentials::anonymous()
            }
        }
    }

    fn try_resolve(&self, remote_url: &str) -> Option<Credentials> {
        let url = Url::parse(remote_url).ok()?;
        let host = url.host_str()?;

        let mut child = Command::new(&self.helper)
            .args(&self.helper_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;

        {
            let stdin = child.stdin.as_mut()?;
            let request = format!(
                "protocol={}\nhost={}\npath={}\n\n",
                url.scheme(),
                host,
                url.path().trim_start_matches('/')
            );
            stdin.write_all(request.as_bytes()).ok()?;
        }
        // Close stdin so the helper sees EOF after the blank line
        drop(child.stdin.take());

        match child.wait_timeout(HELPER_TIMEOUT).ok()? {
            Some(status) if status.success() => {}
            Some(_) => return None,
            None => {
                // Helper hung past the timeout; reap it and give up
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }

        let mut output = String::new();
        use std::io::Read;
        child.stdout.take()?.read_to_string(&mut output).ok()?;

        let credentials = parse_helper_output(&output);
        if credentials.is_anonymous() {
            None
        } else {
            Some(credentials)
        }
    }
}

/// Parse `key=value` lines from credential-helper output.
fn parse_helper_output(output: &str) -> Credentials {
    let mut credentials = Credentials::default();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once('=') {
            match key {
                "username" => credentials.username = Some(value.to_string()),
                "password" => credentials.password = Some(value.to_string()),
                _ => {}
            }
        }
    }
    credentials
}
