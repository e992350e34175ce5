//! Credential-helper subprocess support
//!
//! Speaks the `git credential fill` protocol: `key=value` lines on stdin
//! terminated by a blank line, `username=`/`password=` lines on stdout.
//! The helper is given a bounded wait because interactive credential
//! managers (OAuth/device-flow) may block indefinitely; on timeout it is
//! killed and treated as a non-match rather than an error.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use url::Url;

use crate::credentials::CredentialResult;

/// How long a credential helper may run before it is killed.
pub const HELPER_TIMEOUT: Duration = Duration::from_secs(30);

const WAIT_POLL: Duration = Duration::from_millis(50);

/// Invocation of a `git credential fill`-compatible helper.
#[derive(Debug, Clone)]
pub struct HelperCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for HelperCommand {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            args: vec!["credential".to_string(), "fill".to_string()],
            timeout: HELPER_TIMEOUT,
        }
    }
}

impl HelperCommand {
    /// Create a helper invocation for the system `git credential fill`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the wait timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run an arbitrary program in place of `git credential fill`.
    ///
    /// Primarily useful for testing against a scripted helper.
    pub fn with_program(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }

    /// Ask the helper for credentials matching `url`.
    ///
    /// Returns `None` when the URL cannot be expressed in the credential
    /// protocol (e.g. scp-style SSH), when the helper cannot be spawned,
    /// exits non-zero, times out, or produces incomplete output.
    pub fn fill(&self, url: &str) -> Option<CredentialResult> {
        let request = credential_request(url)?;

        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(program = %self.program, error = %e, "failed to spawn credential helper");
                return None;
            }
        };

        // Write the request and close stdin before waiting, so the helper
        // sees end-of-input and can respond.
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(request.as_bytes())
        {
            tracing::debug!(error = %e, "failed to write credential request to helper");
        }

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Some(status) => status,
            None => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "credential helper did not exit in time; killing it"
                );
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        };

        // Drain stdout only after the process has exited.
        let mut output = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_string(&mut output).ok()?;
        }

        if !status.success() {
            tracing::debug!(?status, "credential helper exited unsuccessfully");
            return None;
        }

        parse_fill_output(&output)
    }
}

/// Poll the child until it exits or the timeout elapses.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return None;
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to poll credential helper");
                return None;
            }
        }
    }
}

/// Build the `key=value` request block for a remote URL.
///
/// Returns `None` for URLs the credential protocol cannot describe
/// (scp-style SSH remotes, bare filesystem paths).
fn credential_request(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let mut request = format!("protocol={}\nhost={}\n", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        request.push_str(&format!("port={port}\n"));
    }
    let path = parsed.path().trim_start_matches('/');
    if !path.is_empty() {
        request.push_str(&format!("path={path}\n"));
    }
    request.push('\n');
    Some(request)
}

/// Parse `username=`/`password=` lines from helper output.
///
/// Both must be present and non-empty for a match.
fn parse_fill_output(output: &str) -> Option<CredentialResult> {
    let mut username = None;
    let mut password = None;

    for line in output.lines() {
        if let Some(value) = line.strip_prefix("username=") {
            if !value.is_empty() {
                username = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("password=") {
            if !value.is_empty() {
                password = Some(value.to_string());
            }
        }
    }

    match (username, password) {
        (Some(username), Some(secret)) => Some(CredentialResult { username, secret }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_includes_protocol_and_host() {
        let request = credential_request("https://github.com/user/repo.git").unwrap();
        assert_eq!(request, "protocol=https\nhost=github.com\npath=user/repo.git\n\n");
    }

    #[test]
    fn request_includes_explicit_port() {
        let request = credential_request("https://git.example.com:8443/repo.git").unwrap();
        assert!(request.contains("port=8443\n"));
        assert!(request.contains("host=git.example.com\n"));
    }

    #[test]
    fn request_omits_empty_path() {
        let request = credential_request("https://github.com").unwrap();
        assert!(!request.contains("path="));
        assert!(request.ends_with("\n\n"));
    }

    #[test]
    fn request_rejects_scp_style_urls() {
        assert!(credential_request("git@github.com:user/repo.git").is_none());
    }

    #[test]
    fn request_rejects_plain_paths() {
        assert!(credential_request("/tmp/some/repo").is_none());
    }

    #[test]
    fn parse_accepts_complete_output() {
        let parsed = parse_fill_output("username=alice\npassword=s3cret\n").unwrap();
        assert_eq!(parsed.username, "alice");
        assert_eq!(parsed.secret, "s3cret");
    }

    #[test]
    fn parse_ignores_unknown_keys() {
        let parsed =
            parse_fill_output("protocol=https\nhost=github.com\nusername=alice\npassword=pw\n")
                .unwrap();
        assert_eq!(parsed.username, "alice");
    }

    #[test]
    fn parse_rejects_missing_password() {
        assert!(parse_fill_output("username=alice\n").is_none());
    }

    #[test]
    fn parse_rejects_empty_values() {
        assert!(parse_fill_output("username=\npassword=pw\n").is_none());
        assert!(parse_fill_output("username=alice\npassword=\n").is_none());
    }

    #[cfg(unix)]
    mod subprocess {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::time::Instant;

        fn script_helper(dir: &std::path::Path, body: &str) -> String {
            let path = dir.join("helper.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path.to_str().unwrap().to_string()
        }

        #[test]
        fn fill_parses_scripted_helper_output() {
            let dir = tempfile::TempDir::new().unwrap();
            let script = script_helper(
                dir.path(),
                "cat > /dev/null\necho username=bob\necho password=hunter2",
            );

            let helper = HelperCommand::new().with_program(script, Vec::new());
            let result = helper.fill("https://github.com/user/repo.git").unwrap();
            assert_eq!(result.username, "bob");
            assert_eq!(result.secret, "hunter2");
        }

        #[test]
        fn fill_treats_nonzero_exit_as_no_match() {
            let dir = tempfile::TempDir::new().unwrap();
            let script = script_helper(dir.path(), "cat > /dev/null\nexit 1");

            let helper = HelperCommand::new().with_program(script, Vec::new());
            assert!(helper.fill("https://github.com/user/repo.git").is_none());
        }

        #[test]
        fn fill_kills_helper_on_timeout() {
            let dir = tempfile::TempDir::new().unwrap();
            let script = script_helper(dir.path(), "sleep 30");

            let helper = HelperCommand::new()
                .with_program(script, Vec::new())
                .with_timeout(Duration::from_millis(200));

            let started = Instant::now();
            assert!(helper.fill("https://github.com/user/repo.git").is_none());
            assert!(started.elapsed() < Duration::from_secs(5));
        }

        #[test]
        fn fill_handles_missing_helper_program() {
            let helper =
                HelperCommand::new().with_program("/nonexistent/credential-helper", Vec::new());
            assert!(helper.fill("https://github.com/user/repo.git").is_none());
        }
    }
}
