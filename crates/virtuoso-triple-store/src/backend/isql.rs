use std::{path::PathBuf, process::Stdio, time::Duration};

use tokio::{io::AsyncWriteExt, process::Command};

use crate::{
    config::TripleStoreManagerConfig,
    error::{Result, TripleStoreError},
};

const ERROR_MARKER: &str = "*** Error";

/// Runs SQL through Virtuoso's `isql` command-line client.
///
/// Each call is one short `isql` session: the configured session statements
/// followed by the statement itself, piped on stdin.
///
/// `isql` only takes credentials as positional arguments, so the password is
/// visible in the process list of the machine running this client for the
/// length of each session. Run it on a host where other users cannot list
/// processes, or use a dedicated loader account.
pub struct IsqlClient {
    binary: PathBuf,
    address: String,
    username: String,
    password: String,
    session_init: Vec<String>,
}

impl IsqlClient {
    pub(crate) fn new(config: &TripleStoreManagerConfig, username: &str, password: &str) -> Self {
        Self {
            binary: config.isql.binary.clone(),
            address: config.sql_address(),
            username: username.to_string(),
            password: password.to_string(),
            session_init: config.isql.session_init.clone(),
        }
    }

    /// Script piped to `isql` for one statement.
    pub(crate) fn script(&self, statement: &str) -> String {
        let mut script = String::new();
        for init in &self.session_init {
            script.push_str(init.trim().trim_end_matches(';'));
            script.push_str(";\n");
        }
        script.push_str(statement.trim().trim_end_matches(';'));
        script.push_str(";\n");
        script
    }

    /// Command-line arguments of one session. Statements never appear here.
    pub(crate) fn arguments(&self) -> [&str; 6] {
        [
            &self.address,
            &self.username,
            &self.password,
            "BANNER=OFF",
            "PROMPT=OFF",
            "VERBOSE=OFF",
        ]
    }

    /// Executes `statement` and returns the session output.
    ///
    /// `timeout` covers the whole session, from writing the script to the
    /// process exit. The process is killed when the deadline passes.
    pub async fn run(&self, statement: &str, timeout: Duration) -> Result<String> {
        let script = self.script(statement);

        let mut child = Command::new(&self.binary)
            .args(self.arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let session = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(script.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(timeout, session)
            .await
            .map_err(|_| {
                TripleStoreError::Other(format!(
                    "isql session timed out after {}ms",
                    timeout.as_millis()
                ))
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if let Some(message) = first_error(&stdout).or_else(|| first_error(&stderr)) {
            return Err(TripleStoreError::Sql { message });
        }

        if !output.status.success() {
            let message = stderr.trim();
            return Err(TripleStoreError::Sql {
                message: if message.is_empty() {
                    format!("isql exited with {}", output.status)
                } else {
                    message.to_string()
                },
            });
        }

        Ok(stdout)
    }
}

fn first_error(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains(ERROR_MARKER))
        .map(|line| line.trim().to_string())
}
