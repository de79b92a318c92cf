//! Child-process invocation of the external database tools.
//!
//! One `Invocation` describes a single psql or pg_dump run: connection
//! flags, the payload (script file or inline SQL), and mode switches.
//! Output is streamed line-by-line through the severity router while
//! also being captured for the caller.

use crate::error::{ClientError, ClientResult};
use crate::output::report_line;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Connection parameters forwarded as command-line flags
#[derive(Debug, Clone, Default)]
pub struct ConnectionParams {
    pub host: Option<String>,
    pub port: Option<String>,
    pub dbname: Option<String>,
    pub username: Option<String>,
    /// Exported as PGPASSWORD, never passed as an argument
    pub password: Option<String>,
}

/// What the client should execute
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// A script file, passed with --file
    File(PathBuf),
    /// Inline SQL, passed with --command
    Sql(String),
    /// No payload (interactive or args-only runs)
    #[default]
    None,
}

/// One external tool run
#[derive(Debug, Default)]
pub struct Invocation {
    /// Executable name or path
    pub command: String,
    pub params: ConnectionParams,
    pub payload: Payload,
    /// Extra operator-supplied arguments, appended last
    pub additional_args: Vec<String>,
    /// Bare-result query mode (--tuples-only --no-align)
    pub tuples_only: bool,
    /// Schema dump mode (--schema-only --encoding=UTF8 + dump_args)
    pub schema_only: bool,
    /// Configured dump arguments, only used with `schema_only`
    pub dump_args: Vec<String>,
    /// Attach the child to the terminal instead of capturing
    pub inherit_stdio: bool,
    /// Capture without printing
    pub muted: bool,
    pub verbose: bool,
}

/// Captured result of one invocation
#[derive(Debug)]
pub struct InvocationOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl Invocation {
    /// Build the argument vector. Pure, so the flag layout is testable
    /// without spawning anything.
    pub fn args(&self) -> Vec<String> {
        // --help short-circuits everything else, matching the tools' own
        // behavior when mixed with connection flags.
        if self.additional_args.iter().any(|a| a == "--help") {
            return vec!["--help".to_string()];
        }

        let mut args = Vec::new();
        if let Some(host) = &self.params.host {
            args.push(format!("--host={host}"));
        }
        if let Some(port) = &self.params.port {
            args.push(format!("--port={port}"));
        }
        if let Some(dbname) = &self.params.dbname {
            args.push(format!("--dbname={dbname}"));
        }
        if let Some(username) = &self.params.username {
            args.push(format!("--username={username}"));
        }

        if self.tuples_only {
            args.push("--tuples-only".to_string());
            args.push("--no-align".to_string());
        }

        if self.schema_only {
            args.push("--schema-only".to_string());
            args.push("--encoding=UTF8".to_string());
            args.extend(self.dump_args.iter().cloned());
        }

        match &self.payload {
            Payload::File(path) => {
                args.push("--echo-errors".to_string());
                args.push("--file".to_string());
                args.push(path.display().to_string());
            }
            Payload::Sql(sql) => {
                args.push("--echo-errors".to_string());
                args.push("--command".to_string());
                args.push(sql.clone());
            }
            Payload::None => {}
        }

        args.extend(self.additional_args.iter().cloned());
        args
    }

    /// Spawn the tool and wait for it to finish.
    ///
    /// There is deliberately no timeout: migrations may legitimately run
    /// arbitrarily long.
    pub async fn run(&self) -> ClientResult<InvocationOutput> {
        let args = self.args();
        if self.verbose {
            eprintln!("[verbose] {} {}", self.command, args.join(" "));
        }

        let mut cmd = tokio::process::Command::new(&self.command);
        cmd.args(&args);
        if let Some(password) = &self.params.password {
            cmd.env("PGPASSWORD", password);
        }

        if self.inherit_stdio {
            let status = cmd.status().await.map_err(|e| ClientError::Spawn {
                command: self.command.clone(),
                source: e,
            })?;
            return Ok(InvocationOutput {
                exit_code: status.code().unwrap_or(-1),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| ClientError::Spawn {
            command: self.command.clone(),
            source: e,
        })?;

        let stdout = child.stdout.take().expect("stdout is piped");
        let stderr = child.stderr.take().expect("stderr is piped");
        let muted = self.muted;

        let (stdout, stderr, status) = tokio::join!(
            drain(stdout, muted),
            drain(stderr, muted),
            child.wait()
        );
        let status = status.map_err(ClientError::Io)?;

        Ok(InvocationOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout?,
            stderr: stderr?,
        })
    }
}

/// Read a stream to completion, routing each line unless muted.
async fn drain(reader: impl AsyncRead + Unpin, muted: bool) -> ClientResult<String> {
    let mut lines = BufReader::new(reader).lines();
    let mut buffer = String::new();
    while let Some(line) = lines.next_line().await? {
        if !muted {
            report_line(&line);
        }
        buffer.push_str(&line);
        buffer.push('\n');
    }
    Ok(buffer)
}

#[cfg(test)]
#[path = "invocation_test.rs"]
mod tests;
