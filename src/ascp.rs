use std::fmt;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::error::EnaError;
use crate::process;

/// Everything shared by the per-file ascp invocations of one run.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub program: String,
    pub base_args: Vec<String>,
    pub extra_args: Vec<String>,
    pub quiet: bool,
    pub ssh_key: Utf8PathBuf,
    pub strip_host: String,
    pub transfer_host: String,
    pub output_directory: Utf8PathBuf,
}

impl TransferPlan {
    pub fn new(
        config: &ResolvedConfig,
        ssh_key: Utf8PathBuf,
        ascp_args: &str,
        quiet: bool,
        output_directory: &Utf8Path,
    ) -> Self {
        Self {
            program: config.ascp_program.clone(),
            base_args: config.ascp_base_args.clone(),
            extra_args: split_args(ascp_args),
            quiet,
            ssh_key,
            strip_host: config.strip_host.clone(),
            transfer_host: config.transfer_host.clone(),
            output_directory: output_directory.to_path_buf(),
        }
    }

    pub fn remote_path(&self, location: &str) -> String {
        if self.strip_host.is_empty() {
            return location.to_string();
        }
        location.replace(&self.strip_host, "")
    }

    pub fn command_for(&self, location: &str) -> DownloadCommand {
        let mut args = Vec::new();
        if self.quiet {
            args.push("-Q".to_string());
        }
        args.extend(self.base_args.iter().cloned());
        args.extend(self.extra_args.iter().cloned());
        args.push("-i".to_string());
        args.push(self.ssh_key.to_string());
        args.push(format!("{}:{}", self.transfer_host, self.remote_path(location)));
        args.push(self.output_directory.to_string());
        DownloadCommand {
            program: self.program.clone(),
            args,
        }
    }
}

/// Pass-through arguments are split on whitespace; no shell quoting is interpreted.
pub fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for DownloadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

pub trait TransferClient: Send + Sync {
    fn transfer(&self, command: &DownloadCommand) -> Result<(), EnaError>;
    fn is_available(&self, program: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAscpClient;

impl SystemAscpClient {
    pub fn new() -> Self {
        Self
    }
}

impl TransferClient for SystemAscpClient {
    fn transfer(&self, command: &DownloadCommand) -> Result<(), EnaError> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|err| process::spawn_error(&command.program, err))?;
        process::check_status(&command.program, status)
    }

    fn is_available(&self, program: &str) -> bool {
        process::find_in_path(program).is_some()
    }
}
