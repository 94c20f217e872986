use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::ReadDirection;

#[derive(Debug, Error, Diagnostic)]
pub enum EnaError {
    #[error("invalid run accession: {0:?}")]
    InvalidAccession(String),

    #[error("cannot specify --forward-only and --reverse-only")]
    ConflictingDirections,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("unable to resolve home directory for the aspera ssh key")]
    HomeDirectory,

    #[error("ENA request failed: {0}")]
    MetadataHttp(String),

    #[error("ENA returned status {status}: {message}")]
    MetadataStatus { status: u16, message: String },

    #[error("ENA response is not valid UTF-8: {0}")]
    MetadataEncoding(String),

    #[error("no FTP download URLs found for run {0}, cannot continue")]
    #[diagnostic(help("the run may have no FASTQ files on ENA yet"))]
    NoLocations(String),

    #[error(
        "expected exactly one {direction} read file containing '{marker}', found {matched}"
    )]
    AmbiguousDirection {
        direction: ReadDirection,
        marker: &'static str,
        matched: usize,
    },

    #[error("required tool not found: {0}")]
    #[diagnostic(help("install it and make sure it is on PATH"))]
    MissingTool(String),

    #[error("{program} exited with {}", describe_code(.code))]
    ToolFailed { program: String, code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
