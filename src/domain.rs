use std::fmt;
use std::path::Path;
use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::EnaError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunAccession(String);

impl RunAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunAccession {
    type Err = EnaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EnaError::InvalidAccession(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadDirection {
    Forward,
    Reverse,
}

impl ReadDirection {
    /// Substring that identifies this direction's file in an ENA location.
    pub fn marker(self) -> &'static str {
        match self {
            ReadDirection::Forward => "_1.fastq",
            ReadDirection::Reverse => "_2.fastq",
        }
    }
}

impl fmt::Display for ReadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadDirection::Forward => write!(f, "forward"),
            ReadDirection::Reverse => write!(f, "reverse"),
        }
    }
}

const LINUX_KEY: &str = ".aspera/connect/etc/asperaweb_id_dsa.openssh";
const OSX_KEY: &str =
    "Applications/Aspera Connect.app/Contents/Resources/asperaweb_id_dsa.openssh";

/// Which openssh key `ascp -i` receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshKey {
    Linux,
    Osx,
    Path(Utf8PathBuf),
}

impl SshKey {
    pub fn resolve(&self, home: &Path) -> Result<Utf8PathBuf, EnaError> {
        let relative = match self {
            SshKey::Path(path) => return Ok(path.clone()),
            SshKey::Linux => LINUX_KEY,
            SshKey::Osx => OSX_KEY,
        };
        Utf8PathBuf::from_path_buf(home.join(relative)).map_err(|_| EnaError::HomeDirectory)
    }
}

impl FromStr for SshKey {
    type Err = EnaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "linux" => Ok(SshKey::Linux),
            "osx" => Ok(SshKey::Osx),
            other => Ok(SshKey::Path(Utf8PathBuf::from(other))),
        }
    }
}

impl fmt::Display for SshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SshKey::Linux => write!(f, "linux"),
            SshKey::Osx => write!(f, "osx"),
            SshKey::Path(path) => write!(f, "{path}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Debug,
    #[default]
    Normal,
    Quiet,
}

impl Verbosity {
    pub fn from_flags(debug: bool, quiet: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    pub fn level(self) -> LevelFilter {
        match self {
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Quiet => LevelFilter::ERROR,
        }
    }

    pub fn is_quiet(self) -> bool {
        matches!(self, Verbosity::Quiet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HttpBackend {
    #[default]
    Reqwest,
    Curl,
}
