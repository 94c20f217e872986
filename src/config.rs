use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EnaError;

pub const DEFAULT_CONFIG_FILE: &str = "ena-fast-download.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub metadata_url: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub fields: Option<String>,
    #[serde(default)]
    pub strip_host: Option<String>,
    #[serde(default)]
    pub transfer_host: Option<String>,
    #[serde(default)]
    pub ascp_program: Option<String>,
    #[serde(default)]
    pub curl_program: Option<String>,
    #[serde(default)]
    pub ascp_base_args: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub metadata_url: String,
    pub result: String,
    pub fields: String,
    /// Removed from every FTP location before it is handed to ascp.
    pub strip_host: String,
    pub transfer_host: String,
    pub ascp_program: String,
    pub curl_program: String,
    pub ascp_base_args: Vec<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ConfigLoader::resolve_config(Config::default())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist; otherwise the default file is optional.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, EnaError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| EnaError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| EnaError::ConfigParse(err.to_string()))?;
        tracing::debug!("loaded config from {}", config_path.display());

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        ResolvedConfig {
            metadata_url: config
                .metadata_url
                .unwrap_or_else(|| "https://www.ebi.ac.uk/ena/portal/api/filereport".to_string()),
            result: config.result.unwrap_or_else(|| "read_run".to_string()),
            fields: config.fields.unwrap_or_else(|| "fastq_ftp".to_string()),
            strip_host: config
                .strip_host
                .unwrap_or_else(|| "ftp.sra.ebi.ac.uk".to_string()),
            transfer_host: config
                .transfer_host
                .unwrap_or_else(|| "era-fasp@fasp.sra.ebi.ac.uk".to_string()),
            ascp_program: config.ascp_program.unwrap_or_else(|| "ascp".to_string()),
            curl_program: config.curl_program.unwrap_or_else(|| "curl".to_string()),
            ascp_base_args: config
                .ascp_base_args
                .unwrap_or_else(default_ascp_base_args),
        }
    }
}

/// Resume with sparse checksums, fair-policy transfer capped at 5 Mbps on port 33001.
pub fn default_ascp_base_args() -> Vec<String> {
    vec![
        "-k2".to_string(),
        "-T".to_string(),
        "-l".to_string(),
        "5m".to_string(),
        "-P33001".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ena() {
        let resolved = ConfigLoader::resolve_config(Config::default());
        assert_eq!(resolved.strip_host, "ftp.sra.ebi.ac.uk");
        assert_eq!(resolved.transfer_host, "era-fasp@fasp.sra.ebi.ac.uk");
        assert_eq!(resolved.fields, "fastq_ftp");
        assert_eq!(resolved.ascp_base_args, default_ascp_base_args());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: Config = serde_json::from_str(r#"{"strip_host": "ftp.example.org"}"#).unwrap();
        let resolved = ConfigLoader::resolve_config(config);
        assert_eq!(resolved.strip_host, "ftp.example.org");
        assert_eq!(resolved.ascp_program, "ascp");
    }
}
