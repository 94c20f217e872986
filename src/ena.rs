use std::process::Command;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::ResolvedConfig;
use crate::domain::{ReadDirection, RunAccession};
use crate::error::EnaError;
use crate::process;

/// Performs the single GET against the ENA filereport endpoint.
pub trait MetadataClient: Send + Sync {
    fn fetch_report(&self, url: &str) -> Result<String, EnaError>;
}

#[derive(Clone)]
pub struct EnaHttpClient {
    client: Client,
}

impl EnaHttpClient {
    pub fn new() -> Result<Self, EnaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("ena-fast-download/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| EnaError::MetadataHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(None)
            .build()
            .map_err(|err| EnaError::MetadataHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, EnaError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "ENA request failed".to_string());
        Err(EnaError::MetadataStatus { status, message })
    }
}

impl MetadataClient for EnaHttpClient {
    fn fetch_report(&self, url: &str) -> Result<String, EnaError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| EnaError::MetadataHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let body = response
            .bytes()
            .map_err(|err| EnaError::MetadataHttp(err.to_string()))?;
        String::from_utf8(body.to_vec()).map_err(|err| EnaError::MetadataEncoding(err.to_string()))
    }
}

/// Shells out to curl the way older setups fetched the report.
#[derive(Debug, Clone)]
pub struct CurlMetadataClient {
    program: String,
}

impl CurlMetadataClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(url: &str) -> Vec<String> {
        vec!["--silent".to_string(), url.to_string()]
    }
}

impl MetadataClient for CurlMetadataClient {
    fn fetch_report(&self, url: &str) -> Result<String, EnaError> {
        let output = Command::new(&self.program)
            .args(Self::args(url))
            .output()
            .map_err(|err| process::spawn_error(&self.program, err))?;
        process::check_status(&self.program, output.status)?;
        String::from_utf8(output.stdout).map_err(|err| EnaError::MetadataEncoding(err.to_string()))
    }
}

pub fn query_url(config: &ResolvedConfig, accession: &RunAccession) -> Result<String, EnaError> {
    let url = Url::parse_with_params(
        &config.metadata_url,
        &[
            ("accession", accession.as_str()),
            ("result", config.result.as_str()),
            ("fields", config.fields.as_str()),
        ],
    )
    .map_err(|err| EnaError::MetadataHttp(format!("{}: {err}", config.metadata_url)))?;
    Ok(url.to_string())
}

/// Collects the `;`-separated locations from the second column of every data row.
pub fn parse_locations(text: &str) -> Vec<String> {
    let mut locations = Vec::new();
    for line in text.split('\n').skip(1) {
        tracing::debug!("parsing line: {line}");
        if line.is_empty() {
            continue;
        }
        let Some(field) = line.split('\t').nth(1) else {
            continue;
        };
        locations.extend(
            field
                .split(';')
                .map(str::trim)
                .filter(|location| !location.is_empty())
                .map(str::to_string),
        );
    }
    locations
}

pub fn filter_direction(
    accession: &RunAccession,
    locations: Vec<String>,
    direction: Option<ReadDirection>,
) -> Result<Vec<String>, EnaError> {
    if locations.is_empty() {
        return Err(EnaError::NoLocations(accession.to_string()));
    }
    tracing::debug!(
        "found {} FTP URLs for download: {}",
        locations.len(),
        locations.join(", ")
    );

    let Some(direction) = direction else {
        return Ok(locations);
    };

    if locations.len() == 1 {
        tracing::warn!(
            "requested {direction} reads only but only a single read set was found, downloading the single read set"
        );
        return Ok(locations);
    }

    let marker = direction.marker();
    let retained = locations
        .into_iter()
        .filter(|location| location.contains(marker))
        .collect::<Vec<_>>();
    if retained.len() != 1 {
        return Err(EnaError::AmbiguousDirection {
            direction,
            marker,
            matched: retained.len(),
        });
    }
    tracing::info!("downloading {direction} only: {}", retained[0]);
    Ok(retained)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn accession() -> RunAccession {
        "ERR1739691".parse().unwrap()
    }

    #[test]
    fn parse_trims_and_drops_empty_pieces() {
        let text = "run_accession\tfastq_ftp\nERR1\t a_1.fastq.gz ;; b_2.fastq.gz;\n\n";
        assert_eq!(parse_locations(text), vec!["a_1.fastq.gz", "b_2.fastq.gz"]);
    }

    #[test]
    fn header_only_yields_nothing() {
        assert!(parse_locations("run_accession\tfastq_ftp\n").is_empty());
        assert!(parse_locations("").is_empty());
    }

    #[test]
    fn row_without_second_column_is_skipped() {
        let text = "run_accession\tfastq_ftp\nERR1\nERR2\tc.fastq.gz";
        assert_eq!(parse_locations(text), vec!["c.fastq.gz"]);
    }

    #[test]
    fn empty_list_is_fatal() {
        let err = filter_direction(&accession(), Vec::new(), None).unwrap_err();
        assert_matches!(err, EnaError::NoLocations(id) if id == "ERR1739691");
    }

    #[test]
    fn reverse_filter_with_no_match() {
        let locations = vec!["x_1.fastq.gz".to_string(), "x.fastq.gz".to_string()];
        let err =
            filter_direction(&accession(), locations, Some(ReadDirection::Reverse)).unwrap_err();
        assert_matches!(
            err,
            EnaError::AmbiguousDirection {
                marker: "_2.fastq",
                matched: 0,
                ..
            }
        );
    }

    #[test]
    fn query_url_embeds_accession_and_fields() {
        let url = query_url(&ResolvedConfig::default(), &accession()).unwrap();
        assert_eq!(
            url,
            "https://www.ebi.ac.uk/ena/portal/api/filereport?accession=ERR1739691&result=read_run&fields=fastq_ftp"
        );
    }

    #[test]
    fn curl_is_silent() {
        assert_eq!(
            CurlMetadataClient::args("https://x"),
            vec!["--silent", "https://x"]
        );
    }
}
