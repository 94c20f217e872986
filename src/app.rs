use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::ascp::{DownloadCommand, TransferClient, TransferPlan};
use crate::config::ResolvedConfig;
use crate::domain::{ReadDirection, RunAccession, SshKey};
use crate::ena::{self, MetadataClient};
use crate::error::EnaError;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub accession: RunAccession,
    pub output_directory: Utf8PathBuf,
    pub ssh_key: SshKey,
    pub forward_only: bool,
    pub reverse_only: bool,
    pub ascp_args: String,
    pub quiet: bool,
    pub dry_run: bool,
}

impl FetchOptions {
    pub fn new(accession: RunAccession) -> Self {
        Self {
            accession,
            output_directory: Utf8PathBuf::from("."),
            ssh_key: SshKey::Linux,
            forward_only: false,
            reverse_only: false,
            ascp_args: String::new(),
            quiet: false,
            dry_run: false,
        }
    }

    pub fn direction(&self) -> Result<Option<ReadDirection>, EnaError> {
        match (self.forward_only, self.reverse_only) {
            (true, true) => Err(EnaError::ConflictingDirections),
            (true, false) => Ok(Some(ReadDirection::Forward)),
            (false, true) => Ok(Some(ReadDirection::Reverse)),
            (false, false) => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub accession: String,
    pub query_url: String,
    pub locations: Vec<String>,
    pub commands: Vec<DownloadCommand>,
    pub executed: bool,
}

#[derive(Clone)]
pub struct App<M: MetadataClient, T: TransferClient> {
    config: ResolvedConfig,
    home: Option<PathBuf>,
    metadata: M,
    transfer: T,
}

impl<M: MetadataClient, T: TransferClient> App<M, T> {
    pub fn new(config: ResolvedConfig, home: Option<PathBuf>, metadata: M, transfer: T) -> Self {
        Self {
            config,
            home,
            metadata,
            transfer,
        }
    }

    pub fn run(&self, options: &FetchOptions) -> Result<FetchReport, EnaError> {
        let direction = options.direction()?;
        let ssh_key = self.resolve_key(&options.ssh_key)?;
        tracing::info!("using aspera ssh key file: {ssh_key}");

        let query_url = ena::query_url(&self.config, &options.accession)?;
        tracing::info!("querying ENA for FTP paths for {}..", options.accession);
        tracing::debug!("querying '{query_url}'");
        let text = self.metadata.fetch_report(&query_url)?;
        tracing::debug!("found text from ENA API: {text:?}");

        let locations = ena::parse_locations(&text);
        let locations = ena::filter_direction(&options.accession, locations, direction)?;
        tracing::info!(
            "downloading {} FTP read set(s): {}",
            locations.len(),
            locations.join(", ")
        );

        let plan = TransferPlan::new(
            &self.config,
            ssh_key,
            &options.ascp_args,
            options.quiet,
            &options.output_directory,
        );
        let commands = locations
            .iter()
            .map(|location| plan.command_for(location))
            .collect::<Vec<_>>();

        if options.dry_run {
            for command in &commands {
                tracing::info!("dry run, would run: {command}");
            }
        } else {
            if !self.transfer.is_available(&plan.program) {
                return Err(EnaError::MissingTool(plan.program.clone()));
            }
            for command in &commands {
                tracing::info!("running command: {command}");
                self.transfer.transfer(command)?;
            }
            tracing::info!("all done.");
        }

        Ok(FetchReport {
            accession: options.accession.to_string(),
            query_url,
            locations,
            commands,
            executed: !options.dry_run,
        })
    }

    fn resolve_key(&self, key: &SshKey) -> Result<Utf8PathBuf, EnaError> {
        match key {
            SshKey::Path(path) => Ok(path.clone()),
            preset => {
                let home = self.home.as_deref().ok_or(EnaError::HomeDirectory)?;
                preset.resolve(home)
            }
        }
    }
}
