use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use directories::BaseDirs;
use miette::IntoDiagnostic;

use ena_fast_download::app::{App, FetchOptions};
use ena_fast_download::ascp::SystemAscpClient;
use ena_fast_download::config::{ConfigLoader, ResolvedConfig};
use ena_fast_download::domain::{HttpBackend, RunAccession, SshKey, Verbosity};
use ena_fast_download::ena::{CurlMetadataClient, EnaHttpClient, MetadataClient};
use ena_fast_download::error::EnaError;
use ena_fast_download::logging;
use ena_fast_download::output::JsonOutput;

#[derive(Parser)]
#[command(name = "ena-fast-download")]
#[command(
    about = "Quickly download FASTQ files from the European Nucleotide Archive (ENA) using aspera",
    long_about = "Quickly download FASTQ files from the European Nucleotide Archive (ENA) using aspera.\n\n\
                  Requires ascp (aspera) to be in the $PATH."
)]
#[command(version, author)]
struct Cli {
    /// Run number to download e.g. ERR1739691
    run_identifier: RunAccession,

    /// Output files to this directory
    #[arg(long, alias = "output_directory", default_value = ".")]
    output_directory: Utf8PathBuf,

    /// 'linux' or 'osx' for the default key location on each OS, otherwise a path to the
    /// openssh key used by aspera (the -i flag of ascp)
    #[arg(long, alias = "ssh_key", default_value = "linux")]
    ssh_key: SshKey,

    /// Forward reads only
    #[arg(long, alias = "forward_only", conflicts_with = "reverse_only")]
    forward_only: bool,

    /// Reverse reads only
    #[arg(long, alias = "reverse_only")]
    reverse_only: bool,

    /// Extra arguments to pass to ascp e.g. '-k 2' to resume with a sparse file checksum.
    /// Split on whitespace; shell quoting is not interpreted
    #[arg(long, alias = "ascp_args", default_value = "", allow_hyphen_values = true)]
    ascp_args: String,

    /// Output debug information
    #[arg(long, conflicts_with = "quiet")]
    debug: bool,

    /// Only output errors
    #[arg(long)]
    quiet: bool,

    /// JSON config overriding ENA endpoints and ascp defaults
    #[arg(long)]
    config: Option<String>,

    /// How the ENA metadata request is made
    #[arg(long, value_enum, default_value_t = HttpBackend::Reqwest)]
    http_client: HttpBackend,

    /// Log the ascp commands without running them
    #[arg(long)]
    dry_run: bool,

    /// Print a JSON report of the run to stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.debug, cli.quiet);
    logging::init(verbosity);

    if let Err(report) = run(cli, verbosity) {
        tracing::error!("{report}");
        if !verbosity.is_quiet() {
            eprintln!("{report:?}");
        }
        if let Some(err) = report.downcast_ref::<EnaError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EnaError) -> u8 {
    match error {
        EnaError::ToolFailed {
            code: Some(code), ..
        } => u8::try_from(*code).ok().filter(|code| *code != 0).unwrap_or(1),
        _ => 1,
    }
}

fn run(cli: Cli, verbosity: Verbosity) -> miette::Result<()> {
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let options = FetchOptions {
        accession: cli.run_identifier,
        output_directory: cli.output_directory,
        ssh_key: cli.ssh_key,
        forward_only: cli.forward_only,
        reverse_only: cli.reverse_only,
        ascp_args: cli.ascp_args,
        quiet: verbosity.is_quiet(),
        dry_run: cli.dry_run,
    };

    match cli.http_client {
        HttpBackend::Reqwest => {
            let metadata = EnaHttpClient::new()?;
            run_fetch(config, metadata, &options, cli.json)
        }
        HttpBackend::Curl => {
            let metadata = CurlMetadataClient::new(config.curl_program.clone());
            run_fetch(config, metadata, &options, cli.json)
        }
    }
}

fn run_fetch<M: MetadataClient>(
    config: ResolvedConfig,
    metadata: M,
    options: &FetchOptions,
    json: bool,
) -> miette::Result<()> {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    let app = App::new(config, home, metadata, SystemAscpClient::new());
    let report = app.run(options)?;
    if json {
        JsonOutput::print_report(&report).into_diagnostic()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn forward_and_reverse_conflict() {
        let result = Cli::try_parse_from(["ena-fast-download", "ERR1", "--forward-only", "--reverse-only"]);
        assert!(result.is_err());
    }

    #[test]
    fn debug_and_quiet_conflict() {
        let result = Cli::try_parse_from(["ena-fast-download", "ERR1", "--debug", "--quiet"]);
        assert!(result.is_err());
    }

    #[test]
    fn underscore_aliases_and_hyphenated_ascp_args() {
        let cli = Cli::try_parse_from([
            "ena-fast-download",
            "ERR1739691",
            "--output_directory",
            "reads",
            "--ssh_key",
            "osx",
            "--ascp-args",
            "-k 2",
            "--forward_only",
        ])
        .unwrap();
        assert_eq!(cli.output_directory, "reads");
        assert_eq!(cli.ssh_key, SshKey::Osx);
        assert_eq!(cli.ascp_args, "-k 2");
        assert!(cli.forward_only);
    }

    #[test]
    fn ascp_args_help_mentions_whitespace_split() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == "ascp_args")
            .unwrap();
        let help = arg.get_help().unwrap().to_string();
        assert!(help.contains("shell quoting is not interpreted"));
    }

    #[test]
    fn tool_exit_code_is_propagated() {
        let err = EnaError::ToolFailed {
            program: "ascp".to_string(),
            code: Some(4),
        };
        assert_eq!(map_exit_code(&err), 4);
        assert_eq!(map_exit_code(&EnaError::NoLocations("ERR1".to_string())), 1);
    }
}
