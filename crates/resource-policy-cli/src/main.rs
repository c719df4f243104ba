// crates/resource-policy-cli/src/main.rs
// ============================================================================
// Module: Resource Policy CLI Entry Point
// Description: Command dispatcher for policy upload, checks, and previews.
// Purpose: Run policy workflows from project files on disk.
// Dependencies: clap, resource-policy-client, resource-policy-config, serde_json
// ============================================================================

//! ## Overview
//! The `resource-policy` binary uploads a project's filtered resources,
//! evaluates policies for a run, and previews the filtered batch offline.
//! JSON results go to stdout; progress lines and diagnostics go to stderr
//! (or the configured sink); any failure is a single stderr line and a
//! failure exit code. Input files are untrusted and read with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use resource_policy_client::AllowListEntry;
use resource_policy_client::HttpQueryTransport;
use resource_policy_client::PolicyClient;
use resource_policy_client::ProgressOutput;
use resource_policy_client::allow_lists_from_entries;
use resource_policy_config::DiagnosticsTarget;
use resource_policy_config::LogFormat;
use resource_policy_config::LoggingConfig;
use resource_policy_config::ResourcePolicyConfig;
use resource_policy_core::EventSink;
use resource_policy_core::JsonLineEventSink;
use resource_policy_core::LogLevel;
use resource_policy_core::NoopEventSink;
use resource_policy_core::Project;
use resource_policy_core::assemble_batch;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a project JSON input.
const MAX_PROJECT_BYTES: usize = 64 * 1024 * 1024;
/// Maximum size of a run description JSON input.
const MAX_RUN_BYTES: usize = 16 * 1024 * 1024;
/// Maximum size of a local allow-list JSON input.
const MAX_ALLOW_LIST_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "resource-policy", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to resource-policy.toml or `RESOURCE_POLICY_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a project's filtered resources and print the recorded shas.
    Upload(UploadCommand),
    /// Evaluate policies for a run and print the results.
    Check(CheckCommand),
    /// Print the filtered batch for a project using a local allow-list.
    Filter(FilterCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `upload`.
#[derive(Args, Debug)]
struct UploadCommand {
    /// Project JSON file.
    #[arg(long, value_name = "FILE")]
    project: PathBuf,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Run description JSON file.
    #[arg(long, value_name = "FILE")]
    run: PathBuf,
}

/// Arguments for `filter`.
#[derive(Args, Debug)]
struct FilterCommand {
    /// Project JSON file.
    #[arg(long, value_name = "FILE")]
    project: PathBuf,
    /// Allow-list JSON file: `[{"resourceType": ..., "allowed": ...}]`.
    #[arg(long, value_name = "FILE")]
    allow_list: PathBuf,
    /// Filter the past resource set instead of the current one.
    #[arg(long)]
    past: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration file.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying the single line reported on stderr.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Failure reading a bounded input file.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let Cli {
        config,
        command,
    } = Cli::parse();
    let config_path = config.as_deref();
    match command {
        Commands::Upload(command) => command_upload(config_path, &command),
        Commands::Check(command) => command_check(config_path, &command),
        Commands::Filter(command) => command_filter(config_path, &command),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(config_path),
    }
}

// ============================================================================
// SECTION: Policy Commands
// ============================================================================

/// Executes the `upload` command.
fn command_upload(config_path: Option<&Path>, command: &UploadCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let mut project: Project = read_json_file(&command.project, MAX_PROJECT_BYTES, "project")?;
    let client = build_client(&config)?;
    client
        .upload_policy_data(&mut project)
        .map_err(|err| CliError::new(format!("policy upload failed: {err}")))?;
    write_json(&project.metadata)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `check` command.
fn command_check(config_path: Option<&Path>, command: &CheckCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let run: Value = read_json_file(&command.run, MAX_RUN_BYTES, "run")?;
    let client = build_client(&config)?;
    let output = client
        .check_policies(&run)
        .map_err(|err| CliError::new(format!("policy check failed: {err}")))?;
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the offline `filter` command.
fn command_filter(config_path: Option<&Path>, command: &FilterCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let events = diagnostics_sink(&config.logging)?;
    let project: Project = read_json_file(&command.project, MAX_PROJECT_BYTES, "project")?;
    let entries: Vec<AllowListEntry> =
        read_json_file(&command.allow_list, MAX_ALLOW_LIST_BYTES, "allow-list")?;
    let allow_lists = allow_lists_from_entries(entries)
        .map_err(|err| CliError::new(format!("invalid allow-list: {err}")))?;
    let resources = if command.past { &project.past_resources } else { &project.resources };
    let batch = assemble_batch(resources, &allow_lists, events.as_ref());
    write_json(&batch)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let _config = ResourcePolicyConfig::load(config_path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Loads configuration, allowing the default file to be absent.
fn load_config(config_path: Option<&Path>) -> CliResult<ResourcePolicyConfig> {
    ResourcePolicyConfig::load_or_default(config_path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Builds a policy client over HTTP from validated configuration.
fn build_client(config: &ResourcePolicyConfig) -> CliResult<PolicyClient<HttpQueryTransport>> {
    let events = diagnostics_sink(&config.logging)?;
    let settings = config
        .api
        .transport_config()
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let transport =
        HttpQueryTransport::new(settings).map_err(|err| CliError::new(err.to_string()))?;
    let progress = match config.logging.format {
        LogFormat::Plain => ProgressOutput::plain(std::io::stderr()),
        LogFormat::Structured => ProgressOutput::structured(Arc::clone(&events)),
    };
    Ok(PolicyClient::new(transport, events, progress))
}

/// Opens the configured diagnostics sink.
///
/// Stderr receives info and above; a diagnostics file receives every event.
fn diagnostics_sink(logging: &LoggingConfig) -> CliResult<Arc<dyn EventSink>> {
    match &logging.diagnostics {
        DiagnosticsTarget::Stderr => {
            Ok(Arc::new(JsonLineEventSink::with_min_level(std::io::stderr(), LogLevel::Info)))
        }
        DiagnosticsTarget::Disabled => Ok(Arc::new(NoopEventSink)),
        DiagnosticsTarget::File(path) => {
            let path = Path::new(path.trim());
            let file = OpenOptions::new().create(true).append(true).open(path).map_err(|err| {
                CliError::new(format!(
                    "failed to open diagnostics file {}: {err}",
                    path.display()
                ))
            })?;
            Ok(Arc::new(JsonLineEventSink::new(file)))
        }
    }
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads and parses a bounded JSON input file.
///
/// Parsing goes through the text deserializer so raw resource values keep
/// their original bytes.
fn read_json_file<T: DeserializeOwned>(
    path: &Path,
    max_bytes: usize,
    label: &str,
) -> CliResult<T> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| {
        let detail = match err {
            ReadLimitError::Io(error) => error.to_string(),
            ReadLimitError::TooLarge {
                size,
                limit,
            } => format!("file exceeds size limit ({size} > {limit})"),
        };
        CliError::new(format!("failed to read {label} {}: {detail}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(format!("failed to parse {label} {}: {err}", path.display()))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as one line of JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
