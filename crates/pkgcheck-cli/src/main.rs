// crates/pkgcheck-cli/src/main.rs
// ============================================================================
// Module: pkgcheck CLI Entry Point
// Description: Command dispatcher for package test runs and inspection.
// Purpose: Wire configuration and concrete tools into the test orchestrator.
// Dependencies: clap, pkgcheck-config, pkgcheck-core, pkgcheck-tools, serde_json,
//               thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! `pkgcheck test` resolves the package under test, configures and builds the
//! consumer project with CMake, and runs the test binary when the host can
//! execute it. The process exit status mirrors the test binary. `layout` and
//! `can-run` inspect the computed state without side effects.
//!
//! User-facing output goes through the i18n catalog. Diagnostics go to stderr
//! through `tracing`, filtered by `PKGCHECK_LOG`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use pkgcheck_cli::i18n::Locale;
use pkgcheck_cli::i18n::set_locale;
use pkgcheck_cli::t;
use pkgcheck_config::PkgcheckConfig;
use pkgcheck_core::BaseEnv;
use pkgcheck_core::BuildLayout;
use pkgcheck_core::BuildSettings;
use pkgcheck_core::ExecutionCapability;
use pkgcheck_core::ExecutionContext;
use pkgcheck_core::HostPlatform;
use pkgcheck_core::PackageRef;
use pkgcheck_core::PackageTest;
use pkgcheck_core::TestOutcome;
use pkgcheck_core::TestReport;
use pkgcheck_tools::CMakeTool;
use pkgcheck_tools::LocalRepository;
use pkgcheck_tools::ProcessRunner;
use pkgcheck_tools::TracingObserver;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "PKGCHECK_LANG";
/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "PKGCHECK_LOG";
/// Tracing filter used when `PKGCHECK_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";
/// Environment variable supplying the package under test.
const TESTED_REFERENCE_ENV: &str = "PKGCHECK_TESTED_REFERENCE";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pkgcheck", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `PKGCHECK_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the consumer test project against a package and run it.
    Test(TestCommand),
    /// Print the computed build layout without touching the filesystem.
    Layout(LayoutCommand),
    /// Print whether this host can run binaries for the target settings.
    CanRun(CanRunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Target selection shared by commands that compute settings.
#[derive(Args, Debug, Clone)]
struct TargetArgs {
    /// Optional config file path (defaults to pkgcheck.toml or `PKGCHECK_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Target setting (`key=value`), applied after the config `[settings]`.
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    settings: Vec<String>,
}

/// Arguments for a full package test run.
#[derive(Args, Debug)]
struct TestCommand {
    /// Package reference under test (overrides `PKGCHECK_TESTED_REFERENCE`).
    #[arg(long, value_name = "REF")]
    reference: Option<String>,
    /// Target selection.
    #[command(flatten)]
    target: TargetArgs,
    /// Host platform override (`os=...` or `arch=...`).
    #[arg(long = "host-setting", value_name = "KEY=VALUE")]
    host_settings: Vec<String>,
    /// Output format for the run report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for layout inspection.
#[derive(Args, Debug)]
struct LayoutCommand {
    /// Target selection.
    #[command(flatten)]
    target: TargetArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for the capability check.
#[derive(Args, Debug)]
struct CanRunCommand {
    /// Target selection.
    #[command(flatten)]
    target: TargetArgs,
    /// Host platform override (`os=...` or `arch=...`).
    #[arg(long = "host-setting", value_name = "KEY=VALUE")]
    host_settings: Vec<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to pkgcheck.toml or `PKGCHECK_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a localized message and the exit status to report.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Process exit status.
    code: u8,
}

impl CliError {
    /// Constructs an error that exits with status `1`.
    const fn new(message: String) -> Self {
        Self {
            message,
            code: 1,
        }
    }

    /// Constructs an error that exits with a propagated status.
    const fn with_code(message: String, code: u8) -> Self {
        Self {
            message,
            code,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Test(command) => command_test(&command),
        Commands::Layout(command) => command_layout(&command),
        Commands::CanRun(command) => command_can_run(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Installs the stderr tracing subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Test Command
// ============================================================================

/// Runs the package test and mirrors the binary's exit status.
fn command_test(command: &TestCommand) -> CliResult<ExitCode> {
    let env_reference = std::env::var(TESTED_REFERENCE_ENV).ok();
    let tested = resolve_reference(command.reference.as_deref(), env_reference.as_deref())?;
    let config = load_config(command.target.config.as_deref())?;
    let context = capture_context(&config, &command.target, &command.host_settings)?;
    let plan =
        config.test_plan(tested).map_err(|err| CliError::new(t!("plan.invalid", error = err)))?;

    let repository = LocalRepository::new(config.repository_root());
    let cmake = CMakeTool::new(config.build.cmake.clone())
        .with_generator(config.build.generator.clone())
        .with_jobs(config.build.jobs)
        .with_multi_config(config.layout.multi_config);
    let harness = PackageTest::new(repository, cmake, ProcessRunner).with_observer(TracingObserver);

    match harness.run(&plan, &context) {
        Ok(report) => {
            render_report(&report, command.format)?;
            Ok(ExitCode::from(exit_status_byte(report.exit_code())))
        }
        Err(err) => {
            tracing::error!(stage = err.failed_stage().as_str(), error = %err, "package test failed");
            Err(CliError::with_code(
                t!("test.failed", stage = err.failed_stage(), error = err),
                exit_status_byte(err.exit_code()),
            ))
        }
    }
}

/// Renders the run report.
fn render_report(report: &TestReport, format: OutputFormat) -> CliResult<()> {
    if format == OutputFormat::Json {
        return write_json(report);
    }
    let mut lines = vec![
        t!("test.summary.tested", reference = report.tested),
        t!("test.summary.capability", capability = report.capability.label()),
        t!("test.summary.binary", path = report.binary.display()),
    ];
    lines.push(match report.outcome {
        TestOutcome::Executed {
            exit_code,
        } => t!("test.summary.passed", code = exit_code),
        TestOutcome::Skipped {
            reason,
        } => t!("test.summary.skipped", reason = reason),
    });
    write_stdout_lines(&lines)
}

// ============================================================================
// SECTION: Layout Command
// ============================================================================

/// JSON view of the layout command output.
#[derive(Serialize)]
struct LayoutView<'a> {
    /// Target settings the layout was computed for.
    settings: &'a BuildSettings,
    /// Computed layout.
    layout: &'a BuildLayout,
    /// Expected test binary path.
    binary: &'a Path,
}

/// Prints the computed build layout.
fn command_layout(command: &LayoutCommand) -> CliResult<ExitCode> {
    let config = load_config(command.target.config.as_deref())?;
    let host = HostPlatform::detect();
    let settings = target_settings(&config, &host, &command.target.settings)?;
    let layout = BuildLayout::compute(&config.layout_options(), &settings)
        .map_err(|err| CliError::new(t!("layout.invalid", error = err)))?;
    let binary = layout
        .binary_path(&config.test.binary, &settings)
        .map_err(|err| CliError::new(t!("layout.invalid", error = err)))?;

    if command.format == OutputFormat::Json {
        write_json(&LayoutView {
            settings: &settings,
            layout: &layout,
            binary: &binary,
        })?;
        return Ok(ExitCode::SUCCESS);
    }
    let mut lines = vec![
        t!("layout.source", path = layout.source_dir.display()),
        t!("layout.build", path = layout.build_dir.display()),
        t!("layout.generators", path = layout.generators_dir.display()),
    ];
    lines.extend(layout.bindirs.iter().map(|dir| t!("layout.bindir", path = dir.display())));
    lines.push(t!("layout.binary", path = binary.display()));
    write_stdout_lines(&lines)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Capability Command
// ============================================================================

/// JSON view of the capability command output.
#[derive(Serialize)]
struct CapabilityView<'a> {
    /// Host platform after overrides.
    host: &'a HostPlatform,
    /// Target settings.
    target: &'a BuildSettings,
    /// Capability verdict.
    capability: &'a ExecutionCapability,
    /// Whether the binary would be executed.
    can_execute: bool,
}

/// Prints the capability verdict. Always succeeds once settings are valid.
fn command_can_run(command: &CanRunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.target.config.as_deref())?;
    let context = capture_context(&config, &command.target, &command.host_settings)?;
    let capability = context.capability();

    if command.format == OutputFormat::Json {
        write_json(&CapabilityView {
            host: context.host(),
            target: context.target(),
            capability,
            can_execute: context.can_execute(),
        })?;
        return Ok(ExitCode::SUCCESS);
    }
    let target = format!("{}/{}", context.target().os, context.target().arch);
    let mut lines = vec![t!("can_run.verdict", capability = capability.label())];
    match capability {
        ExecutionCapability::Unavailable {
            reason,
        } => lines.push(t!("can_run.no", target = target, reason = reason)),
        _ => lines.push(t!("can_run.yes", target = target)),
    }
    if let Some(emulator) = capability.emulator() {
        lines.push(t!("can_run.emulator", command = emulator.join(" ")));
    }
    write_stdout_lines(&lines)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.as_deref())?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<PkgcheckConfig> {
    PkgcheckConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Resolves the package under test from the flag or the environment.
fn resolve_reference(flag: Option<&str>, env_value: Option<&str>) -> CliResult<PackageRef> {
    let raw = flag
        .or(env_value)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CliError::new(t!("reference.missing", env = TESTED_REFERENCE_ENV)))?;
    PackageRef::parse(raw)
        .map_err(|err| CliError::new(t!("reference.invalid", value = raw, error = err)))
}

/// Detects the host platform and applies overrides in order.
fn resolve_host(overrides: &[String]) -> CliResult<HostPlatform> {
    let mut host = HostPlatform::detect();
    for assignment in overrides {
        host.apply(assignment).map_err(|err| CliError::new(t!("host.invalid", error = err)))?;
    }
    Ok(host)
}

/// Builds target settings from the host, the config, and CLI assignments.
fn target_settings(
    config: &PkgcheckConfig,
    host: &HostPlatform,
    assignments: &[String],
) -> CliResult<BuildSettings> {
    config
        .build_settings(host, assignments)
        .map_err(|err| CliError::new(t!("settings.invalid", error = err)))
}

/// Captures the execution context for a command.
fn capture_context(
    config: &PkgcheckConfig,
    target: &TargetArgs,
    host_settings: &[String],
) -> CliResult<ExecutionContext> {
    let host = resolve_host(host_settings)?;
    let settings = target_settings(config, &host, &target.settings)?;
    Ok(ExecutionContext::capture(settings, host, &config.execution_overrides(), BaseEnv::capture()))
}

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Maps a propagated exit code onto a process status byte.
///
/// Codes outside `0..=255` report `1`.
fn exit_status_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes several lines to stdout.
fn write_stdout_lines(lines: &[String]) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(&mut stdout, "{line}").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(())
}

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns its exit code.
fn emit_error(err: &CliError) -> ExitCode {
    let _ = write_stderr_line(&err.message);
    ExitCode::from(err.code)
}
