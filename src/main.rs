//! @ai:module:intent CLI for the stage timing profiler
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stagebench::{
    cases::{CaseLoader, CaseLoaderTrait},
    config::ProfilerConfig,
    report::ReportGenerator,
    runner::{MockToolRunner, ProcessRunner, RunOutput, StageProfiler, ToolRunnerTrait},
    timing::ProfileResults,
    toolchain::ToolchainValidator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG: &str = "stagebench.toml";

#[derive(Parser)]
#[command(name = "stagebench")]
#[command(about = "Average per-stage timings reported by an external compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile the configured cases
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cases to profile (comma-separated), replacing the configured list
        #[arg(long)]
        cases: Option<String>,

        /// Number of runs per case
        #[arg(short, long)]
        repetitions: Option<u32>,

        /// Replay synthetic output instead of launching the tool
        #[arg(long)]
        dry_run: bool,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only print results to the console
        #[arg(long)]
        no_reports: bool,
    },

    /// List the cases that would be profiled
    List {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check that the configured tool can be launched
    Check {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Regenerate Markdown and charts from a results file
    Report {
        /// Path to results JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Output directory for reports (defaults to the results file's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stagebench=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            cases,
            repetitions,
            dry_run,
            output,
            no_reports,
        } => run_profile(RunArgs {
            config,
            cases,
            repetitions,
            dry_run,
            output,
            no_reports,
        }),
        Commands::List { config } => list_cases(config),
        Commands::Check { config } => check_tool(config),
        Commands::Report { results, output } => generate_reports(results, output),
        Commands::Init { output } => init_config(output),
    }
}

struct RunArgs {
    config: Option<PathBuf>,
    cases: Option<String>,
    repetitions: Option<u32>,
    dry_run: bool,
    output: Option<PathBuf>,
    no_reports: bool,
}

/// @ai:intent Profile all cases and report the per-stage means
/// @ai:effects io, fs:write
fn run_profile(args: RunArgs) -> Result<()> {
    let mut config = load_or_default_config(args.config)?;

    if let Some(cases) = args.cases {
        config.run.cases = parse_list(&cases).into_iter().map(PathBuf::from).collect();
        config.run.cases_dir = None;
    }

    if let Some(repetitions) = args.repetitions {
        config.run.repetitions = repetitions;
    }

    if let Some(output) = args.output {
        config.paths.results_dir = output;
    }

    config.run.dry_run |= args.dry_run;
    config.validate()?;

    let loader = if config.run.dry_run {
        CaseLoader::lenient()
    } else {
        CaseLoader::new()
    };
    let cases = loader.load(&config.run)?;

    if cases.is_empty() {
        tracing::warn!("No cases to profile");
        return Ok(());
    }

    tracing::info!("Found {} cases to profile", cases.len());

    let results = if config.run.dry_run {
        tracing::info!("Running in dry-run mode");
        let runner = Arc::new(dry_run_runner(&config, cases.len()));
        profile(runner, &config, &cases)?
    } else {
        let status = ToolchainValidator::validate(&config.tool);
        ToolchainValidator::log_status(&status);

        if !status.available {
            anyhow::bail!(
                "Cannot launch '{}'. {}",
                status.program,
                status.install_hint
            );
        }

        let runner = Arc::new(ProcessRunner::new(config.tool.clone()));
        profile(runner, &config, &cases)?
    };

    print_summary(&results);

    if !args.no_reports {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        let output_dir = config.paths.results_dir.join(timestamp.to_string());
        ReportGenerator::new().generate_all(&results, &output_dir)?;
    }

    Ok(())
}

/// @ai:intent Run the profiler over the cases with the given runner
/// @ai:effects io
fn profile<R: ToolRunnerTrait>(
    runner: Arc<R>,
    config: &ProfilerConfig,
    cases: &[PathBuf],
) -> Result<ProfileResults> {
    let profiler = StageProfiler::from_config(runner, config)?;
    let results = profiler
        .profile_all(cases, &config.tool.command_line())
        .context("Profiling aborted")?;
    Ok(results)
}

/// @ai:intent Build a mock runner that reports every configured stage on every run
/// @ai:effects pure
fn dry_run_runner(config: &ProfilerConfig, case_count: usize) -> MockToolRunner {
    let stdout: String = config
        .stages
        .names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}: {}ms\n", name, (i + 1) as f64 * 1.5))
        .collect();

    let runs = case_count * config.run.repetitions as usize;
    MockToolRunner::repeating(RunOutput::success(stdout), runs)
}

/// @ai:intent List resolved cases
/// @ai:effects fs:read
fn list_cases(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let cases = CaseLoader::lenient().load(&config.run)?;

    println!("\nCases ({}):\n", cases.len());

    for case in &cases {
        let marker = if case.is_file() { " " } else { "!" };
        println!("  {} {}", marker, case.display());
    }

    println!(
        "\nEach case runs {} times: {} {}",
        config.run.repetitions,
        config.tool.command_line(),
        config.tool.input_arg
    );
    Ok(())
}

/// @ai:intent Probe the configured tool
/// @ai:effects io
fn check_tool(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let status = ToolchainValidator::validate(&config.tool);

    if status.available {
        println!(
            "✓ {} {}",
            status.program,
            status.version.as_deref().unwrap_or_default()
        );
        Ok(())
    } else {
        anyhow::bail!("{} not available. {}", status.program, status.install_hint)
    }
}

/// @ai:intent Regenerate Markdown and charts from saved results
/// @ai:effects fs:read, fs:write
fn generate_reports(results_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let results = ProfileResults::load(&results_path)
        .with_context(|| format!("Failed to load results from {}", results_path.display()))?;

    let output_dir = output.unwrap_or_else(|| {
        results_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    ReportGenerator::new().generate_derived(&results, &output_dir)?;
    tracing::info!("Reports written to {}", output_dir.display());
    Ok(())
}

/// @ai:intent Write default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    ProfilerConfig::default().save(&output)?;
    tracing::info!("Configuration written to {}", output.display());
    Ok(())
}

/// @ai:intent Load config from path, the default file if present, or defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<ProfilerConfig> {
    match path {
        Some(p) => ProfilerConfig::load(&p),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG);

            if default_path.exists() {
                ProfilerConfig::load(default_path)
            } else {
                Ok(ProfilerConfig::default())
            }
        }
    }
}

/// @ai:intent Split a comma-separated list
/// @ai:effects pure
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// @ai:intent Print per-case stage means in declaration order
/// @ai:effects io
fn print_summary(results: &ProfileResults) {
    println!();

    for case in &results.cases {
        println!("{}: {}", case.case.display(), case);
    }

    println!();
}
