use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use error_set::error_set;
use fixer_lint::{
    DEFAULT_CODE, DiffFormat, Finding, FindingEngine, FixerReport, FixerVersion, ReportError,
    VersionError,
};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "fixer-lint")]
#[command(about = "Turn php-cs-fixer diffs into located lint findings")]
struct Cli {
    /// Enable verbose (info-level) logging to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Enable debug-level logging to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the changes of a fixer JSON report (`--format=json --diff`)
    Locate(LocateArgs),
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
    /// Print the man page
    Man,
}

#[derive(Parser, Debug)]
struct LocateArgs {
    /// Report file, or "-" for stdin
    #[arg(default_value = "-")]
    report: PathBuf,

    /// Directory the report's file names are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Fixer version or `--version` banner (e.g. "2.19.3")
    #[arg(long, conflicts_with = "format")]
    fixer_version: Option<String>,

    /// Diff format, overriding version detection
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Code reported with every finding
    #[arg(long, default_value = DEFAULT_CODE)]
    code: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    /// Hunks with `@@ -a,b +c,d @@` headers (fixer 2.8 to 2.x)
    Numbered,
    /// Bare `@@ @@` separators
    Unnumbered,
}

impl From<FormatArg> for DiffFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Numbered => DiffFormat::Numbered,
            FormatArg::Unnumbered => DiffFormat::Unnumbered,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

error_set! {
    /// Top-level error for fixer-lint runs
    CliError := {
        #[display("Failed to read report {path}: {message}")]
        ReportUnreadable { path: String, message: String },
        #[display("{failed} record(s) could not be located")]
        RecordsFailed { failed: usize },
        #[display("Failed to write output: {message}")]
        Output { message: String },
        ReportError(ReportError),
        VersionError(VersionError),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let result = match cli.command {
        Commands::Locate(args) => cmd_locate(&args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "fixer-lint", &mut io::stdout());
            Ok(())
        }
        Commands::Man => clap_mangen::Man::new(Cli::command())
            .render(&mut io::stdout())
            .map_err(|e| CliError::Output {
                message: e.to_string(),
            }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn cmd_locate(args: &LocateArgs) -> Result<(), CliError> {
    let report = FixerReport::from_json(&read_report(&args.report)?)?;
    let engine = engine_for(args)?;
    info!(records = report.files.len(), locator = ?engine.locator(), "Locating report");

    let mut findings: Vec<Finding> = Vec::new();
    let mut failed = 0;

    for record in &report.files {
        let path = args.root.join(&record.file_path);
        match engine.findings_for_path(record, &path) {
            Ok(found) => findings.extend(found),
            Err(e) => {
                error!(path = %record.file_path, "{e}");
                failed += 1;
            }
        }
    }

    write_findings(&findings, args.output)?;

    if failed > 0 {
        return Err(CliError::RecordsFailed { failed });
    }
    Ok(())
}

fn engine_for(args: &LocateArgs) -> Result<FindingEngine, CliError> {
    let engine = match (args.format, &args.fixer_version) {
        (Some(format), _) => FindingEngine::new(format.into()),
        (None, Some(version)) => FindingEngine::for_fixer_version(Some(version.parse::<FixerVersion>()?)),
        (None, None) => FindingEngine::for_fixer_version(None),
    };
    Ok(engine.with_code(args.code.as_str()))
}

fn read_report(path: &Path) -> Result<String, CliError> {
    let unreadable = |e: io::Error| CliError::ReportUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(unreadable)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(unreadable)
    }
}

fn write_findings(findings: &[Finding], output: OutputFormat) -> Result<(), CliError> {
    let failed_write = |message: String| CliError::Output { message };
    let mut stdout = io::stdout().lock();

    match output {
        OutputFormat::Text => {
            for finding in findings {
                write!(stdout, "{finding}").map_err(|e| failed_write(e.to_string()))?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(findings).map_err(|e| failed_write(e.to_string()))?;
            writeln!(stdout, "{json}").map_err(|e| failed_write(e.to_string()))?;
        }
    }

    stdout.flush().map_err(|e| failed_write(e.to_string()))
}
