//! tinct - CSS linter
//!
//! Usage: tinct [OPTIONS] <FILES>...

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::Serialize;

use tinct_lint::{lint_source, Config, Diagnostic, LintError, LintReport, Linter, RuleRegistry, DEFAULT_CONFIG_FILE};

const HUE_RULE: &str = "hue-degree-notation";

/// Exit code for configuration, IO and parse failures
const EXIT_TROUBLE: u8 = 2;

/// tinct - lint and fix CSS color notation
#[derive(Parser, Debug)]
#[command(name = "tinct")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Stylesheets to lint; `-` reads from stdin
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to a JSON configuration file [default: .tinctrc.json when present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set the hue-degree-notation policy, overriding the configuration
    #[arg(long, value_enum)]
    hue: Option<HueArg>,

    /// Fix problems in place (stdin input is printed fixed to stdout)
    #[arg(long)]
    fix: bool,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HueArg {
    Angle,
    Number,
}

impl HueArg {
    fn as_str(self) -> &'static str {
        match self {
            HueArg::Angle => "angle",
            HueArg::Number => "number",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Diagnostics of one input, as emitted by `--format json`
#[derive(Serialize)]
struct FileReport<'a> {
    path: String,
    diagnostics: &'a [Diagnostic],
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "info" } else { "warn" }),
    )
    .format_timestamp(None)
    .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_TROUBLE)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let linter = Linter::new(&config, &RuleRegistry::builtin()).context("Invalid configuration")?;
    if linter.is_empty() {
        warn!("No rules enabled; enable one in {} or pass --hue", DEFAULT_CONFIG_FILE);
    }

    // Fixed stdin goes to stdout, so reports move to stderr
    let fixing_stdin = cli.fix && cli.files.iter().any(|f| is_stdin(f));

    let mut troubled = false;
    let mut errors = 0;
    let mut warnings = 0;
    let mut reports = Vec::new();

    for path in &cli.files {
        let name = display_name(path);

        let source = match read_input(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{}: {:#}", name, e);
                troubled = true;
                continue;
            }
        };

        let report = match lint_source(&source, &linter, cli.fix) {
            Ok(report) => report,
            Err(LintError::Css(e)) => {
                eprintln!("{}: {}", name, e);
                troubled = true;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to lint {}", name)),
        };

        if cli.fix {
            write_output(path, &source, &report)?;
        }

        errors += report.error_count();
        warnings += report.warning_count();
        reports.push((name, report));
    }

    let mut out: Box<dyn Write> = if fixing_stdin {
        Box::new(io::stderr().lock())
    } else {
        Box::new(io::stdout().lock())
    };

    match cli.format {
        Format::Text => print_text(&mut out, &reports, errors, warnings)?,
        Format::Json => {
            let files: Vec<FileReport<'_>> = reports
                .iter()
                .map(|(path, report)| FileReport {
                    path: path.clone(),
                    diagnostics: &report.diagnostics,
                })
                .collect();
            serde_json::to_writer_pretty(&mut out, &files)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    info!(
        "{} file(s) linted: {} error(s), {} warning(s)",
        reports.len(),
        errors,
        warnings
    );

    Ok(if troubled {
        ExitCode::from(EXIT_TROUBLE)
    } else if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Resolve the configuration: explicit path, then the default file, then empty.
/// `--hue` is applied on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Config::from_path(Path::new(DEFAULT_CONFIG_FILE))?,
        None => Config::new(),
    };

    if let Some(hue) = cli.hue {
        config.set_rule(HUE_RULE, hue.as_str());
    }

    Ok(config)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn display_name(path: &Path) -> String {
    if is_stdin(path) {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        Ok(source)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Write fixes back: files only when changed, stdin always echoed
fn write_output(path: &Path, source: &str, report: &LintReport) -> Result<()> {
    if is_stdin(path) {
        let css = report.output.as_deref().unwrap_or(source);
        let mut stdout = io::stdout().lock();
        stdout.write_all(css.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    if let Some(css) = &report.output {
        fs::write(path, css).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Fixed {}", path.display());
    }
    Ok(())
}

fn print_text(out: &mut dyn Write, reports: &[(String, LintReport)], errors: usize, warnings: usize) -> Result<()> {
    for (path, report) in reports {
        if report.diagnostics.is_empty() {
            continue;
        }
        writeln!(out, "{}", path)?;
        for diagnostic in &report.diagnostics {
            writeln!(out, "  {}", diagnostic)?;
        }
        writeln!(out)?;
    }

    let problems = errors + warnings;
    if problems > 0 {
        writeln!(
            out,
            "{} problem{} ({} error{}, {} warning{})",
            problems,
            plural(problems),
            errors,
            plural(errors),
            warnings,
            plural(warnings)
        )?;
    }
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
