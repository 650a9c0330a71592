//! fab CLI binary entry point.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fabrique::cli::{run, RunOptions};
use fabrique_core::Reporter;

/// Evaluate a Fabrique file and emit build files.
#[derive(Parser)]
#[command(name = "fab")]
#[command(version, about, long_about = None)]
struct Cli {
    /// The Fabrique file to evaluate.
    fabfile: PathBuf,

    /// Define an argument: NAME=VALUE (bool, int, or string literal).
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
    define: Vec<String>,

    /// Output directory for generated build files.
    #[arg(short = 'o', long = "output", default_value = ".")]
    output: PathBuf,

    /// Backends to run: make, ninja, dot, null (comma-separated).
    #[arg(long = "format", value_delimiter = ',', default_value = "ninja")]
    format: Vec<String>,

    /// Parse and pretty-print the file, then stop.
    #[arg(long)]
    parse_only: bool,

    /// Dump the evaluated DAG as JSON to stdout.
    #[arg(long)]
    print_dag: bool,

    /// Write backend output to stdout instead of files.
    #[arg(long)]
    stdout: bool,

    /// Colorize pretty-printed output: auto, always, never.
    #[arg(long, default_value = "auto")]
    color: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("FAB_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut defines = Vec::new();
    for define in &cli.define {
        match define.split_once('=') {
            Some((name, value)) => defines.push((name.to_string(), value.to_string())),
            None => {
                eprintln!("error: malformed definition '{define}' (expected NAME=VALUE)");
                return ExitCode::from(2);
            }
        }
    }

    let color = match cli.color.as_str() {
        "always" => true,
        "never" => false,
        "auto" => std::io::stdout().is_terminal(),
        other => {
            eprintln!("error: invalid color mode '{other}' (expected auto, always, never)");
            return ExitCode::from(2);
        }
    };

    let options = RunOptions {
        fabfile: cli.fabfile,
        defines,
        output_dir: cli.output,
        formats: cli.format,
        parse_only: cli.parse_only,
        print_dag: cli.print_dag,
        to_stdout: cli.stdout,
        color,
    };

    let mut reporter = Reporter::new();
    let result = run(&options, &mut reporter);

    for report in reporter.iter() {
        eprintln!("{report}");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !reporter.has_errors() {
                eprintln!("{}", err.to_report());
            }
            ExitCode::from(err.exit_code())
        }
    }
}
