use std::fs;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use xmlview::cli::{self, ArgumentError, CliArgs, Invocation};
use xmlview::error::exit_code;
use xmlview::{decode_document, render_document, StyleTable};

fn main() -> ExitCode {
    init_tracing();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<ArgumentError>().is_some() {
                eprintln!("\n{}\n\n{}\n", err, cli::usage());
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn try_main() -> Result<()> {
    match cli::parse_args(std::env::args_os())? {
        Invocation::Help => {
            print!("{}", cli::help());
            Ok(())
        }
        Invocation::Render(args) => run(&args),
    }
}

fn run(args: &CliArgs) -> Result<()> {
    debug!(input = %args.input.display(), show_comments = args.show_comments, "rendering document");
    let path = args.input.display();

    let bytes = fs::read(&args.input).with_context(|| format!("Problem reading {}", path))?;
    let document = decode_document(bytes).with_context(|| format!("Failed to decode {}", path))?;

    let stdout = io::stdout();
    render_document(
        &document,
        BufWriter::new(stdout.lock()),
        StyleTable::ansi(),
        args.render_options(),
    )
    .with_context(|| format!("Failed to render {}", path))?;
    Ok(())
}
