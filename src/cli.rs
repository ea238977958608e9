//! Command-line interpretation for the `xmlview` binary.
//!
//! The first argument decides whether an option was given; clap then parses
//! the normalized argument list and renders the help text. Its built-in help
//! and error exits are disabled: every way an invocation can go wrong maps to
//! its own [`ArgumentError`] and exit code.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use thiserror::Error;
use tracing::{debug, warn};

use crate::renderer::RenderOptions;

const USAGE: &str = "xmlview [-h|--help] | [-i|--ignore_comments] <xmlFile>";
const HELP_OPTIONS: [&str; 2] = ["-h", "--help"];
const IGNORE_COMMENTS_OPTIONS: [&str; 2] = ["-i", "--ignore_comments"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("You have provided an incorrect number of arguments.")]
    WrongArgumentCount,

    #[error("You didn't provide the name of the xml file you want to parse.")]
    MissingFile,

    #[error("You have entered an unknown option: {0}")]
    UnknownOption(String),
}

impl ArgumentError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ArgumentError::WrongArgumentCount => 1,
            ArgumentError::MissingFile => 2,
            ArgumentError::UnknownOption(_) => 3,
        }
    }
}

/// A validated request to render one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub input: PathBuf,
    pub show_comments: bool,
}

impl CliArgs {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new().with_comments(self.show_comments)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Render(CliArgs),
}

pub fn command() -> Command {
    Command::new("xmlview")
        .about("Display a well-formed XML document as colored, indented text")
        .override_usage(USAGE)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .help("Print this help and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore_comments")
                .short('i')
                .long("ignore_comments")
                .help("Do not display comments")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .help("XML file to display")
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
}

/// One-line usage shown after argument errors.
pub fn usage() -> String {
    format!("USAGE: {}", USAGE)
}

/// Full help text for `-h`/`--help`.
pub fn help() -> String {
    let mut cmd = command();
    cmd.render_help().to_string()
}

/// Interpret the process arguments; the first item is the program name.
///
/// Only the first argument is looked at for an option, following the
/// `[-i] <xmlFile>` grammar: `xmlview f.xml -i` renders `f.xml` with
/// comments, and `xmlview -i -h` names a file called `-h`.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, ArgumentError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let (program, given) = match args.split_first() {
        Some((program, given)) if !given.is_empty() && given.len() <= 2 => (program, given),
        _ => return Err(ArgumentError::WrongArgumentCount),
    };
    debug!(count = given.len(), "parsing arguments");

    let first: &str = &given[0].to_string_lossy();
    if HELP_OPTIONS.contains(&first) {
        return Ok(Invocation::Help);
    }
    let ignore_comments = IGNORE_COMMENTS_OPTIONS.contains(&first);
    if ignore_comments && given.len() != 2 {
        return Err(ArgumentError::MissingFile);
    }
    if first.starts_with('-') && !ignore_comments {
        return Err(ArgumentError::UnknownOption(first.to_string()));
    }

    let (file, rest) = if ignore_comments {
        (&given[1], &given[2..])
    } else {
        (&given[0], &given[1..])
    };
    if !rest.is_empty() {
        warn!(ignored = ?rest, "ignoring arguments after the input file");
    }

    // Hand clap the canonical form so a file name starting with '-' stays positional.
    let mut canonical = vec![program.clone()];
    if ignore_comments {
        canonical.push(OsString::from("--ignore_comments"));
    }
    canonical.push(OsString::from("--"));
    canonical.push(file.clone());

    let matches = command().try_get_matches_from(canonical).map_err(|err| {
        debug!(kind = ?err.kind(), "clap rejected arguments");
        ArgumentError::WrongArgumentCount
    })?;

    let show_comments = !matches.get_flag("ignore_comments");
    match matches.get_one::<PathBuf>("input") {
        Some(input) => Ok(Invocation::Render(CliArgs {
            input: input.clone(),
            show_comments,
        })),
        None => Err(ArgumentError::MissingFile),
    }
}
