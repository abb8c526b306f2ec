//! Command definitions and dispatch

use crate::report::{describe_outcome, outline, path_listing};
use crate::session::{load_config, load_document, parse_field, submit_form};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pagekit_block::BlockPath;
use pagekit_runtime::{Page, SubmitOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn document_arg() -> Arg {
    Arg::new("document")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Document JSON file")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Page configuration TOML file")
}

/// Command-line interface
#[must_use]
pub fn command() -> Command {
    Command::new("pagekit")
        .version(crate::VERSION)
        .about("Render block documents and run their forms")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs as JSON lines"),
        )
        .subcommand(
            Command::new("render")
                .about("Compile a document against its backend and print the page")
                .arg(document_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the render tree as JSON"),
                ),
        )
        .subcommand(
            Command::new("paths")
                .about("List every block path with its type and references")
                .arg(document_arg()),
        )
        .subcommand(
            Command::new("submit")
                .about("Fill a form and run its mutation")
                .arg(document_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("form")
                        .long("form")
                        .required(true)
                        .value_parser(value_parser!(BlockPath))
                        .help("Block path of the form"),
                )
                .arg(
                    Arg::new("field")
                        .long("field")
                        .short('f')
                        .action(ArgAction::Append)
                        .value_parser(parse_field)
                        .help("Field assignment name=value (repeatable)"),
                ),
        )
}

/// Install the stderr subscriber
///
/// `RUST_LOG` wins unless `verbose` is set.
pub fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("pagekit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagekit=info"))
    };
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Run the parsed command
///
/// # Errors
/// Returns loading, configuration and submission errors
pub async fn run(matches: &ArgMatches) -> Result<ExitCode> {
    match matches.subcommand() {
        Some(("render", args)) => {
            let page = open_page(args)?;
            let nodes = page.render().await;
            page.close();

            if args.get_flag("json") {
                let json = serde_json::to_string_pretty(&nodes).context("could not serialize page")?;
                println!("{json}");
            } else {
                print!("{}", outline(&nodes));
            }
            let failed = nodes.iter().any(|node| !node.errors().is_empty());
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Some(("paths", args)) => {
            let document = load_document(document_path(args)?)?;
            print!("{}", path_listing(&document));
            Ok(ExitCode::SUCCESS)
        }
        Some(("submit", args)) => {
            let page = open_page(args)?;
            let path = args
                .get_one::<BlockPath>("form")
                .context("missing --form")?;
            let fields: Vec<(String, String)> = args
                .get_many::<(String, String)>("field")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();

            let (form, outcome) = submit_form(&page, path, &fields).await?;
            page.close();

            println!("{}", describe_outcome(&form, &outcome));
            Ok(match outcome {
                SubmitOutcome::Succeeded { .. } => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn document_path(args: &ArgMatches) -> Result<&PathBuf> {
    args.get_one::<PathBuf>("document")
        .context("missing document argument")
}

fn open_page(args: &ArgMatches) -> Result<Page> {
    let document = load_document(document_path(args)?)?;
    let config = load_config(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    Page::connect(document, config).context("could not open page")
}
