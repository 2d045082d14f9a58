use crate::CLAP_STYLING;
use clap::{arg, command};
use privharvest_core::harvest::DEFAULT_SEED_URL;
use privharvest_core::importer::{STORE_KEY_ENV, STORE_URL_ENV};
use privharvest_core::writer::DEFAULT_OUTPUT_FILE;
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("privharvest")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("privharvest")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log request-level detail")
                .required(false)
                .conflicts_with("quiet"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("scrape")
                .about(
                    "Scrape the privacy tool directory into a JSON snapshot of categories \
                and tools.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Base address of the directory site")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_SEED_URL),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the snapshot (overwritten if present)")
                        .default_value(DEFAULT_OUTPUT_FILE),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Do not show the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("import")
                .about("Import a snapshot into the hosted store, categories first, then tools.")
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(false)
                        .help("Snapshot file produced by `scrape`")
                        .default_value(DEFAULT_OUTPUT_FILE),
                )
                .arg(
                    arg!(--"store-url" <URL>)
                        .required(false)
                        .help("Base URL of the store")
                        .env(STORE_URL_ENV),
                )
                .arg(
                    arg!(--"store-key" <KEY>)
                        .required(false)
                        .help("Access key for the store")
                        .env(STORE_KEY_ENV)
                        .hide_env_values(true),
                ),
        )
        .subcommand(
            command!("register")
                .about(
                    "Interactively collect phone numbers and an email for the do-not-call \
                registry and save them to a timestamped file.",
                )
                .arg(
                    arg!(-d --"dir" <PATH>)
                        .required(false)
                        .help("Directory to save the registration file in")
                        .default_value("."),
                ),
        )
}
