use colored::Colorize;
use privharvest::command_argument_builder;
use privharvest::handlers::{handle_import, handle_register, handle_scrape, init_logging, log_level};
use privharvest_core::print_banner;

#[tokio::main]
async fn main() {
    let mut cmd = command_argument_builder();
    let chosen_command = cmd.get_matches_mut();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, show the banner and usage
        let _ = cmd.print_help();
        return;
    }

    init_logging(log_level(quiet, verbose));

    let outcome = match chosen_command.subcommand() {
        Some(("scrape", primary_command)) => handle_scrape(primary_command, quiet).await.map(|_| ()),
        Some(("import", primary_command)) => handle_import(primary_command, quiet).await.map(|_| ()),
        Some(("register", primary_command)) => handle_register(primary_command).map(|_| ()),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
