pub mod error;
pub mod harvest;
pub mod importer;
pub mod model;
pub mod registration;
pub mod writer;

use colored::Colorize;

pub use error::{CoreError, ValidationError};
pub use model::{Category, Snapshot, Tool};

pub fn print_banner() {
    println!(
        "{} {}",
        "privharvest".bright_green().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "privacy tool directory harvester".bright_black());
    println!();
}
