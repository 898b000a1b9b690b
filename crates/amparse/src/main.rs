#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod error;
mod extract;
mod lines;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract European Parliament committee amendments from PDF into structured JSON"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Parse an amendments PDF into a JSON file
    Extract(crate::extract::App),

    /// Dump the assembled logical lines (layout-threshold debugging)
    Lines(crate::lines::App),
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Extract(sub_app) => crate::extract::run(sub_app),
        SubCommands::Lines(sub_app) => crate::lines::run(sub_app),
    }
}
