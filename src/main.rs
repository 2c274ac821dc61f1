//! Pagewright - assemble static pages from blueprints and reusable components.

mod assets;
mod blueprint;
mod build;
mod cli;
mod component;
mod config;
mod logger;
mod storage;
mod template;
mod utils;

use build::build_site;
use clap::Parser;
use cli::Cli;
use config::SiteConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::set_quiet(cli.quiet);

    match SiteConfig::load(&cli).and_then(|config| build_site(&config)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log!("error"; "building site: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
