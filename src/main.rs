#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod fmt;
mod prelude;
mod quantity;
mod settings;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, compare, emissions, forecast, scenario, stats},
    prelude::*,
    settings::Settings,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let settings = Settings::read_from(&args.settings_path)?;
    let api = args.api.new_client(&settings)?;

    match args.command {
        Command::Compare(args) => compare(&args, &api, &settings).await?,
        Command::Scenario(args) => scenario(&args, &api, &settings).await?,
        Command::Stats(args) => stats(&args, &api, &settings).await?,
        Command::Emissions(args) => emissions(&args, &api, &settings).await?,
        Command::Forecast(args) => forecast(&args, &api, &settings).await?,
    }

    info!("done!");
    Ok(())
}
