mod config;
mod importer;
mod logs;
mod message;
mod pimcore;
mod storefront;

use anyhow::{Context, Result};
use clap::Parser;
use config::Args;
use std::path::Path;

#[tokio::main]
async fn main() {
    env_logger::init();

    check_user_os();
    show_welcome_message();

    if let Err(e) = run().await {
        let rendered = format!("{:#}", e);
        message::error(&[rendered.as_str()]);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let pimcore_url = config::validated_url(&args.pimcore_url)?;
    let api = pimcore::ApiClient::new(pimcore_url, args.api_key.clone());

    let collected = config::collect(&args, &api)
        .await
        .context("There was an error importing data from Pimcore")?;

    let cwd = std::env::current_dir()?;
    let log_sinks = logs::bootstrap(&cwd);

    storefront::create_config(
        Path::new(storefront::SOURCE_CONFIG_FILE),
        Path::new(storefront::TARGET_CONFIG_FILE),
        &collected.config,
        &collected.classes,
    )?;

    importer::Importer::new().run_all(&log_sinks).await?;

    show_goodbye_message();
    Ok(())
}

/// Advisory only: the importer tooling is developed against Linux and
/// macOS, but the run is not aborted here.
fn check_user_os() {
    if cfg!(windows) {
        message::error(&[
            "Unfortunately currently only Linux and OSX are supported.",
            "Please follow the manual installation guide in the documentation.",
        ]);
    }
}

fn show_welcome_message() {
    message::greeting(&[
        "Hi, welcome to the Pimcore storefront setup.",
        "Let's configure it together :)",
    ]);
}

fn show_goodbye_message() {
    message::greeting(&[
        "Congratulations!",
        "",
        "You've just configured the Pimcore -> storefront integration.",
        "",
        "Good Luck!",
    ]);
}
