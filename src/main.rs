//! This crate contains the source code for the binary for the gridway sandbox.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use gridway::App;

fn main() -> Result<()> {
    install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    App::parse().run()?;

    Ok(())
}
