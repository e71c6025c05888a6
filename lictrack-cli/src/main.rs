//! Licence tracker command-line tool.
//!
//! Usage:
//!   lictrack --db inventory.db add --name Office --vendor Microsoft --version 2021
//!   lictrack --db inventory.db alerts
//!
//! When the database cannot be reached every command runs against the
//! local cache; `lictrack sync` pushes the offline changes once it is back.

use anyhow::Result;
use clap::Parser;
use lictrack_cli::{App, Args};
use lictrack_types::SystemClock;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let app = App::open(&args, SystemClock).await?;
    let output = app.execute(args.command).await?;
    print!("{output}");

    if app.is_offline() {
        eprintln!("note: database unavailable, working from the local cache");
    }
    Ok(())
}
