//! CLI argument definitions for Shiprate.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `carriers` | List carriers that can price shipments |
//! | `rates` | Price a shipment with one carrier |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use canned carrier responses |
//! | `--verbose` | `false` | Log debug events to stderr |
//!
//! # Examples
//!
//! ```bash
//! # Price a shipment described in a file
//! shiprate rates --carrier ups --request shipment.json --pretty
//!
//! # Read the request from stdin without network access
//! cat shipment.json | shiprate rates --request - --mock
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Shiprate - carrier-neutral shipping rate CLI
///
/// Credentials are read from `SHIPRATE_UPS_*` / `UPS_*` environment
/// variables, optionally loaded from a `.env` file.
#[derive(Debug, Parser)]
#[command(
    name = "shiprate",
    author,
    version,
    about = "Carrier-neutral shipping rate CLI"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve canned token and rate responses instead of calling the carrier.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Log debug events to stderr (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List carrier ids that support rating.
    ///
    /// # Examples
    ///
    ///   shiprate carriers
    Carriers,

    /// Price a shipment with one carrier.
    ///
    /// The request is carrier-neutral JSON with `origin`, `destination`,
    /// `packages` and an optional `serviceCode`.
    ///
    /// # Examples
    ///
    ///   shiprate rates --request shipment.json
    ///   shiprate rates --carrier ups --request - --pretty
    Rates(RatesArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RatesArgs {
    /// Carrier id to price with.
    #[arg(long, default_value = "ups")]
    pub carrier: String,

    /// Path to the request JSON, or `-` for stdin.
    #[arg(long)]
    pub request: PathBuf,
}
