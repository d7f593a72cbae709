//! CLI module for the subscription billing service
//!
//! Subcommands:
//! - `serve`: run the HTTP API (default)
//! - `migrate`: apply or revert PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Subscription Billing - track subscriptions and aggregate billing-period costs
#[derive(Parser, Debug)]
#[command(name = "subscription-billing")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage database schema migrations
    Migrate(migrate::MigrateArgs),
}
