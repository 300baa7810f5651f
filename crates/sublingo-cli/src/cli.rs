use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sublingo")]
#[command(bin_name = "sublingo")]
#[command(version)]
#[command(about = "Terminal client for the sublingo subtitle-translation server")]
pub struct Cli {
    /// Write a diagnostics log for this run
    #[arg(long, global = true)]
    pub diagnostics: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run settings and server checks")]
    Doctor,
}
