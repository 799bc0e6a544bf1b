//! Clap derive structures for the `satvox` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// satvox -- voice-command vocabularies for satellite recognizers
#[derive(Debug, Parser)]
#[command(
    name = "satvox",
    version,
    about = "Generate and publish voice-command vocabularies to satellites",
    long_about = "Expands light entities into spoken command phrases, encodes each \
        phrase in the satellites' reduced phonetic alphabet, and publishes the \
        per-site vocabularies over MQTT.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (default: ./sites.yaml, then the user config dir)
    #[arg(long, short = 'c', env = "SATVOX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SATVOX_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, env = "SATVOX_LOG_JSON", global = true)]
    pub log_json: bool,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, tab-separated (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build every site's vocabulary and publish it to the broker
    #[command(alias = "pub")]
    Publish(PublishArgs),

    /// Build and validate vocabularies without contacting the broker
    #[command(alias = "p")]
    Preview(PreviewArgs),

    /// Fetch and show the remote intent sentences and expansion rules
    Intents,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Clear each satellite's commands before publishing
    #[arg(long)]
    pub reset: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Only show this site
    #[arg(long, short = 's')]
    pub site: Option<String>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
