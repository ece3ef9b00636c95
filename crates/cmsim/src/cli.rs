//! Clap derive structures for the `cmsim` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cmsim -- browse and administer a cm-simulator backend
#[derive(Debug, Parser)]
#[command(
    name = "cmsim",
    version,
    about = "Browse cm-simulator instances, devices and stations",
    long_about = "Command-line console for a cm-simulator backend.\n\n\
        Lists and filters simulator instances, pages through the boards\n\
        and terminal stations attached to them, and edits instances.",
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
    /// Simulator profile to use
    #[arg(long, short = 'p', env = "CMSIM_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 'b', env = "CMSIM_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CMSIM_OUTPUT",
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

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CMSIM_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CMSIM_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Rows per page (overrides profile)
    #[arg(long, env = "CMSIM_PAGE_SIZE", global = true)]
    pub page_size: Option<u32>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// List, page, inspect and edit simulator instances
    #[command(alias = "inst", alias = "i")]
    Instances(InstancesArgs),

    /// Page through master-station boards
    #[command(alias = "dev", alias = "d")]
    Devices(DependentArgs),

    /// Page through remote terminal stations
    #[command(alias = "st", alias = "s")]
    Stations(DependentArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INSTANCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InstancesArgs {
    #[command(subcommand)]
    pub command: InstancesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InstancesCommand {
    /// List every instance, optionally filtered by IP
    #[command(alias = "ls")]
    List {
        /// Case-insensitive substring of the instance IP
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },

    /// Show one page of the instance table
    Page {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show a single instance
    Get {
        /// Instance id
        id: i64,
    },

    /// Create an instance
    Add {
        /// HTTP address of the simulator instance
        #[arg(long)]
        ip: String,

        /// HTTP port
        #[arg(long, default_value = "80")]
        port: u16,

        /// Create the instance disabled
        #[arg(long)]
        disabled: bool,

        /// Free-form note
        #[arg(long)]
        remark: Option<String>,
    },

    /// Update an instance; unspecified fields are kept
    Edit {
        /// Instance id
        id: i64,

        /// New HTTP address
        #[arg(long)]
        ip: Option<String>,

        /// New HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Enable the instance
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Disable the instance
        #[arg(long)]
        disable: bool,

        /// New note (empty string clears it)
        #[arg(long)]
        remark: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES / STATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DependentArgs {
    #[command(subcommand)]
    pub command: DependentCommand,
}

#[derive(Debug, Subcommand)]
pub enum DependentCommand {
    /// Show one page, optionally for a single instance
    #[command(alias = "ls")]
    List(DependentListArgs),
}

#[derive(Debug, Args)]
pub struct DependentListArgs {
    /// Only rows owned by this instance id
    #[arg(long, short = 'i', conflicts_with = "instance_ip")]
    pub instance: Option<i64>,

    /// Only rows owned by the instance whose IP matches this text
    #[arg(long)]
    pub instance_ip: Option<String>,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the current configuration
    Show,

    /// Write a profile to the config file
    Init {
        /// API root URL for the profile
        #[arg(long)]
        base_url: String,

        /// Overwrite the profile if it already exists
        #[arg(long)]
        force: bool,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
