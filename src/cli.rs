use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use declarative::PlatformFamily;

#[derive(Parser)]
#[command(name = "provision")]
#[command(version)]
#[command(about = "Prepare a Linux host for the system-probe test suite", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply the plan to this host
    Apply(ApplyArgs),

    /// Print the plan as resolved for a platform
    Plan(PlanArgs),

    /// Show steps whose state would change
    Diff(TargetArgs),

    /// Print the detected platform and kernel release
    Detect,

    /// Verify the artifact bundle has every file the plan places
    Check(TargetArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where the plan comes from and which platform it resolves for
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Plan file to use instead of the built-in recipe
    #[arg(long, value_name = "FILE")]
    pub plan: Option<String>,

    /// Directory holding the artifacts file steps copy
    #[arg(long, value_name = "DIR")]
    pub files_dir: Option<String>,

    /// Platform family, overriding /etc/os-release
    #[arg(long)]
    pub family: Option<PlatformFamily>,

    /// Platform version, overriding /etc/os-release
    #[arg(long, value_name = "VERSION")]
    pub platform_version: Option<String>,

    /// Kernel release, overriding the running kernel's
    #[arg(long, value_name = "RELEASE")]
    pub kernel_release: Option<String>,

    /// Only steps matching: type, type.name or name (e.g. "packages", "file.tags.txt")
    #[arg(long, value_name = "TARGET")]
    pub only: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Show what would change without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
