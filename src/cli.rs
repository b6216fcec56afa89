use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use drivefind::Platform;

#[derive(Parser)]
#[command(name = "cirrus")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Find iCloud Drive storage locations and copy files into them", long_about = None)]
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
    /// Discover iCloud Drive locations on this machine
    Find(FindArgs),

    /// Plan a copy without touching anything
    Analyze(AnalyzeArgs),

    /// Copy files into the best discovered location
    Copy(CopyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct FindArgs {
    /// Only show locations matching this app name (fuzzy)
    #[arg(short, long)]
    pub app: Option<String>,

    /// Drop locations scoring below this
    #[arg(short, long)]
    pub min_score: Option<i32>,

    /// Include locations that exist but cannot be read
    #[arg(long)]
    pub include_inaccessible: bool,

    /// Probe as a specific platform instead of auto-detecting
    #[arg(long, value_enum)]
    pub platform: Option<PlatformArg>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// File or directory to copy from
    pub source: String,

    /// Pick the destination by app name (fuzzy)
    #[arg(short, long)]
    pub app: Option<String>,

    /// Glob matched against file names (e.g. "*.txt")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Parser)]
pub struct CopyArgs {
    /// File or directory to copy from
    pub source: String,

    /// Pick the destination by app name (fuzzy)
    #[arg(short, long)]
    pub app: Option<String>,

    /// Glob matched against file names (e.g. "*.txt")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Replace files that already exist at the destination
    #[arg(long)]
    pub overwrite: bool,

    /// Show what would be copied without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PlatformArg {
    Macos,
    Windows,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Macos => Platform::MacOs,
            PlatformArg::Windows => Platform::Windows,
        }
    }
}
