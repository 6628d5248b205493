use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Cross-reference navigation for Clojure code, driven by an external
clj-kondo style analyzer.

The analyzer runs as a long-lived server (default 127.0.0.1:7700) or as a
one-shot subprocess, configured in $KONDEX_HOME/config.toml.

POSITIONS:
    Rows and columns are 1-based, as the analyzer reports them.

EXAMPLES:
    kondex lint src/app/core.clj             Findings for one file
    kondex lint                              Findings for the whole project
    kondex at src/app/core.clj 3 10          What is under row 3, col 10
    kondex usages src/app/core.clj 3 10      Definition and all usages
    kondex jump src/app/core.clj 3 10 -n 2   Two occurrences forward
    kondex definition src/app/core.clj 5 2   Where a symbol is defined
    kondex namespaces --json                 Namespace listing as JSON
"#;

/// Cross-reference navigation for Clojure code
#[derive(Parser, Debug)]
#[command(name = "kondex")]
#[command(author, version)]
#[command(about = "Cross-reference navigation for Clojure code")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project root (default: current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Analyzer address, overriding the configuration
    #[arg(long, global = true)]
    pub analyzer: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show analyzer findings for a file, or for the whole project
    #[command(visible_alias = "l")]
    Lint(LintArgs),

    /// Show the symbol at a position
    At(PositionArgs),

    /// List the definition and usages of the symbol at a position
    #[command(visible_alias = "u")]
    Usages(PositionArgs),

    /// Step through occurrences of the symbol at a position
    #[command(visible_alias = "j")]
    Jump(JumpArgs),

    /// Find where the symbol at a position is defined
    #[command(visible_alias = "d")]
    Definition(PositionArgs),

    /// List the namespaces defined in the project
    #[command(visible_alias = "ns")]
    Namespaces,

    /// Show index statistics for the whole project
    Stats,
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    /// File to lint (default: the whole project)
    pub file: Option<PathBuf>,
}

/// A file and a 1-based cursor position in it
#[derive(Args, Debug, Clone)]
pub struct PositionArgs {
    /// Source file, relative to the root or absolute
    pub file: PathBuf,

    /// Row (1-based)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub row: u32,

    /// Column (1-based)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub col: u32,
}

/// Arguments for the jump command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    kondex jump src/app/core.clj 2 9          Next occurrence
    kondex jump src/app/core.clj 2 9 --back   Previous occurrence
    kondex jump src/app/core.clj 2 9 -n 3     Three steps forward

Stepping stops at either end of the occurrence list.")]
pub struct JumpArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Number of steps
    #[arg(short = 'n', long, default_value = "1")]
    pub steps: usize,

    /// Step backwards
    #[arg(short, long)]
    pub back: bool,
}
