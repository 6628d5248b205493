//! Command handlers behind the `kondex` binary
//!
//! Every command runs against one short-lived [`Session`]. Commands that
//! take a file open it as a single buffer and analyze its text through the
//! configured transport before answering.
//!
//! @module commands

mod jump;
mod lint;
mod lookup;
mod project;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::analysis::{BufferId, Position, Span};
use crate::cli::{Cli, Commands, GlobalArgs, PositionArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputFormat;
use crate::session::{Session, Source};
use crate::transport;

/// The one buffer a CLI invocation works on
const BUFFER: BufferId = BufferId(1);

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(&cli.global)?;

    match cli.command {
        Commands::Lint(args) => lint::run(&ctx, args),
        Commands::At(args) => lookup::at(&ctx, args),
        Commands::Usages(args) => lookup::usages(&ctx, args),
        Commands::Definition(args) => lookup::definition(&ctx, args),
        Commands::Jump(args) => jump::run(&ctx, args),
        Commands::Namespaces => project::namespaces(&ctx),
        Commands::Stats => project::stats(&ctx),
    }
}

/// Shared state for one command invocation
pub struct Context {
    pub root: PathBuf,
    pub format: OutputFormat,
    pub session: Session,
}

impl Context {
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let root = match &global.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };

        let mut config = Config::load()?;
        if let Some(address) = &global.analyzer {
            config.analyzer.address = address.clone();
        }
        debug!(mode = ?config.analyzer.mode, address = %config.analyzer.address, "Connecting to analyzer");

        let transport = transport::connect(&config.analyzer)?;
        Ok(Self {
            root,
            format: OutputFormat::from_json_flag(global.json),
            session: Session::new(transport, config.analysis),
        })
    }

    /// Read `file` from disk, open it as the buffer and analyze it
    pub fn load(&self, file: &Path) -> Result<String> {
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.root.join(file)
        };
        let text = std::fs::read_to_string(&path)?;
        let filename = file.to_string_lossy().into_owned();

        self.session.open(BUFFER);
        self.session.analyze(
            BUFFER,
            Source {
                root: &self.root,
                filename: &filename,
                text: &text,
            },
        )?;
        Ok(filename)
    }

    pub fn buffer(&self) -> BufferId {
        BUFFER
    }
}

/// Cursor span for a 1-based row and column
pub(crate) fn cursor(args: &PositionArgs) -> Span {
    Span::point(Position::new(args.row, args.col))
}
