//! Request/response transport to the external analyzer

mod client;
mod oneshot;
mod protocol;

pub use client::{Address, AnalyzerClient};
pub use oneshot::OneShotAnalyzer;
pub use protocol::{Request, Response, TERMINATOR};

use std::path::Path;

use crate::analysis::AnalysisResult;
use crate::config::{AnalyzerConfig, AnalyzerMode};
use crate::error::Result;

/// Something that answers analyzer requests, one at a time.
///
/// Implementations surface every failure to the caller and never retry.
pub trait Transport: Send + Sync {
    fn request(&self, request: &Request) -> Result<Response>;

    fn diagnostics(&self, root: &Path) -> Result<AnalysisResult> {
        self.request(&Request::diagnostics(root))
            .map(Response::into_result)
    }

    fn analyze_paths(&self, root: &Path) -> Result<AnalysisResult> {
        self.request(&Request::analyze_paths(root))
            .map(Response::into_result)
    }

    fn analyze_text(&self, root: &Path, filename: &str, text: &str) -> Result<AnalysisResult> {
        self.request(&Request::analyze_text(root, filename, text))
            .map(Response::into_result)
    }

    fn namespace_definitions(&self, root: &Path) -> Result<AnalysisResult> {
        self.request(&Request::namespace_definitions(root))
            .map(Response::into_result)
    }

    fn find_definitions(
        &self,
        root: &Path,
        filename: &str,
        row: u32,
        col: u32,
    ) -> Result<AnalysisResult> {
        self.request(&Request::find_definitions(root, filename, row, col))
            .map(Response::into_result)
    }
}

/// Open the transport the configuration asks for
pub fn connect(config: &AnalyzerConfig) -> Result<Box<dyn Transport>> {
    match config.mode {
        AnalyzerMode::Socket => {
            let client = AnalyzerClient::connect(Address::parse(&config.address))?;
            Ok(Box::new(client))
        }
        AnalyzerMode::Subprocess => Ok(Box::new(OneShotAnalyzer::from_argv(&config.command)?)),
    }
}
