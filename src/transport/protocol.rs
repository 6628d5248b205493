//! Analyzer wire protocol
//!
//! One JSON object per line in each direction. Requests carry their
//! operation in an `op` field; buffer text is base64-encoded so the line
//! can never contain a raw newline.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::{AnalysisResult, Finding, RawAnalysis};
use crate::error::{Error, Result};

/// Line terminator for both requests and responses
pub const TERMINATOR: u8 = b'\n';

/// Request sent to the analyzer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op")]
pub enum Request {
    /// Analysis and findings for a whole project root
    #[serde(rename = "v1/diagnostics", rename_all = "kebab-case")]
    Diagnostics { root_path: PathBuf },
    /// Path-based analysis of a project root
    #[serde(rename = "v1/analyze_paths", rename_all = "kebab-case")]
    AnalyzePaths { root_path: PathBuf },
    /// Analyze unsaved buffer text
    #[serde(rename = "v1/analyze_text", rename_all = "kebab-case")]
    AnalyzeText {
        root_path: PathBuf,
        /// Base64 of the UTF-8 buffer text
        text: String,
        filename: String,
    },
    /// Namespace definition index for a project
    #[serde(rename = "v1/namespace_definitions", rename_all = "kebab-case")]
    NamespaceDefinitions { root_path: PathBuf },
    /// Server-side resolution of whatever is at a position
    #[serde(rename = "v1/find_definitions", rename_all = "kebab-case")]
    FindDefinitions {
        root_path: PathBuf,
        filename: String,
        row: u32,
        col: u32,
    },
}

impl Request {
    pub fn diagnostics(root: &Path) -> Self {
        Request::Diagnostics {
            root_path: root.to_path_buf(),
        }
    }

    pub fn analyze_paths(root: &Path) -> Self {
        Request::AnalyzePaths {
            root_path: root.to_path_buf(),
        }
    }

    pub fn analyze_text(root: &Path, filename: &str, text: &str) -> Self {
        Request::AnalyzeText {
            root_path: root.to_path_buf(),
            text: STANDARD.encode(text.as_bytes()),
            filename: filename.to_string(),
        }
    }

    pub fn namespace_definitions(root: &Path) -> Self {
        Request::NamespaceDefinitions {
            root_path: root.to_path_buf(),
        }
    }

    pub fn find_definitions(root: &Path, filename: &str, row: u32, col: u32) -> Self {
        Request::FindDefinitions {
            root_path: root.to_path_buf(),
            filename: filename.to_string(),
            row,
            col,
        }
    }

    /// The `op` string this request is sent with
    pub fn op(&self) -> &'static str {
        match self {
            Request::Diagnostics { .. } => "v1/diagnostics",
            Request::AnalyzePaths { .. } => "v1/analyze_paths",
            Request::AnalyzeText { .. } => "v1/analyze_text",
            Request::NamespaceDefinitions { .. } => "v1/namespace_definitions",
            Request::FindDefinitions { .. } => "v1/find_definitions",
        }
    }

    /// Serialize to a single newline-terminated line
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(TERMINATOR);
        Ok(line)
    }
}

/// Response from the analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub analysis: RawAnalysis,
    #[serde(default)]
    pub findings: Vec<Finding>,
    /// Set when the analyzer failed the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Anything else the operation returns
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Response {
    /// Decode one buffered response line.
    ///
    /// The terminator must be the last byte. A response carrying an `error`
    /// field fails the whole request.
    pub fn decode(line: &[u8]) -> Result<Self> {
        let payload = match line.split_last() {
            Some((&TERMINATOR, payload)) => payload,
            _ => {
                return Err(Error::protocol(format!(
                    "response of {} bytes is not newline-terminated",
                    line.len()
                )))
            }
        };

        let mut response: Response = serde_json::from_slice(payload)
            .map_err(|e| Error::protocol(format!("malformed response: {}", e)))?;

        match response.error.take() {
            Some(message) => Err(Error::analyzer(message)),
            None => Ok(response),
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        AnalysisResult {
            analysis: self.analysis,
            findings: self.findings,
        }
    }
}
