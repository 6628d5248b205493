//! Analyzer entity records
//!
//! The analyzer emits loosely-typed maps. They are validated once here, at
//! the ingestion boundary, into a closed set of structs. Fields the crate
//! does not model are kept verbatim in `extra` so nothing the analyzer said
//! is lost on the way to the presentation layer.
//!
//! @module analysis/types

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::span::{Position, Span};

/// Unmodelled analyzer fields, preserved as emitted
pub type Extra = Map<String, Value>;

// =============================================================================
// EXTENT
// =============================================================================

/// Location fields shared by every analyzer record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Extent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub row: u32,
    pub col: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_col: Option<u32>,
    /// Position of the symbol token itself, when the record covers a larger form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_col: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_end_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_end_col: Option<u32>,
}

impl Extent {
    pub fn new(row: u32, col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            row,
            col,
            end_row: Some(end_row),
            end_col: Some(end_col),
            ..Self::default()
        }
    }

    /// Span used for lookup: the symbol token when known, else the whole record.
    pub fn span(&self) -> Span {
        match (self.name_row, self.name_col) {
            (Some(row), Some(col)) => {
                Span::from_parts(row, col, self.name_end_row, self.name_end_col)
            }
            _ => self.form_span(),
        }
    }

    /// Span of the whole record as reported by `row`/`col`/`end-row`/`end-col`
    pub fn form_span(&self) -> Span {
        Span::from_parts(self.row, self.col, self.end_row, self.end_col)
    }
}

/// Anything the analyzer reports at a location
pub trait Entity {
    fn extent(&self) -> &Extent;

    fn span(&self) -> Span {
        self.extent().span()
    }

    fn row(&self) -> u32 {
        self.span().row()
    }
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn extent(&self) -> &Extent {
                    &self.extent
                }
            }
        )*
    };
}

// =============================================================================
// LOCALS
// =============================================================================

/// A `let`-style local binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalBinding {
    /// Unique within one analysis
    pub id: u64,
    #[serde(default)]
    pub name: CompactString,
    #[serde(flatten)]
    pub extent: Extent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_end_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_end_col: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl LocalBinding {
    /// Where the binding stops being visible, if the analyzer said
    pub fn scope_end(&self) -> Option<Position> {
        Some(Position::new(self.scope_end_row?, self.scope_end_col?))
    }
}

/// A read of a local binding; `id` matches the binding's `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalUsage {
    pub id: u64,
    #[serde(default)]
    pub name: CompactString,
    #[serde(flatten)]
    pub extent: Extent,
    #[serde(flatten)]
    pub extra: Extra,
}

// =============================================================================
// VARS
// =============================================================================

/// A top-level definition inside a namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VarDefinition {
    pub ns: CompactString,
    pub name: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_by: Option<CompactString>,
    #[serde(flatten)]
    pub extent: Extent,
    /// Analyzer flags such as `macro`, `private`, `fixed-arities`, `doc`
    #[serde(flatten)]
    pub extra: Extra,
}

impl VarDefinition {
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.ns.clone(), self.name.clone())
    }

    pub fn is_macro(&self) -> bool {
        self.extra
            .get("macro")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A reference to a var, possibly through an alias or `:refer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VarUsage {
    pub from: CompactString,
    pub to: CompactString,
    pub name: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<CompactString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refer: Option<bool>,
    #[serde(flatten)]
    pub extent: Extent,
    #[serde(flatten)]
    pub extra: Extra,
}

impl VarUsage {
    /// The (ns, name) of the var this usage points at
    pub fn target(&self) -> QualifiedName {
        QualifiedName::new(self.to.clone(), self.name.clone())
    }

    pub fn is_referred(&self) -> bool {
        self.refer.unwrap_or(false)
    }
}

/// Semantic identity of a var
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    pub ns: CompactString,
    pub name: CompactString,
}

impl QualifiedName {
    pub fn new(ns: impl Into<CompactString>, name: impl Into<CompactString>) -> Self {
        Self {
            ns: ns.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ns, self.name)
    }
}

// =============================================================================
// NAMESPACES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NamespaceDefinition {
    pub name: CompactString,
    #[serde(flatten)]
    pub extent: Extent,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A require-style reference from one namespace to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NamespaceUsage {
    pub from: CompactString,
    pub to: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<CompactString>,
    #[serde(flatten)]
    pub extent: Extent,
    #[serde(flatten)]
    pub extra: Extra,
}

// =============================================================================
// FINDINGS
// =============================================================================

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
        };
        f.write_str(s)
    }
}

/// A linter diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Finding {
    pub level: Level,
    /// Linter rule identifier, e.g. `syntax`, `unresolved-symbol`
    #[serde(rename = "type")]
    pub kind: CompactString,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub extent: Extent,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Finding {
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl_entity!(
    LocalBinding,
    LocalUsage,
    VarDefinition,
    VarUsage,
    NamespaceDefinition,
    NamespaceUsage,
    Finding,
);

// =============================================================================
// RAW RESULT
// =============================================================================

/// The six flat entity lists of one analysis pass, in emission order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawAnalysis {
    #[serde(default)]
    pub locals: Vec<LocalBinding>,
    #[serde(default)]
    pub local_usages: Vec<LocalUsage>,
    #[serde(default)]
    pub var_definitions: Vec<VarDefinition>,
    #[serde(default)]
    pub var_usages: Vec<VarUsage>,
    #[serde(default)]
    pub namespace_definitions: Vec<NamespaceDefinition>,
    #[serde(default)]
    pub namespace_usages: Vec<NamespaceUsage>,
}

impl RawAnalysis {
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
            && self.local_usages.is_empty()
            && self.var_definitions.is_empty()
            && self.var_usages.is_empty()
            && self.namespace_definitions.is_empty()
            && self.namespace_usages.is_empty()
    }
}

/// Analysis plus diagnostics for one buffer or project
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub analysis: RawAnalysis,
    #[serde(default)]
    pub findings: Vec<Finding>,
}
