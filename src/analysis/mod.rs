//! Kondex Analysis - symbol cross-references for one buffer
//!
//! This module turns one analyzer result into queryable indices:
//! - Row/column spans and containment
//! - Per-row and per-identity indices over locals, vars and namespaces
//! - Cursor resolution with fixed kind precedence
//! - Definition/usage counterparts and occurrence navigation
//!
//! @module analysis

#[cfg(test)]
pub(crate) mod fixtures;
pub mod index;
pub mod navigate;
pub mod resolve;
pub mod span;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use index::{AnalysisSnapshot, SnapshotStats};
pub use navigate::{Direction, Exploration, NavigationState};
pub use resolve::{
    find_binding_for_usage, find_definition, find_definition_for_namespace_usage,
    find_definition_for_var_usage, find_usages_for_binding, find_usages_for_namespace_definition,
    find_usages_for_var_definition, find_usages_matching_usage, identity, occurrences, resolve_at,
    resolve_at_position, resolve_namespace_at, EntityId, Occurrences, Thingy, ThingyKind,
};
pub use span::{Position, Span};
pub use store::{AnalysisStore, BufferId};
pub use types::{
    AnalysisResult, Entity, Extent, Finding, Level, LocalBinding, LocalUsage, NamespaceDefinition,
    NamespaceUsage, QualifiedName, RawAnalysis, VarDefinition, VarUsage,
};
