//! Analysis Snapshot - derived cross-reference indices for one buffer
//!
//! A snapshot owns the raw analysis of one pass plus lookup tables built
//! from it. Tables hold positions into the raw vectors rather than copies,
//! so every lookup hands back a reference into the one owned record.
//!
//! Snapshots are built wholesale and never patched. Re-analysis builds a
//! new one and the store swaps it in.
//!
//! @module analysis/index

use std::collections::HashMap;

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::debug;

use super::types::{
    AnalysisResult, Entity, Finding, Level, LocalBinding, LocalUsage, NamespaceDefinition,
    NamespaceUsage, QualifiedName, RawAnalysis, VarDefinition, VarUsage,
};

/// Positions into one of the raw vectors, in emission order.
///
/// Most rows carry only a handful of symbols.
pub type RowBucket = SmallVec<[u32; 4]>;

/// Raw analysis plus every derived index, immutable once built
#[derive(Debug, Default)]
pub struct AnalysisSnapshot {
    // -------------------------------------------------------------------------
    // Primary Data
    // -------------------------------------------------------------------------
    pub analysis: RawAnalysis,
    pub findings: Vec<Finding>,

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------
    locals_by_id: HashMap<u64, u32>,
    locals_by_row: HashMap<u32, RowBucket>,
    local_usages_by_row: HashMap<u32, RowBucket>,
    vars_by_qualified_name: HashMap<QualifiedName, u32>,
    vars_by_row: HashMap<u32, RowBucket>,
    var_usages_by_row: HashMap<u32, RowBucket>,
    namespaces_by_name: HashMap<CompactString, u32>,
    namespaces_by_row: HashMap<u32, RowBucket>,
    namespace_usages_by_row: HashMap<u32, RowBucket>,
}

/// Group entities by the row their span starts on, keeping emission order
fn group_by_row<T: Entity>(entities: &[T]) -> HashMap<u32, RowBucket> {
    let mut rows: HashMap<u32, RowBucket> = HashMap::new();
    for (i, entity) in entities.iter().enumerate() {
        rows.entry(entity.row()).or_default().push(i as u32);
    }
    rows
}

/// Map each key to the first entity that produced it
fn first_by_key<T, K, F>(entities: &[T], key: F) -> HashMap<K, u32>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut map = HashMap::with_capacity(entities.len());
    for (i, entity) in entities.iter().enumerate() {
        map.entry(key(entity)).or_insert(i as u32);
    }
    map
}

impl AnalysisSnapshot {
    /// Build all indices from one analyzer result
    pub fn build(result: AnalysisResult) -> Self {
        let AnalysisResult { analysis, findings } = result;

        let locals_by_id = first_by_key(&analysis.locals, |b| b.id);
        let vars_by_qualified_name =
            first_by_key(&analysis.var_definitions, VarDefinition::qualified_name);
        let namespaces_by_name = first_by_key(&analysis.namespace_definitions, |n| n.name.clone());

        let snapshot = Self {
            locals_by_id,
            locals_by_row: group_by_row(&analysis.locals),
            local_usages_by_row: group_by_row(&analysis.local_usages),
            vars_by_qualified_name,
            vars_by_row: group_by_row(&analysis.var_definitions),
            var_usages_by_row: group_by_row(&analysis.var_usages),
            namespaces_by_name,
            namespaces_by_row: group_by_row(&analysis.namespace_definitions),
            namespace_usages_by_row: group_by_row(&analysis.namespace_usages),
            analysis,
            findings,
        };

        debug!(
            locals = snapshot.analysis.locals.len(),
            local_usages = snapshot.analysis.local_usages.len(),
            var_definitions = snapshot.analysis.var_definitions.len(),
            var_usages = snapshot.analysis.var_usages.len(),
            findings = snapshot.findings.len(),
            "Built analysis snapshot"
        );

        snapshot
    }

    /// Snapshot of a buffer nothing has been analyzed for yet
    pub fn empty() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Identity Lookups
    // -------------------------------------------------------------------------

    pub fn local_by_id(&self, id: u64) -> Option<&LocalBinding> {
        self.locals_by_id
            .get(&id)
            .map(|&i| &self.analysis.locals[i as usize])
    }

    pub fn var_by_qualified_name(&self, name: &QualifiedName) -> Option<&VarDefinition> {
        self.vars_by_qualified_name
            .get(name)
            .map(|&i| &self.analysis.var_definitions[i as usize])
    }

    pub fn namespace_by_name(&self, name: &str) -> Option<&NamespaceDefinition> {
        self.namespaces_by_name
            .get(name)
            .map(|&i| &self.analysis.namespace_definitions[i as usize])
    }

    // -------------------------------------------------------------------------
    // Row Lookups
    // -------------------------------------------------------------------------

    pub fn locals_on_row(&self, row: u32) -> impl Iterator<Item = &LocalBinding> {
        bucket(&self.locals_by_row, row).map(|i| &self.analysis.locals[i])
    }

    pub fn local_usages_on_row(&self, row: u32) -> impl Iterator<Item = &LocalUsage> {
        bucket(&self.local_usages_by_row, row).map(|i| &self.analysis.local_usages[i])
    }

    pub fn vars_on_row(&self, row: u32) -> impl Iterator<Item = &VarDefinition> {
        bucket(&self.vars_by_row, row).map(|i| &self.analysis.var_definitions[i])
    }

    pub fn var_usages_on_row(&self, row: u32) -> impl Iterator<Item = &VarUsage> {
        bucket(&self.var_usages_by_row, row).map(|i| &self.analysis.var_usages[i])
    }

    pub fn namespaces_on_row(&self, row: u32) -> impl Iterator<Item = &NamespaceDefinition> {
        bucket(&self.namespaces_by_row, row).map(|i| &self.analysis.namespace_definitions[i])
    }

    pub fn namespace_usages_on_row(&self, row: u32) -> impl Iterator<Item = &NamespaceUsage> {
        bucket(&self.namespace_usages_by_row, row).map(|i| &self.analysis.namespace_usages[i])
    }

    // -------------------------------------------------------------------------
    // Findings
    // -------------------------------------------------------------------------

    pub fn findings_at_row(&self, row: u32) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.row() == row)
    }

    pub fn error_count(&self) -> usize {
        self.count_level(Level::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_level(Level::Warning)
    }

    fn count_level(&self, level: Level) -> usize {
        self.findings.iter().filter(|f| f.level == level).count()
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            locals: self.analysis.locals.len(),
            local_usages: self.analysis.local_usages.len(),
            var_definitions: self.analysis.var_definitions.len(),
            var_usages: self.analysis.var_usages.len(),
            unique_vars: self.vars_by_qualified_name.len(),
            findings: self.findings.len(),
        }
    }

    /// True when no index holds anything
    pub fn indices_empty(&self) -> bool {
        self.locals_by_id.is_empty()
            && self.locals_by_row.is_empty()
            && self.local_usages_by_row.is_empty()
            && self.vars_by_qualified_name.is_empty()
            && self.vars_by_row.is_empty()
            && self.var_usages_by_row.is_empty()
            && self.namespaces_by_name.is_empty()
            && self.namespaces_by_row.is_empty()
            && self.namespace_usages_by_row.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn var_row_keys(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = self.vars_by_row.keys().copied().collect();
        rows.sort_unstable();
        rows
    }
}

fn bucket(index: &HashMap<u32, RowBucket>, row: u32) -> impl Iterator<Item = usize> + '_ {
    index
        .get(&row)
        .into_iter()
        .flat_map(|ids| ids.iter().map(|&i| i as usize))
}

/// Counts for status output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub locals: usize,
    pub local_usages: usize,
    pub var_definitions: usize,
    pub var_usages: usize,
    pub unique_vars: usize,
    pub findings: usize,
}

impl std::fmt::Display for SnapshotStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Analysis Snapshot:")?;
        writeln!(f, "  Locals:       {:>8}", self.locals)?;
        writeln!(f, "  Local Usages: {:>8}", self.local_usages)?;
        writeln!(f, "  Vars:         {:>8}", self.var_definitions)?;
        writeln!(f, "  Var Usages:   {:>8}", self.var_usages)?;
        writeln!(f, "  Unique Vars:  {:>8}", self.unique_vars)?;
        writeln!(f, "  Findings:     {:>8}", self.findings)?;
        Ok(())
    }
}
