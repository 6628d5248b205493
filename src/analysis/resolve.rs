//! Thingy resolution - what sits under the cursor, and where else it appears
//!
//! `resolve_at` maps a span to the entity covering it. The remaining
//! functions connect definitions and usages. Every query treats a missing
//! counterpart as a normal outcome: orphan usages are common while code is
//! being typed.
//!
//! @module analysis/resolve

use compact_str::CompactString;
use serde::Serialize;

use super::index::AnalysisSnapshot;
use super::span::{Position, Span};
use super::types::{
    Entity, Extent, LocalBinding, LocalUsage, NamespaceDefinition, NamespaceUsage, QualifiedName,
    VarDefinition, VarUsage,
};

// =============================================================================
// THINGY
// =============================================================================

/// The entity kinds a cursor can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThingyKind {
    LocalUsage,
    VarUsage,
    LocalBinding,
    VarDefinition,
    NamespaceUsage,
    NamespaceDefinition,
}

impl std::fmt::Display for ThingyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ThingyKind::LocalUsage => "local usage",
            ThingyKind::VarUsage => "var usage",
            ThingyKind::LocalBinding => "local binding",
            ThingyKind::VarDefinition => "var definition",
            ThingyKind::NamespaceUsage => "namespace usage",
            ThingyKind::NamespaceDefinition => "namespace definition",
        };
        f.write_str(s)
    }
}

/// A resolved entity, owned so it can outlive the snapshot it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Thingy {
    LocalUsage(LocalUsage),
    VarUsage(VarUsage),
    LocalBinding(LocalBinding),
    VarDefinition(VarDefinition),
    NamespaceUsage(NamespaceUsage),
    NamespaceDefinition(NamespaceDefinition),
}

/// Identity shared by a definition and all of its usages
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum EntityId {
    Local(u64),
    Var(QualifiedName),
    /// A var usage with no definition in the snapshot, keyed by its full
    /// (from, to, name) triple
    UnresolvedVar {
        from: CompactString,
        target: QualifiedName,
    },
    Namespace(CompactString),
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Local(id) => write!(f, "local #{}", id),
            EntityId::Var(name) => write!(f, "{}", name),
            EntityId::UnresolvedVar { from, target } => write!(f, "{} (from {})", target, from),
            EntityId::Namespace(name) => write!(f, "{}", name),
        }
    }
}

impl Thingy {
    pub fn kind(&self) -> ThingyKind {
        match self {
            Thingy::LocalUsage(_) => ThingyKind::LocalUsage,
            Thingy::VarUsage(_) => ThingyKind::VarUsage,
            Thingy::LocalBinding(_) => ThingyKind::LocalBinding,
            Thingy::VarDefinition(_) => ThingyKind::VarDefinition,
            Thingy::NamespaceUsage(_) => ThingyKind::NamespaceUsage,
            Thingy::NamespaceDefinition(_) => ThingyKind::NamespaceDefinition,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Thingy::LocalUsage(u) => EntityId::Local(u.id),
            Thingy::LocalBinding(b) => EntityId::Local(b.id),
            Thingy::VarUsage(u) => EntityId::Var(u.target()),
            Thingy::VarDefinition(d) => EntityId::Var(d.qualified_name()),
            Thingy::NamespaceUsage(u) => EntityId::Namespace(u.to.clone()),
            Thingy::NamespaceDefinition(d) => EntityId::Namespace(d.name.clone()),
        }
    }

    /// Display label, e.g. `a` or `clojure.string/join`
    pub fn label(&self) -> String {
        match self {
            Thingy::LocalUsage(u) => u.name.to_string(),
            Thingy::LocalBinding(b) => b.name.to_string(),
            Thingy::VarUsage(u) => u.target().to_string(),
            Thingy::VarDefinition(d) => d.qualified_name().to_string(),
            Thingy::NamespaceUsage(u) => u.to.to_string(),
            Thingy::NamespaceDefinition(d) => d.name.to_string(),
        }
    }

    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Thingy::LocalBinding(_) | Thingy::VarDefinition(_) | Thingy::NamespaceDefinition(_)
        )
    }
}

impl Entity for Thingy {
    fn extent(&self) -> &Extent {
        match self {
            Thingy::LocalUsage(u) => u.extent(),
            Thingy::VarUsage(u) => u.extent(),
            Thingy::LocalBinding(b) => b.extent(),
            Thingy::VarDefinition(d) => d.extent(),
            Thingy::NamespaceUsage(u) => u.extent(),
            Thingy::NamespaceDefinition(d) => d.extent(),
        }
    }
}

// =============================================================================
// SPAN LOOKUP
// =============================================================================

/// Find the entity whose span fully contains `span`.
///
/// Only entities starting on `span`'s row are considered. First match wins,
/// in this order: local usage, var usage, local binding, var definition.
pub fn resolve_at(snapshot: &AnalysisSnapshot, span: &Span) -> Option<Thingy> {
    let row = span.row();

    if let Some(usage) = snapshot
        .local_usages_on_row(row)
        .find(|u| u.span().contains(span))
    {
        return Some(Thingy::LocalUsage(usage.clone()));
    }

    if let Some(usage) = snapshot
        .var_usages_on_row(row)
        .find(|u| u.span().contains(span))
    {
        return Some(Thingy::VarUsage(usage.clone()));
    }

    if let Some(binding) = snapshot
        .locals_on_row(row)
        .find(|b| b.span().contains(span))
    {
        return Some(Thingy::LocalBinding(binding.clone()));
    }

    snapshot
        .vars_on_row(row)
        .find(|d| d.span().contains(span))
        .map(|d| Thingy::VarDefinition(d.clone()))
}

/// `resolve_at` for a bare cursor
pub fn resolve_at_position(snapshot: &AnalysisSnapshot, position: Position) -> Option<Thingy> {
    resolve_at(snapshot, &Span::point(position))
}

/// Find the namespace usage, then namespace definition, containing `span`
pub fn resolve_namespace_at(snapshot: &AnalysisSnapshot, span: &Span) -> Option<Thingy> {
    let row = span.row();

    if let Some(usage) = snapshot
        .namespace_usages_on_row(row)
        .find(|u| u.span().contains(span))
    {
        return Some(Thingy::NamespaceUsage(usage.clone()));
    }

    snapshot
        .namespaces_on_row(row)
        .find(|d| d.span().contains(span))
        .map(|d| Thingy::NamespaceDefinition(d.clone()))
}

// =============================================================================
// COUNTERPARTS
// =============================================================================

pub fn find_binding_for_usage<'a>(
    snapshot: &'a AnalysisSnapshot,
    usage: &LocalUsage,
) -> Option<&'a LocalBinding> {
    snapshot.local_by_id(usage.id)
}

/// All usages of `binding`, in analyzer emission order
pub fn find_usages_for_binding<'a>(
    snapshot: &'a AnalysisSnapshot,
    binding: &LocalBinding,
) -> Vec<&'a LocalUsage> {
    local_usages_with_id(snapshot, binding.id)
}

fn local_usages_with_id(snapshot: &AnalysisSnapshot, id: u64) -> Vec<&LocalUsage> {
    snapshot
        .analysis
        .local_usages
        .iter()
        .filter(|u| u.id == id)
        .collect()
}

pub fn find_definition_for_var_usage<'a>(
    snapshot: &'a AnalysisSnapshot,
    usage: &VarUsage,
) -> Option<&'a VarDefinition> {
    snapshot.var_by_qualified_name(&usage.target())
}

/// Usages pointing at `definition`, including aliased and referred ones
pub fn find_usages_for_var_definition<'a>(
    snapshot: &'a AnalysisSnapshot,
    definition: &VarDefinition,
) -> Vec<&'a VarUsage> {
    snapshot
        .analysis
        .var_usages
        .iter()
        .filter(|u| u.to == definition.ns && u.name == definition.name)
        .collect()
}

/// Sibling call sites of a usage that has no definition to anchor on.
///
/// Matches the exact (from, to, name) triple, so the usage itself is included.
pub fn find_usages_matching_usage<'a>(
    snapshot: &'a AnalysisSnapshot,
    usage: &VarUsage,
) -> Vec<&'a VarUsage> {
    snapshot
        .analysis
        .var_usages
        .iter()
        .filter(|u| u.from == usage.from && u.to == usage.to && u.name == usage.name)
        .collect()
}

pub fn find_definition_for_namespace_usage<'a>(
    snapshot: &'a AnalysisSnapshot,
    usage: &NamespaceUsage,
) -> Option<&'a NamespaceDefinition> {
    snapshot.namespace_by_name(&usage.to)
}

pub fn find_usages_for_namespace_definition<'a>(
    snapshot: &'a AnalysisSnapshot,
    definition: &NamespaceDefinition,
) -> Vec<&'a NamespaceUsage> {
    namespace_usages_to(snapshot, &definition.name)
}

fn namespace_usages_to<'a>(snapshot: &'a AnalysisSnapshot, to: &str) -> Vec<&'a NamespaceUsage> {
    snapshot
        .analysis
        .namespace_usages
        .iter()
        .filter(|u| u.to == to)
        .collect()
}

/// The definition a thingy points at, if it is a usage and one was found
pub fn find_definition(snapshot: &AnalysisSnapshot, thingy: &Thingy) -> Option<Thingy> {
    match thingy {
        Thingy::LocalUsage(u) => {
            find_binding_for_usage(snapshot, u).map(|b| Thingy::LocalBinding(b.clone()))
        }
        Thingy::VarUsage(u) => {
            find_definition_for_var_usage(snapshot, u).map(|d| Thingy::VarDefinition(d.clone()))
        }
        Thingy::NamespaceUsage(u) => find_definition_for_namespace_usage(snapshot, u)
            .map(|d| Thingy::NamespaceDefinition(d.clone())),
        definition => Some(definition.clone()),
    }
}

// =============================================================================
// OCCURRENCES
// =============================================================================

/// Everything a navigator steps through for one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrences {
    pub id: EntityId,
    /// Definition or binding first when known, then usages in scan order
    pub items: Vec<Thingy>,
}

impl Occurrences {
    /// Usages only, without the leading definition
    pub fn usages(&self) -> impl Iterator<Item = &Thingy> {
        self.items.iter().filter(|t| !t.is_definition())
    }

    pub fn position_of(&self, thingy: &Thingy) -> Option<usize> {
        self.items.iter().position(|t| t == thingy)
    }

    pub fn spans(&self) -> Vec<Span> {
        self.items.iter().map(Entity::span).collect()
    }
}

/// Identity of `thingy` within `snapshot`.
///
/// Same as [`Thingy::id`] except for a var usage whose definition is not in
/// the snapshot: its occurrences are the usages sharing its exact
/// (from, to, name) triple, so `from` is part of the identity.
pub fn identity(snapshot: &AnalysisSnapshot, thingy: &Thingy) -> EntityId {
    match thingy {
        Thingy::VarUsage(u) if find_definition_for_var_usage(snapshot, u).is_none() => {
            EntityId::UnresolvedVar {
                from: u.from.clone(),
                target: u.target(),
            }
        }
        _ => thingy.id(),
    }
}

/// Compute the occurrence list for `thingy`.
///
/// An orphan local usage yields its sibling usages. A var usage without a
/// definition falls back to `find_usages_matching_usage`.
pub fn occurrences(snapshot: &AnalysisSnapshot, thingy: &Thingy) -> Occurrences {
    let items = match thingy {
        Thingy::LocalBinding(b) => binding_occurrences(snapshot, b),
        Thingy::LocalUsage(u) => match find_binding_for_usage(snapshot, u) {
            Some(b) => binding_occurrences(snapshot, b),
            None => local_usages_with_id(snapshot, u.id)
                .into_iter()
                .map(|u| Thingy::LocalUsage(u.clone()))
                .collect(),
        },
        Thingy::VarDefinition(d) => definition_occurrences(snapshot, d),
        Thingy::VarUsage(u) => match find_definition_for_var_usage(snapshot, u) {
            Some(d) => definition_occurrences(snapshot, d),
            None => find_usages_matching_usage(snapshot, u)
                .into_iter()
                .map(|u| Thingy::VarUsage(u.clone()))
                .collect(),
        },
        Thingy::NamespaceDefinition(d) => namespace_occurrences(snapshot, d),
        Thingy::NamespaceUsage(u) => match find_definition_for_namespace_usage(snapshot, u) {
            Some(d) => namespace_occurrences(snapshot, d),
            None => namespace_usages_to(snapshot, &u.to)
                .into_iter()
                .map(|u| Thingy::NamespaceUsage(u.clone()))
                .collect(),
        },
    };

    Occurrences {
        id: identity(snapshot, thingy),
        items,
    }
}

fn binding_occurrences(snapshot: &AnalysisSnapshot, binding: &LocalBinding) -> Vec<Thingy> {
    std::iter::once(Thingy::LocalBinding(binding.clone()))
        .chain(
            find_usages_for_binding(snapshot, binding)
                .into_iter()
                .map(|u| Thingy::LocalUsage(u.clone())),
        )
        .collect()
}

fn definition_occurrences(snapshot: &AnalysisSnapshot, definition: &VarDefinition) -> Vec<Thingy> {
    std::iter::once(Thingy::VarDefinition(definition.clone()))
        .chain(
            find_usages_for_var_definition(snapshot, definition)
                .into_iter()
                .map(|u| Thingy::VarUsage(u.clone())),
        )
        .collect()
}

fn namespace_occurrences(
    snapshot: &AnalysisSnapshot,
    definition: &NamespaceDefinition,
) -> Vec<Thingy> {
    std::iter::once(Thingy::NamespaceDefinition(definition.clone()))
        .chain(
            find_usages_for_namespace_definition(snapshot, definition)
                .into_iter()
                .map(|u| Thingy::NamespaceUsage(u.clone())),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{self, local, local_usage, var_def, var_usage};
    use crate::analysis::types::{AnalysisResult, RawAnalysis};

    fn let_snapshot() -> AnalysisSnapshot {
        AnalysisSnapshot::build(fixtures::let_analysis())
    }

    #[test]
    fn test_span_lookup_is_reflexive() {
        for result in [fixtures::let_analysis(), fixtures::refer_analysis()] {
            let snapshot = AnalysisSnapshot::build(result);
            let a = &snapshot.analysis;

            let expected: Vec<Thingy> = a
                .local_usages
                .iter()
                .cloned()
                .map(Thingy::LocalUsage)
                .chain(a.var_usages.iter().cloned().map(Thingy::VarUsage))
                .chain(a.locals.iter().cloned().map(Thingy::LocalBinding))
                .chain(a.var_definitions.iter().cloned().map(Thingy::VarDefinition))
                .collect();

            for thingy in expected {
                assert_eq!(resolve_at(&snapshot, &thingy.span()), Some(thingy));
            }
        }
    }

    #[test]
    fn test_cursor_inside_symbol() {
        let snapshot = let_snapshot();

        let thingy = resolve_at_position(&snapshot, Position::new(1, 7)).unwrap();
        assert_eq!(thingy.kind(), ThingyKind::VarDefinition);
        assert_eq!(thingy.label(), "app.core/f");

        // Cursor right after `defn` still counts
        let thingy = resolve_at_position(&snapshot, Position::new(1, 6)).unwrap();
        assert_eq!(thingy.label(), "clojure.core/defn");

        // Whitespace between `[` and the closing paren
        assert_eq!(resolve_at_position(&snapshot, Position::new(1, 9)), None);
        assert_eq!(resolve_at_position(&snapshot, Position::new(40, 1)), None);
    }

    #[test]
    fn test_selection_must_be_contained() {
        let snapshot = let_snapshot();
        // Covers `b` and the space after it
        let selection = Span::new(Position::new(3, 8), Position::new(3, 10));
        assert_eq!(resolve_at(&snapshot, &selection), None);
    }

    #[test]
    fn test_precedence_when_spans_coincide() {
        let snapshot = AnalysisSnapshot::build(AnalysisResult {
            analysis: RawAnalysis {
                locals: vec![local(7, "k", 1, 5)],
                local_usages: vec![local_usage(7, "k", 1, 5)],
                var_definitions: vec![var_def("app.core", "k", 1, 5), var_def("app.core", "v", 2, 5)],
                var_usages: vec![var_usage("app.core", "app.core", "k", 1, 5)],
                ..Default::default()
            },
            findings: vec![],
        });
        let at = Span::point(Position::new(1, 5));

        assert_eq!(resolve_at(&snapshot, &at).unwrap().kind(), ThingyKind::LocalUsage);

        // Usage on the same row as an unrelated definition
        let snapshot = AnalysisSnapshot::build(AnalysisResult {
            analysis: RawAnalysis {
                var_definitions: vec![var_def("app.core", "k", 1, 5)],
                var_usages: vec![var_usage("app.core", "app.core", "k", 1, 5)],
                locals: vec![local(1, "z", 1, 5)],
                ..Default::default()
            },
            findings: vec![],
        });
        assert_eq!(resolve_at(&snapshot, &at).unwrap().kind(), ThingyKind::VarUsage);
    }

    #[test]
    fn test_binding_and_usages() {
        let snapshot = let_snapshot();
        let a = snapshot.local_by_id(2).unwrap().clone();

        let usages = find_usages_for_binding(&snapshot, &a);
        let spots: Vec<(u32, u32)> = usages.iter().map(|u| (u.extent.row, u.extent.col)).collect();
        assert_eq!(spots, vec![(3, 10), (4, 8)]);

        for usage in usages {
            assert_eq!(find_binding_for_usage(&snapshot, usage), Some(&a));
        }
    }

    #[test]
    fn test_binding_without_usages_is_empty_not_absent() {
        let snapshot = AnalysisSnapshot::build(AnalysisResult {
            analysis: RawAnalysis {
                locals: vec![local(9, "unused", 1, 1)],
                ..Default::default()
            },
            findings: vec![],
        });
        let binding = &snapshot.analysis.locals[0];
        assert!(find_usages_for_binding(&snapshot, binding).is_empty());
    }

    #[test]
    fn test_orphan_local_usage() {
        let snapshot = AnalysisSnapshot::build(AnalysisResult {
            analysis: RawAnalysis {
                local_usages: vec![local_usage(42, "ghost", 1, 2), local_usage(42, "ghost", 2, 2)],
                ..Default::default()
            },
            findings: vec![],
        });
        let usage = snapshot.analysis.local_usages[0].clone();

        assert!(find_binding_for_usage(&snapshot, &usage).is_none());

        let occ = occurrences(&snapshot, &Thingy::LocalUsage(usage));
        assert_eq!(occ.id, EntityId::Local(42));
        assert_eq!(occ.items.len(), 2);
    }

    #[test]
    fn test_referred_usage_resolves_across_namespaces() {
        let snapshot = AnalysisSnapshot::build(fixtures::refer_analysis());
        let usage = &snapshot.analysis.var_usages[0];

        let def = find_definition_for_var_usage(&snapshot, usage).unwrap();
        assert_eq!(def.qualified_name(), QualifiedName::new("app.util", "helper"));

        let usages = find_usages_for_var_definition(&snapshot, def);
        assert_eq!(usages, vec![usage]);
    }

    #[test]
    fn test_unresolved_var_falls_back_to_matching_usages() {
        let snapshot = AnalysisSnapshot::build(fixtures::unresolved_analysis());
        let usage = snapshot.analysis.var_usages[0].clone();

        assert!(find_definition_for_var_usage(&snapshot, &usage).is_none());

        let siblings = find_usages_matching_usage(&snapshot, &usage);
        let rows: Vec<u32> = siblings.iter().map(|u| u.extent.row).collect();
        assert_eq!(rows, vec![2, 4, 6]);
        assert!(siblings.contains(&&usage));

        let occ = occurrences(&snapshot, &Thingy::VarUsage(usage));
        assert_eq!(occ.items.len(), 3);
        assert_eq!(occ.usages().count(), 3);
        assert_eq!(
            occ.id,
            EntityId::UnresolvedVar {
                from: "app.core".into(),
                target: QualifiedName::new("ext.lib", "go"),
            }
        );
    }

    #[test]
    fn test_unresolved_identity_includes_source_namespace() {
        let snapshot = AnalysisSnapshot::build(fixtures::unresolved_analysis());
        let core = resolve_at_position(&snapshot, Position::new(2, 2)).unwrap();
        let other = resolve_at_position(&snapshot, Position::new(5, 2)).unwrap();

        assert_eq!(core.id(), other.id());
        assert_ne!(identity(&snapshot, &core), identity(&snapshot, &other));

        let occ = occurrences(&snapshot, &other);
        assert_eq!(occ.position_of(&other), Some(0));
        assert_eq!(occ.items.len(), 1);
    }

    #[test]
    fn test_occurrences_start_with_definition() {
        let snapshot = let_snapshot();
        let usage = resolve_at_position(&snapshot, Position::new(4, 8)).unwrap();

        let occ = occurrences(&snapshot, &usage);
        assert_eq!(occ.id, EntityId::Local(2));
        assert_eq!(occ.items[0].kind(), ThingyKind::LocalBinding);
        assert_eq!(occ.position_of(&usage), Some(2));
        assert_eq!(
            occ.spans(),
            vec![
                Span::from_parts(2, 9, Some(2), Some(10)),
                Span::from_parts(3, 10, Some(3), Some(11)),
                Span::from_parts(4, 8, Some(4), Some(9)),
            ]
        );
    }

    #[test]
    fn test_namespace_resolution() {
        let snapshot = AnalysisSnapshot::build(fixtures::refer_analysis());

        let usage = resolve_namespace_at(&snapshot, &Span::point(Position::new(1, 28))).unwrap();
        assert_eq!(usage.kind(), ThingyKind::NamespaceUsage);
        assert_eq!(usage.id(), EntityId::Namespace("app.util".into()));
        // app.util is not defined in this buffer
        assert_eq!(find_definition(&snapshot, &usage), None);

        let def = resolve_namespace_at(&snapshot, &Span::point(Position::new(1, 6))).unwrap();
        assert_eq!(def.kind(), ThingyKind::NamespaceDefinition);
        assert_eq!(occurrences(&snapshot, &def).items.len(), 1);
    }
}
