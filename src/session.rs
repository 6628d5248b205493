//! Session - the editor-facing entry point
//!
//! Owns the buffer store and the analyzer transport. Analysis errors are
//! returned to the caller; cursor-driven commands (`thingy_at`, `jump`,
//! `find_usages`, `locate_definition`) fail quiet and return `None`.
//!
//! @module session

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{
    find_definition, occurrences, resolve_at, resolve_namespace_at, AnalysisResult,
    AnalysisSnapshot, AnalysisStore, BufferId, Direction, Entity, NamespaceDefinition,
    Occurrences, SnapshotStats, Span, Thingy,
};
use crate::config::{AnalysisConfig, EditorEvent};
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Buffer contents and where they live
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub root: &'a Path,
    pub filename: &'a str,
    pub text: &'a str,
}

/// A place to jump to, possibly in another file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub filename: Option<String>,
    pub span: Span,
}

impl Location {
    fn of(thingy: &Thingy) -> Self {
        Self {
            filename: thingy.extent().filename.clone(),
            span: thingy.span(),
        }
    }
}

pub struct Session {
    store: AnalysisStore,
    transport: Box<dyn Transport>,
    config: AnalysisConfig,
}

impl Session {
    pub fn new(transport: Box<dyn Transport>, config: AnalysisConfig) -> Self {
        Self {
            store: AnalysisStore::new(),
            transport,
            config,
        }
    }

    pub fn store(&self) -> &AnalysisStore {
        &self.store
    }

    pub fn open(&self, buffer: BufferId) -> bool {
        self.store.open(buffer)
    }

    pub fn close(&self, buffer: BufferId) -> bool {
        self.store.close(buffer)
    }

    /// Re-analyze if `event` is one of the configured triggers.
    ///
    /// Returns whether an analysis ran.
    pub fn on_event(
        &self,
        buffer: BufferId,
        event: EditorEvent,
        source: Source<'_>,
    ) -> Result<bool> {
        if !self.config.triggers_on(event) {
            return Ok(false);
        }
        self.analyze(buffer, source)?;
        Ok(true)
    }

    /// Fetch a fresh analysis and swap it in.
    ///
    /// On any failure the buffer keeps its previous snapshot.
    pub fn analyze(&self, buffer: BufferId, source: Source<'_>) -> Result<SnapshotStats> {
        if !self.store.is_open(buffer) {
            return Err(Error::UnknownBuffer(buffer));
        }

        let result = self
            .transport
            .analyze_text(source.root, source.filename, source.text)?;
        let snapshot = AnalysisSnapshot::build(result);
        let stats = snapshot.stats();

        if !self.store.replace(buffer, snapshot) {
            return Err(Error::UnknownBuffer(buffer));
        }

        info!(%buffer, filename = source.filename, findings = stats.findings, "Analyzed buffer");
        Ok(stats)
    }

    /// The entity under `span`, trying namespace forms last
    pub fn thingy_at(&self, buffer: BufferId, span: &Span) -> Option<Thingy> {
        let snapshot = self.store.snapshot(buffer)?;
        let thingy = resolve_at(&snapshot, span).or_else(|| resolve_namespace_at(&snapshot, span));
        if thingy.is_none() {
            debug!(%buffer, %span, "Nothing to resolve");
        }
        thingy
    }

    /// Definition plus usages of whatever is under `span`
    pub fn find_usages(&self, buffer: BufferId, span: &Span) -> Option<Occurrences> {
        let thingy = self.thingy_at(buffer, span)?;
        let snapshot = self.store.snapshot(buffer)?;
        Some(occurrences(&snapshot, &thingy))
    }

    /// Step to the next or previous occurrence.
    ///
    /// If the cursor is on an entity it becomes the explored one (a no-op
    /// when it already is). If the cursor is on nothing, the current
    /// exploration continues. Returns the span to select, or `None` when
    /// there is nowhere to go.
    pub fn jump(&self, buffer: BufferId, span: &Span, direction: Direction) -> Option<Span> {
        let target = self.store.with_navigation(buffer, |snapshot, nav| {
            if let Some(thingy) =
                resolve_at(snapshot, span).or_else(|| resolve_namespace_at(snapshot, span))
            {
                nav.explore(snapshot, &thingy);
            }
            nav.step(direction).map(Entity::span)
        });

        let target = target.flatten();
        if target.is_none() {
            debug!(%buffer, ?direction, "No occurrence to jump to");
        }
        target
    }

    /// Where the entity under `span` is defined.
    ///
    /// Looks in the buffer's own analysis first, then asks the analyzer to
    /// resolve the position project-wide.
    pub fn locate_definition(
        &self,
        buffer: BufferId,
        span: &Span,
        root: &Path,
        filename: &str,
    ) -> Option<Location> {
        let snapshot = self.store.snapshot(buffer)?;
        let thingy = resolve_at(&snapshot, span).or_else(|| resolve_namespace_at(&snapshot, span))?;

        if let Some(definition) = find_definition(&snapshot, &thingy) {
            return Some(Location::of(&definition));
        }

        let position = thingy.span().start;
        let result = match self
            .transport
            .find_definitions(root, filename, position.row, position.col)
        {
            Ok(result) => result,
            Err(e) => {
                debug!(%buffer, error = %e, "Project-wide definition lookup failed");
                return None;
            }
        };

        let analysis = result.analysis;
        analysis
            .var_definitions
            .into_iter()
            .map(Thingy::VarDefinition)
            .chain(
                analysis
                    .namespace_definitions
                    .into_iter()
                    .map(Thingy::NamespaceDefinition),
            )
            .next()
            .map(|definition| Location::of(&definition))
    }

    // -------------------------------------------------------------------------
    // Project Queries
    // -------------------------------------------------------------------------

    /// Findings for every file under `root`
    pub fn project_diagnostics(&self, root: &Path) -> Result<AnalysisResult> {
        self.transport.diagnostics(root)
    }

    /// Full path-based analysis of `root`
    pub fn project_analysis(&self, root: &Path) -> Result<AnalysisResult> {
        self.transport.analyze_paths(root)
    }

    pub fn project_namespaces(&self, root: &Path) -> Result<Vec<NamespaceDefinition>> {
        Ok(self
            .transport
            .namespace_definitions(root)?
            .analysis
            .namespace_definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, Position};
    use crate::transport::{Request, Response};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;

    const BUF: BufferId = BufferId(7);

    /// Replays canned responses in order
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<Response>>>,
    }

    impl ScriptedTransport {
        fn with(responses: Vec<Result<Response>>) -> Box<Self> {
            Box::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    impl Transport for ScriptedTransport {
        fn request(&self, _request: &Request) -> Result<Response> {
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(Error::protocol("no scripted response left")))
        }
    }

    fn ok(result: AnalysisResult) -> Result<Response> {
        Ok(Response {
            analysis: result.analysis,
            findings: result.findings,
            ..Default::default()
        })
    }

    fn source() -> Source<'static> {
        Source {
            root: Path::new("/proj"),
            filename: "src/app/core.clj",
            text: "(defn f [x]\n  (let [a 1 b 2]\n    (+ b a)\n    (* a x)))\n",
        }
    }

    fn at(row: u32, col: u32) -> Span {
        Span::point(Position::new(row, col))
    }

    fn analyzed_session(results: Vec<Result<Response>>) -> Session {
        let session = Session::new(ScriptedTransport::with(results), AnalysisConfig::default());
        session.open(BUF);
        session.analyze(BUF, source()).unwrap();
        session
    }

    #[test]
    fn test_analyze_replaces_snapshot() {
        let session = analyzed_session(vec![ok(fixtures::let_analysis())]);
        let snapshot = session.store().snapshot(BUF).unwrap();
        assert_eq!(snapshot.analysis.locals.len(), 3);
    }

    #[test]
    fn test_failed_analysis_keeps_previous_snapshot() {
        let session = analyzed_session(vec![
            ok(fixtures::let_analysis()),
            Err(Error::analyzer("boom")),
        ]);

        let err = session.analyze(BUF, source()).unwrap_err();
        assert!(matches!(err, Error::Analyzer { .. }));
        assert_eq!(session.store().snapshot(BUF).unwrap().analysis.locals.len(), 3);
    }

    #[test]
    fn test_analyze_unopened_buffer() {
        let session = Session::new(ScriptedTransport::with(vec![]), AnalysisConfig::default());
        assert!(matches!(
            session.analyze(BUF, source()),
            Err(Error::UnknownBuffer(BUF))
        ));
    }

    #[test]
    fn test_events_follow_config() {
        let session = Session::new(
            ScriptedTransport::with(vec![ok(fixtures::let_analysis())]),
            AnalysisConfig {
                analyze_on: vec![EditorEvent::Save],
            },
        );
        session.open(BUF);

        assert!(!session.on_event(BUF, EditorEvent::Load, source()).unwrap());
        assert!(session.on_event(BUF, EditorEvent::Save, source()).unwrap());
    }

    #[test]
    fn test_jump_through_usages() {
        let session = analyzed_session(vec![ok(fixtures::let_analysis())]);

        assert_eq!(
            session.jump(BUF, &at(2, 9), Direction::Forward),
            Some(Span::from_parts(3, 10, Some(3), Some(11)))
        );
        // Cursor moved onto whitespace: the exploration carries on
        assert_eq!(
            session.jump(BUF, &at(3, 12), Direction::Forward),
            Some(Span::from_parts(4, 8, Some(4), Some(9)))
        );
        assert_eq!(session.jump(BUF, &at(4, 8), Direction::Forward), None);
        assert_eq!(
            session.jump(BUF, &at(4, 8), Direction::Back),
            Some(Span::from_parts(3, 10, Some(3), Some(11)))
        );
    }

    #[test]
    fn test_jump_restarts_from_cursor_occurrence() {
        let session = analyzed_session(vec![ok(fixtures::let_analysis())]);

        assert_eq!(
            session.jump(BUF, &at(2, 9), Direction::Forward),
            Some(Span::from_parts(3, 10, Some(3), Some(11)))
        );
        // Back on the binding of `a`: the next occurrence is row 3 again
        assert_eq!(
            session.jump(BUF, &at(2, 9), Direction::Forward),
            Some(Span::from_parts(3, 10, Some(3), Some(11)))
        );
    }

    #[test]
    fn test_jump_on_unknown_buffer() {
        let session = analyzed_session(vec![ok(fixtures::let_analysis())]);
        assert_eq!(session.jump(BufferId(99), &at(2, 9), Direction::Forward), None);
        assert_eq!(session.thingy_at(BufferId(99), &at(2, 9)), None);
    }

    #[test]
    fn test_find_usages_of_referred_var() {
        let session = analyzed_session(vec![ok(fixtures::refer_analysis())]);

        let occ = session.find_usages(BUF, &at(5, 3)).unwrap();
        assert_eq!(occ.items.len(), 2);
        assert!(occ.items[0].is_definition());

        // Namespace forms resolve after the four main kinds
        let ns = session.thingy_at(BUF, &at(1, 26)).unwrap();
        assert_eq!(ns.label(), "app.util");
    }

    #[test]
    fn test_locate_definition_in_buffer() {
        let session = analyzed_session(vec![ok(fixtures::let_analysis())]);
        let location = session
            .locate_definition(BUF, &at(3, 10), Path::new("/proj"), "src/app/core.clj")
            .unwrap();
        assert_eq!(location.span.start, Position::new(2, 9));
    }

    #[test]
    fn test_locate_definition_asks_analyzer() {
        let remote: AnalysisResult = serde_json::from_value(json!({
            "analysis": {"var-definitions": [
                {"filename": "/proj/src/ext/lib.clj", "row": 10, "col": 7,
                 "end-row": 10, "end-col": 9, "ns": "ext.lib", "name": "go"}
            ]}
        }))
        .unwrap();
        let transport = ScriptedTransport::with(vec![ok(fixtures::unresolved_analysis()), ok(remote)]);
        let session = Session::new(transport, AnalysisConfig::default());
        session.open(BUF);
        session.analyze(BUF, source()).unwrap();

        let location = session
            .locate_definition(BUF, &at(2, 2), Path::new("/proj"), "src/app/core.clj")
            .unwrap();
        assert_eq!(location.filename.as_deref(), Some("/proj/src/ext/lib.clj"));
        assert_eq!(location.span.start, Position::new(10, 7));
    }

    #[test]
    fn test_project_namespaces() {
        let listing: AnalysisResult = serde_json::from_value(json!({
            "analysis": {"namespace-definitions": [
                {"filename": "src/a.clj", "row": 1, "col": 5, "name": "a"},
                {"filename": "src/b.clj", "row": 1, "col": 5, "name": "b"}
            ]}
        }))
        .unwrap();
        let session = Session::new(ScriptedTransport::with(vec![ok(listing)]), AnalysisConfig::default());

        let names: Vec<String> = session
            .project_namespaces(Path::new("/proj"))
            .unwrap()
            .into_iter()
            .map(|ns| ns.name.to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(session.project_diagnostics(Path::new("/proj")).is_err());
    }

    #[test]
    fn test_locate_definition_fails_quiet() {
        let session = analyzed_session(vec![
            ok(fixtures::unresolved_analysis()),
            Err(Error::protocol("garbled")),
        ]);
        assert_eq!(
            session.locate_definition(BUF, &at(2, 2), Path::new("/proj"), "a.clj"),
            None
        );
    }
}
