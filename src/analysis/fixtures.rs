//! Hand-built analyzer output shared by the analysis tests

use serde_json::json;

use super::types::*;

fn extent(row: u32, col: u32, name: &str) -> Extent {
    Extent::new(row, col, row, col + name.chars().count() as u32)
}

pub(crate) fn local(id: u64, name: &str, row: u32, col: u32) -> LocalBinding {
    LocalBinding {
        id,
        name: name.into(),
        extent: extent(row, col, name),
        scope_end_row: None,
        scope_end_col: None,
        extra: Default::default(),
    }
}

pub(crate) fn local_usage(id: u64, name: &str, row: u32, col: u32) -> LocalUsage {
    LocalUsage {
        id,
        name: name.into(),
        extent: extent(row, col, name),
        extra: Default::default(),
    }
}

pub(crate) fn var_def(ns: &str, name: &str, row: u32, col: u32) -> VarDefinition {
    VarDefinition {
        ns: ns.into(),
        name: name.into(),
        defined_by: Some("clojure.core/defn".into()),
        extent: extent(row, col, name),
        extra: Default::default(),
    }
}

pub(crate) fn var_usage(from: &str, to: &str, name: &str, row: u32, col: u32) -> VarUsage {
    VarUsage {
        from: from.into(),
        to: to.into(),
        name: name.into(),
        alias: None,
        refer: None,
        extent: extent(row, col, name),
        extra: Default::default(),
    }
}

/// ```clojure
/// (defn f [x]
///   (let [a 1 b 2]
///     (+ b a)
///     (* a x)))
/// ```
pub(crate) fn let_analysis() -> AnalysisResult {
    AnalysisResult {
        analysis: RawAnalysis {
            locals: vec![local(1, "x", 1, 10), local(2, "a", 2, 9), local(3, "b", 2, 13)],
            local_usages: vec![
                local_usage(3, "b", 3, 8),
                local_usage(2, "a", 3, 10),
                local_usage(2, "a", 4, 8),
                local_usage(1, "x", 4, 10),
            ],
            var_definitions: vec![var_def("app.core", "f", 1, 7)],
            var_usages: vec![
                var_usage("app.core", "clojure.core", "defn", 1, 2),
                var_usage("app.core", "clojure.core", "let", 2, 4),
                var_usage("app.core", "clojure.core", "+", 3, 6),
                var_usage("app.core", "clojure.core", "*", 4, 6),
            ],
            ..Default::default()
        },
        findings: vec![],
    }
}

/// ```clojure
/// (ns app.core (:require [app.util :as u :refer [helper]]))
///
/// (defn helper [x] x)
///
/// (helper 1)
/// ```
pub(crate) fn refer_analysis() -> AnalysisResult {
    let raw = json!({
        "analysis": {
            "namespace-definitions": [
                {"filename": "src/app/core.clj", "row": 1, "col": 1, "end-row": 1, "end-col": 57,
                 "name-row": 1, "name-col": 5, "name-end-row": 1, "name-end-col": 13,
                 "name": "app.core"}
            ],
            "namespace-usages": [
                {"filename": "src/app/core.clj", "row": 1, "col": 25, "end-row": 1, "end-col": 33,
                 "from": "app.core", "to": "app.util", "alias": "u"}
            ],
            "var-definitions": [
                {"filename": "src/app/core.clj", "row": 3, "col": 7, "end-row": 3, "end-col": 13,
                 "ns": "app.util", "name": "helper", "defined-by": "clojure.core/defn",
                 "private": false, "fixed-arities": [1]}
            ],
            "var-usages": [
                {"filename": "src/app/core.clj", "row": 5, "col": 2, "end-row": 5, "end-col": 8,
                 "from": "app.core", "to": "app.util", "name": "helper", "refer": true, "arity": 1}
            ]
        },
        "findings": []
    });
    serde_json::from_value(raw).expect("fixture is valid analyzer output")
}

/// Usages of a var in a namespace that was never analyzed
pub(crate) fn unresolved_analysis() -> AnalysisResult {
    AnalysisResult {
        analysis: RawAnalysis {
            var_usages: vec![
                var_usage("app.core", "ext.lib", "go", 2, 2),
                var_usage("app.core", "ext.lib", "stop", 3, 2),
                var_usage("app.core", "ext.lib", "go", 4, 2),
                var_usage("app.other", "ext.lib", "go", 5, 2),
                var_usage("app.core", "ext.lib", "go", 6, 2),
            ],
            ..Default::default()
        },
        findings: vec![],
    }
}

/// What the analyzer reports for the single-character buffer `(`
pub(crate) fn unbalanced_paren_result() -> AnalysisResult {
    serde_json::from_value(json!({
        "analysis": {},
        "findings": [
            {"filename": "<stdin>", "row": 1, "col": 1, "end-row": 1, "end-col": 2,
             "level": "error", "type": "syntax",
             "message": "Found an opening ( with no matching )"}
        ]
    }))
    .expect("fixture is valid analyzer output")
}
