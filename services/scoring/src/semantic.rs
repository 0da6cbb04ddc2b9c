//! Semantic quality analysis stage
//!
//! Structural heuristics over the artifact: oversized functions, deep
//! nesting, and leftover work markers. These approximate what a real
//! semantic model would flag; the stage exists to exercise its slot in the
//! weighted aggregation and can be swapped for a real tool via the
//! [`Analyzer`] trait.

use async_trait::async_trait;
use types::issue::{Issue, IssueKind, Severity};

use crate::analyzer::{deduct_score, AnalysisStage, Analyzer, StageReport};
use crate::errors::ScoringError;

const ARTIFACT_FILE: &str = "artifact";

/// A function body longer than this many lines is flagged.
const MAX_FUNCTION_LINES: usize = 60;

/// Brace depth beyond this is flagged once per function.
const MAX_NESTING_DEPTH: i32 = 5;

/// Built-in semantic analyzer.
#[derive(Debug, Default)]
pub struct SemanticAnalyzer;

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn is_function_start(line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed.starts_with("function ")
            || trimmed.starts_with("fn ")
            || trimmed.starts_with("pub fn ")
            || trimmed.starts_with("def ")
    }

    fn scan(source: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut depth: i32 = 0;
        let mut function_start: Option<(u32, String)> = None;
        let mut function_depth = 0;
        let mut deep_nesting_flagged = false;

        for (idx, line) in source.lines().enumerate() {
            let line_no = (idx + 1) as u32;

            if line.to_ascii_uppercase().contains("TODO")
                || line.to_ascii_uppercase().contains("FIXME")
            {
                issues.push(Issue::new(
                    IssueKind::CodeQuality,
                    Severity::Low,
                    "Unfinished work marker left in source",
                    ARTIFACT_FILE,
                    line_no,
                    line.trim(),
                ));
            }

            if function_start.is_none() && Self::is_function_start(line) {
                function_start = Some((line_no, line.trim().to_string()));
                function_depth = depth;
                deep_nesting_flagged = false;
            }

            let mut line_max_depth = depth;
            for ch in line.chars() {
                match ch {
                    '{' => {
                        depth += 1;
                        line_max_depth = line_max_depth.max(depth);
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }

            if function_start.is_some()
                && line_max_depth - function_depth > MAX_NESTING_DEPTH
                && !deep_nesting_flagged
            {
                deep_nesting_flagged = true;
                issues.push(Issue::new(
                    IssueKind::CodeQuality,
                    Severity::Low,
                    "Control flow nested beyond readable depth",
                    ARTIFACT_FILE,
                    line_no,
                    line.trim(),
                ));
            }

            // Function ended: check its length
            let function_closed = matches!(
                function_start,
                Some((start_line, _)) if depth <= function_depth && line_no > start_line
            );
            if function_closed {
                if let Some((start_line, snippet)) = function_start.take() {
                    let body_lines = (line_no - start_line) as usize;
                    if body_lines > MAX_FUNCTION_LINES {
                        issues.push(Issue::new(
                            IssueKind::CodeQuality,
                            Severity::Medium,
                            "Function body exceeds maintainable length",
                            ARTIFACT_FILE,
                            start_line,
                            snippet,
                        ));
                    }
                }
            }
        }

        issues
    }
}

#[async_trait]
impl Analyzer for SemanticAnalyzer {
    fn stage(&self) -> AnalysisStage {
        AnalysisStage::Semantic
    }

    async fn analyze(&self, source: &str) -> Result<StageReport, ScoringError> {
        let issues = Self::scan(source);
        let score = deduct_score(&issues);
        Ok(StageReport {
            stage: AnalysisStage::Semantic,
            score,
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clean_source_scores_full() {
        let analyzer = SemanticAnalyzer::new();
        let report = analyzer
            .analyze("fn short() {\n    do_thing();\n}\n")
            .await
            .unwrap();
        assert_eq!(report.score, 100);
    }

    #[tokio::test]
    async fn test_todo_marker_flagged() {
        let analyzer = SemanticAnalyzer::new();
        let report = analyzer
            .analyze("fn f() {\n    // TODO: handle zero\n}\n")
            .await
            .unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Low);
        assert_eq!(report.issues[0].location.line, 2);
    }

    #[tokio::test]
    async fn test_long_function_flagged() {
        let mut source = String::from("function sprawling() {\n");
        for i in 0..70 {
            source.push_str(&format!("    step_{};\n", i));
        }
        source.push_str("}\n");

        let analyzer = SemanticAnalyzer::new();
        let report = analyzer.analyze(&source).await.unwrap();
        assert!(report
            .issues
            .iter()
            .any(|i| i.severity == Severity::Medium && i.location.line == 1));
    }

    #[tokio::test]
    async fn test_deep_nesting_flagged_once() {
        let source = "fn nested() {\n    { { { { { { deep(); } } } } } }\n}\n";
        let analyzer = SemanticAnalyzer::new();
        let report = analyzer.analyze(source).await.unwrap();
        let nesting: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.description.contains("nested"))
            .collect();
        assert_eq!(nesting.len(), 1);
    }
}
