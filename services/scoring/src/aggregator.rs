//! Scoring aggregator — fan-out, fan-in, weighted combination
//!
//! The three stages run as independent concurrent tasks with no shared
//! mutable state; all must complete before aggregation. A stage failure
//! fails the whole run — the weighted formula is never computed from
//! partial results, since a defaulted zero would misrepresent risk.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{info, warn};
use types::ids::ContentId;
use types::issue::Issue;

use crate::analyzer::{AnalysisStage, Analyzer, StageReport};
use crate::content::ContentStore;
use crate::errors::ScoringError;
use crate::report::{AuditReport, StageScores};
use crate::semantic::SemanticAnalyzer;
use crate::simulation::SimulationAnalyzer;
use crate::static_analysis::StaticPatternAnalyzer;

/// Stage weights, fixed by contract: 40% static, 35% semantic, 25%
/// simulation. The combination rounds half-up.
const STATIC_WEIGHT: &str = "0.40";
const SEMANTIC_WEIGHT: &str = "0.35";
const SIMULATION_WEIGHT: &str = "0.25";

/// Deterministic artifact analyzed when the source blob cannot be fetched.
/// Scoring an absent artifact this way is an explicit, documented fallback;
/// the persisted report marks `source_missing`.
pub const FALLBACK_SOURCE: &str =
    "// source unavailable\n// analysis ran on the fallback artifact\n";

/// Result of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub final_score: u8,
    pub issues: Vec<Issue>,
    pub report_ref: ContentId,
}

/// Combine the three stage scores into the final score.
///
/// `round_half_up(0.40*static + 0.35*semantic + 0.25*simulation)`
pub fn combine_scores(static_score: u8, semantic_score: u8, simulation_score: u8) -> u8 {
    let weighted = Decimal::from(static_score) * Decimal::from_str_exact(STATIC_WEIGHT).unwrap()
        + Decimal::from(semantic_score) * Decimal::from_str_exact(SEMANTIC_WEIGHT).unwrap()
        + Decimal::from(simulation_score) * Decimal::from_str_exact(SIMULATION_WEIGHT).unwrap();

    weighted
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u8()
        .unwrap_or(100)
}

/// Runs the three analysis stages concurrently and combines their results.
pub struct ScoringAggregator {
    static_stage: Arc<dyn Analyzer>,
    semantic_stage: Arc<dyn Analyzer>,
    simulation_stage: Arc<dyn Analyzer>,
    store: Arc<dyn ContentStore>,
}

impl ScoringAggregator {
    /// Aggregator with the built-in analyzers.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_analyzers(
            Arc::new(StaticPatternAnalyzer::new()),
            Arc::new(SemanticAnalyzer::new()),
            Arc::new(SimulationAnalyzer::new()),
            store,
        )
    }

    /// Aggregator with substituted analysis stages. Each analyzer fills the
    /// slot whose weight it receives, regardless of its self-reported stage.
    pub fn with_analyzers(
        static_stage: Arc<dyn Analyzer>,
        semantic_stage: Arc<dyn Analyzer>,
        simulation_stage: Arc<dyn Analyzer>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            static_stage,
            semantic_stage,
            simulation_stage,
            store,
        }
    }

    /// Analyze the artifact behind `source_ref`.
    ///
    /// Fetches the source (falling back to [`FALLBACK_SOURCE`] if the blob
    /// is unknown), fans out the three stages, joins all results, combines
    /// the weighted score, persists the structured report, and returns the
    /// outcome.
    pub async fn analyze(
        &self,
        source_ref: &ContentId,
        now: i64,
    ) -> Result<AnalysisOutcome, ScoringError> {
        let (source, source_missing) = match self.store.get(source_ref).await? {
            Some(bytes) => (String::from_utf8_lossy(&bytes).into_owned(), false),
            None => {
                warn!(%source_ref, "source blob not found, analyzing fallback artifact");
                (FALLBACK_SOURCE.to_string(), true)
            }
        };
        let source = Arc::new(source);

        // Fan-out: three independent tasks, no shared mutable state
        let static_task = Self::spawn_stage(self.static_stage.clone(), source.clone());
        let semantic_task = Self::spawn_stage(self.semantic_stage.clone(), source.clone());
        let simulation_task = Self::spawn_stage(self.simulation_stage.clone(), source.clone());

        // Fan-in: all three must complete before aggregation
        let (static_result, semantic_result, simulation_result) =
            tokio::join!(static_task, semantic_task, simulation_task);

        let static_report = Self::join_stage(AnalysisStage::StaticPattern, static_result)?;
        let semantic_report = Self::join_stage(AnalysisStage::Semantic, semantic_result)?;
        let simulation_report = Self::join_stage(AnalysisStage::Simulation, simulation_result)?;

        let stage_scores = StageScores {
            static_pattern: static_report.score,
            semantic: semantic_report.score,
            simulation: simulation_report.score,
        };
        let final_score = combine_scores(
            stage_scores.static_pattern,
            stage_scores.semantic,
            stage_scores.simulation,
        );

        // Issue order is stable: static, then semantic, then simulation
        let mut issues = static_report.issues;
        issues.extend(semantic_report.issues);
        issues.extend(simulation_report.issues);

        let report = AuditReport {
            source_ref: source_ref.clone(),
            produced_at: now,
            source_missing,
            stage_scores,
            final_score,
            risk_tier: AuditReport::tier(final_score, &issues),
            recommendations: AuditReport::recommendations_for(&issues),
            issues,
        };

        let bytes = serde_json::to_vec(&report)
            .map_err(|e| ScoringError::Store(crate::errors::ContentStoreError::Unavailable {
                reason: e.to_string(),
            }))?;
        let report_ref = self.store.put(bytes).await?;

        info!(
            %source_ref,
            final_score,
            issue_count = report.issues.len(),
            tier = %report.risk_tier,
            "analysis complete"
        );

        Ok(AnalysisOutcome {
            final_score,
            issues: report.issues,
            report_ref,
        })
    }

    fn spawn_stage(
        analyzer: Arc<dyn Analyzer>,
        source: Arc<String>,
    ) -> tokio::task::JoinHandle<Result<StageReport, ScoringError>> {
        tokio::spawn(async move { analyzer.analyze(&source).await })
    }

    fn join_stage(
        stage: AnalysisStage,
        joined: Result<Result<StageReport, ScoringError>, tokio::task::JoinError>,
    ) -> Result<StageReport, ScoringError> {
        let report = joined.map_err(|_| ScoringError::StageAborted { stage })??;
        if report.score > 100 {
            return Err(ScoringError::InvalidStageScore {
                stage,
                score: report.score,
            });
        }
        Ok(report)
    }
}
