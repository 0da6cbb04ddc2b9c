//! Simulation analysis stage
//!
//! Runs pseudo-random execution probes against the artifact. The probe
//! sequence is seeded from the content hash, so the same source always
//! produces the same anomalies and score — a stand-in for a real fuzzing
//! engine that keeps the pipeline deterministic and testable.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use types::issue::{Issue, IssueKind, Severity};

use crate::analyzer::{deduct_score, AnalysisStage, Analyzer, StageReport};
use crate::errors::ScoringError;

const ARTIFACT_FILE: &str = "artifact";

/// Probes per run. Fixed so runs over the same artifact are comparable.
const PROBE_COUNT: usize = 32;

/// Constructs a probe can destabilize when fed hostile input.
const PROBE_TARGETS: &[(&str, &str)] = &[
    ("/", "Division destabilized by a zero-valued probe input"),
    ("[", "Index access destabilized by an out-of-range probe input"),
    ("transfer", "Value transfer reverted under a hostile probe sequence"),
    ("withdraw", "Withdrawal path re-entered by the probe harness"),
];

/// Built-in simulation analyzer.
#[derive(Debug, Default)]
pub struct SimulationAnalyzer;

impl SimulationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Seed derived from the artifact content so probe runs replay exactly.
    fn seed_for(source: &str) -> u64 {
        let digest = Sha256::digest(source.as_bytes());
        u64::from_le_bytes(digest[..8].try_into().unwrap_or([0u8; 8]))
    }

    fn probe(source: &str) -> Vec<Issue> {
        let lines: Vec<&str> = source.lines().collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let mut rng = StdRng::seed_from_u64(Self::seed_for(source));
        let mut issues = Vec::new();

        for _ in 0..PROBE_COUNT {
            let idx = rng.gen_range(0..lines.len());
            let hostile = rng.gen_range(0u32..8) == 0;
            if !hostile {
                continue;
            }
            let line = lines[idx];
            for (needle, description) in PROBE_TARGETS {
                if line.contains(needle) {
                    issues.push(Issue::new(
                        IssueKind::SimulationAnomaly,
                        Severity::Medium,
                        *description,
                        ARTIFACT_FILE,
                        (idx + 1) as u32,
                        line.trim(),
                    ));
                    break;
                }
            }
        }

        issues
    }
}

#[async_trait]
impl Analyzer for SimulationAnalyzer {
    fn stage(&self) -> AnalysisStage {
        AnalysisStage::Simulation
    }

    async fn analyze(&self, source: &str) -> Result<StageReport, ScoringError> {
        let issues = Self::probe(source);
        let score = deduct_score(&issues);
        Ok(StageReport {
            stage: AnalysisStage::Simulation,
            score,
            issues,
        })
    }
}
