use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{TorrentCandidate, Verdict};
use super::{Strategy, ValidationError};

/// How a composite folds its children's verdicts and scores into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationMode {
    /// Every child must accept; priority is the most conservative child's.
    #[default]
    And,
    /// One accepting child suffices; priority is the most permissive child's.
    Or,
    /// Weighted vote on verdicts, weighted mean on priorities.
    Weighted,
}

impl CombinationMode {
    pub const fn label(self) -> &'static str {
        match self {
            CombinationMode::And => "and",
            CombinationMode::Or => "or",
            CombinationMode::Weighted => "weighted",
        }
    }
}

/// Folds an ordered list of child strategies into a single verdict and score.
///
/// Children are themselves trait objects, so composites nest. With no children
/// the composite accepts everything at a neutral 0.5 priority.
#[derive(Debug)]
pub struct CompositeStrategy {
    children: Vec<Box<dyn Strategy>>,
    mode: CombinationMode,
    weights: Vec<f64>,
}

impl CompositeStrategy {
    pub fn new(children: Vec<Box<dyn Strategy>>, mode: CombinationMode, weights: Vec<f64>) -> Self {
        if children.is_empty() {
            warn!(mode = mode.label(), "composite strategy built without children");
        }
        Self {
            children,
            mode,
            weights,
        }
    }

    pub fn mode(&self) -> CombinationMode {
        self.mode
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Append a child at runtime. The weight list is left untouched; a
    /// resulting count mismatch degrades weighted combination to an
    /// unweighted average until `set_weights` is called again.
    pub fn push_child(&mut self, child: Box<dyn Strategy>) {
        self.children.push(child);
    }

    /// Remove and return the child at `index`, if any.
    pub fn remove_child(&mut self, index: usize) -> Option<Box<dyn Strategy>> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Replace the weight list. Refuses (leaving the current weights in
    /// place) when the count does not match the child count.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<(), ValidationError> {
        if weights.len() != self.children.len() {
            warn!(
                weights = weights.len(),
                children = self.children.len(),
                "rejecting weight update with mismatched count"
            );
            return Err(ValidationError::WeightCountMismatch {
                weights: weights.len(),
                children: self.children.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    fn combine_verdicts(&self, verdicts: &[Verdict]) -> bool {
        match self.mode {
            CombinationMode::And => verdicts.iter().all(|verdict| verdict.accepted),
            CombinationMode::Or => verdicts.iter().any(|verdict| verdict.accepted),
            CombinationMode::Weighted => {
                let votes: Vec<f64> = verdicts
                    .iter()
                    .map(|verdict| if verdict.accepted { 1.0 } else { 0.0 })
                    .collect();
                if self.weights.len() == votes.len() {
                    let total: f64 = self.weights.iter().sum();
                    if total > 0.0 {
                        let weighted: f64 = self
                            .weights
                            .iter()
                            .zip(&votes)
                            .map(|(weight, vote)| weight * vote)
                            .sum();
                        weighted / total >= 0.5
                    } else {
                        false
                    }
                } else {
                    // Mismatched weights degrade to an unweighted vote.
                    votes.iter().sum::<f64>() / votes.len() as f64 >= 0.5
                }
            }
        }
    }

    fn combine_priorities(&self, priorities: &[f64]) -> f64 {
        match self.mode {
            CombinationMode::And => priorities.iter().copied().fold(f64::INFINITY, f64::min),
            CombinationMode::Or => priorities.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            CombinationMode::Weighted => {
                if self.weights.len() == priorities.len() {
                    let total: f64 = self.weights.iter().sum();
                    if total > 0.0 {
                        self.weights
                            .iter()
                            .zip(priorities)
                            .map(|(weight, priority)| weight * priority)
                            .sum::<f64>()
                            / total
                    } else {
                        0.5
                    }
                } else {
                    priorities.iter().sum::<f64>() / priorities.len() as f64
                }
            }
        }
    }
}

impl Strategy for CompositeStrategy {
    fn name(&self) -> &str {
        "composite"
    }

    fn evaluate(&self, item: &TorrentCandidate) -> Verdict {
        if self.children.is_empty() {
            return Verdict::accept("no child strategies configured");
        }

        let verdicts: Vec<Verdict> = self
            .children
            .iter()
            .map(|child| child.evaluate(item))
            .collect();
        let accepted = self.combine_verdicts(&verdicts);

        let detail: Vec<String> = self
            .children
            .iter()
            .zip(&verdicts)
            .map(|(child, verdict)| {
                format!(
                    "{}: {}",
                    child.name(),
                    if verdict.accepted { "accept" } else { "reject" }
                )
            })
            .collect();
        let reason = format!("{} combination [{}]", self.mode.label(), detail.join(", "));

        debug!(
            strategy = self.name(),
            torrent = %item.id,
            accepted,
            reason = %reason,
            "composite decision"
        );
        Verdict { accepted, reason }
    }

    fn priority(&self, item: &TorrentCandidate) -> f64 {
        if self.children.is_empty() {
            return 0.5;
        }

        let priorities: Vec<f64> = self
            .children
            .iter()
            .map(|child| child.priority(item))
            .collect();
        self.combine_priorities(&priorities).clamp(0.0, 1.0)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.mode == CombinationMode::Weighted && !self.weights.is_empty() {
            if self.weights.len() != self.children.len() {
                return Err(ValidationError::WeightCountMismatch {
                    weights: self.weights.len(),
                    children: self.children.len(),
                });
            }
            if self.weights.iter().any(|weight| *weight < 0.0) {
                return Err(ValidationError::NegativeWeight);
            }
        }

        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }
}
