//! The voting models. Every model answers one question per bit decision:
//! given the bits that are already fixed, which bit comes next and with
//! what weight. Models are a closed set of tagged variants behind one
//! voting capability; a new model is added by extending [`ModelKind`] and
//! its dispatch arm, not by special-casing call sites.

pub mod dictionary;
pub mod statistics;

use crate::bitstream::BitBuf;
use crate::key::{FixedBits, Key};
use crate::Error;
use std::collections::HashMap;

/// The model variants. `Statistics` and `HistoricDictionary` carry voting
/// behavior; `FutureDictionary` and `Distance` are reserved extension
/// points with the same contract but no implementation yet.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ModelKind {
    Statistics,
    HistoricDictionary,
    FutureDictionary,
    Distance,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Statistics => "Statistics",
            ModelKind::HistoricDictionary => "HistoricDictionary",
            ModelKind::FutureDictionary => "FutureDictionary",
            ModelKind::Distance => "Distance",
        }
    }
}

/// The weight attached to a vote. Confidence is the fraction of context
/// evidence that agrees with the predicted bit; performance is the
/// model's smoothed historical accuracy at this context length.
#[derive(Copy, Clone, Debug)]
pub struct VoteWeight {
    pub confidence: f64,
    pub performance: f64,
}

/// One model-and-level prediction of a single bit.
#[derive(Copy, Clone, Debug)]
pub struct Vote {
    pub bit: u8,
    pub level: usize,
    pub weight: VoteWeight,
}

/// A correct/incorrect counter pair. The incorrect slot is clamped to at
/// least one when the ratio is read (Laplace), so the accuracy is always
/// well defined and a model must earn its way up from zero.
#[derive(Copy, Clone, Debug, Default)]
pub struct Performance {
    correct: u64,
    incorrect: u64,
}

impl Performance {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn ratio(&self) -> f64 {
        self.correct as f64 / (self.correct + self.incorrect.max(1)) as f64
    }
}

/// Everything a model has learned from the stream so far: occurrence
/// counts per context key, continuation tables per context key, and a
/// per-level accuracy record. Append-only within one operation; counters
/// only grow.
#[derive(Default)]
pub struct History {
    /// Global occurrence counts of exact bit patterns (frequency model).
    pub counts: HashMap<Key, u64>,
    /// What followed each context, and how often (dictionary model).
    pub continuations: HashMap<Key, HashMap<Key, u64>>,
    /// Voting accuracy per context length.
    performance: HashMap<usize, Performance>,
}

impl History {
    /// The smoothed accuracy at 'level'. Unseen levels score zero.
    pub fn performance_at(&self, level: usize) -> f64 {
        self.performance
            .get(&level)
            .copied()
            .unwrap_or_default()
            .ratio()
    }

    pub fn record_outcome(&mut self, level: usize, correct: bool) {
        self.performance.entry(level).or_default().record(correct);
    }
}

/// The consulted context lengths: 1, 2, 4, 8, and from there in steps of
/// eight, up to the ceiling. The step doubles after every consulted level
/// and is capped at eight, so long contexts are sampled sparsely.
pub struct LevelSchedule {
    next: usize,
    step: usize,
    ceiling: usize,
}

impl LevelSchedule {
    pub fn new(ceiling: usize) -> Self {
        Self {
            next: 1,
            step: 1,
            ceiling,
        }
    }
}

impl Iterator for LevelSchedule {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next > self.ceiling {
            return None;
        }
        let level = self.next;
        self.next = level + self.step;
        self.step = (self.step * 2).min(8);
        Some(level)
    }
}

/// One registered model: its variant tag, its level ceiling and the
/// history it accumulates over the stream.
pub struct PredictionModel {
    kind: ModelKind,
    levels: usize,
    pub history: History,
}

impl PredictionModel {
    pub fn new(kind: ModelKind, levels: usize) -> Self {
        Self {
            kind,
            levels,
            history: History::default(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Emit this model's votes for the bit under prediction. 'fixed' is
    /// the view of already-fixed bits and 'run' the virtual position
    /// inside the active guess run.
    pub fn votes(
        &self,
        fixed: &FixedBits,
        run: usize,
    ) -> Result<Vec<Vote>, Error> {
        match self.kind {
            ModelKind::Statistics => {
                Ok(statistics::votes(&self.history, self.levels, fixed, run))
            }
            ModelKind::HistoricDictionary => {
                Ok(dictionary::votes(&self.history, self.levels, fixed, run))
            }
            ModelKind::FutureDictionary | ModelKind::Distance => {
                Err(Error::UnknownModel(self.kind.name()))
            }
        }
    }

    /// Fold the committed bit at absolute position 'pos' into the
    /// history tables. 'history' must already contain that bit.
    pub fn observe(&mut self, history: &BitBuf, pos: usize) {
        match self.kind {
            ModelKind::Statistics => {
                statistics::observe(&mut self.history, self.levels, history, pos)
            }
            ModelKind::HistoricDictionary => {
                dictionary::observe(&mut self.history, self.levels, history, pos)
            }
            // Extension variants learn nothing yet.
            ModelKind::FutureDictionary | ModelKind::Distance => {}
        }
    }
}

/// Shared vote construction: fold the tallies for zero and one into a
/// majority bit (ties go to one) and a confidence. No evidence at all
/// yields confidence zero, a deliberate "no information" signal.
pub(crate) fn tally_vote(
    zeros: u64,
    ones: u64,
    level: usize,
    history: &History,
) -> Vote {
    let bit = if ones >= zeros { 1 } else { 0 };
    let majority = zeros.max(ones);
    let total = (zeros + ones).max(1);
    Vote {
        bit,
        level,
        weight: VoteWeight {
            confidence: majority as f64 / total as f64,
            performance: history.performance_at(level),
        },
    }
}

/// The key of the 'level' committed bits ending at absolute position
/// 'pos', or None when the window reaches past the stream start.
pub(crate) fn window_key(
    history: &BitBuf,
    pos: usize,
    level: usize,
) -> Option<Key> {
    if pos + 1 < level {
        return None;
    }
    let mut bits: u32 = 0;
    for i in 0..level {
        bits = (bits << 1) | history.get(pos + 1 - level + i) as u32;
    }
    Some(Key::new(level, bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_smoothing() {
        let mut perf = Performance::default();
        // Zero observations: 0 / (0 + 1).
        assert_eq!(perf.ratio(), 0.0);
        // A single correct observation: 1 / (1 + 1).
        perf.record(true);
        assert_eq!(perf.ratio(), 0.5);
        // One correct and one incorrect: 1 / 2.
        perf.record(false);
        assert_eq!(perf.ratio(), 0.5);
        perf.record(false);
        assert!((perf.ratio() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_history_defaults_to_zero_performance() {
        let mut history = History::default();
        assert_eq!(history.performance_at(3), 0.0);
        history.record_outcome(3, true);
        assert_eq!(history.performance_at(3), 0.5);
        assert_eq!(history.performance_at(4), 0.0);
    }

    #[test]
    fn test_level_schedule_decimation() {
        let levels: Vec<usize> = LevelSchedule::new(8).collect();
        assert_eq!(levels, vec![1, 2, 4, 8]);
        let levels: Vec<usize> = LevelSchedule::new(32).collect();
        assert_eq!(levels, vec![1, 2, 4, 8, 16, 24, 32]);
        let levels: Vec<usize> = LevelSchedule::new(3).collect();
        assert_eq!(levels, vec![1, 2]);
    }

    #[test]
    fn test_window_key() {
        let mut buf = BitBuf::new();
        for bit in [1, 0, 1, 1, 0] {
            buf.push(bit);
        }
        assert_eq!(window_key(&buf, 4, 3).unwrap().to_string(), "110");
        assert_eq!(window_key(&buf, 4, 5).unwrap().to_string(), "10110");
        assert_eq!(window_key(&buf, 0, 1).unwrap().to_string(), "1");
        assert!(window_key(&buf, 1, 3).is_none());
    }

    #[test]
    fn test_extension_models_have_no_voting_behavior() {
        let model =
            PredictionModel::new(ModelKind::Distance, 4);
        let history = BitBuf::new();
        let fixed = FixedBits::new(&history, 0, &[]);
        assert!(matches!(
            model.votes(&fixed, 0),
            Err(Error::UnknownModel("Distance"))
        ));
    }
}
