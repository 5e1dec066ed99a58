//! The predictor: the ensemble of models, the vote aggregator that turns
//! their votes into one bit, and the controller that grows a multi-bit
//! guess run while the ensemble stays confident.

use crate::bitstream::BitBuf;
use crate::key::FixedBits;
use crate::models::{ModelKind, PredictionModel, Vote};
use crate::position::Position;
use crate::{Context, Error};

/// A single aggregated bit decision.
#[derive(Copy, Clone, Debug)]
pub struct Guess {
    pub bit: u8,
    pub confidence: f64,
}

/// A vote remembered for the learning feedback: which model emitted it,
/// at which level, and which bit it backed.
#[derive(Copy, Clone, Debug)]
pub struct TaggedVote {
    pub model: usize,
    pub level: usize,
    pub bit: u8,
}

/// One speculative guess run: the bits, and for every bit the votes that
/// produced it, so the models can be graded once the truth is known.
pub struct GuessRun {
    pub bits: Vec<u8>,
    pub votes: Vec<Vec<TaggedVote>>,
}

/// The root mutable aggregate of one compress/decompress operation. It is
/// owned exclusively by the learning loop; a fresh predictor is built for
/// every invocation, so both sides of the codec evolve identical state
/// from identical history.
pub struct Predictor {
    models: Vec<PredictionModel>,
    position: Position,
    /// Total number of bits in the stream being processed.
    total_bits: usize,
    max_run: usize,
}

impl Predictor {
    pub fn new(ctx: &Context, total_bits: usize) -> Self {
        let models = ctx
            .models()
            .iter()
            .map(|kind| {
                let levels = match kind {
                    ModelKind::Statistics => ctx.statistics_levels(),
                    _ => ctx.dictionary_levels(),
                };
                PredictionModel::new(*kind, levels)
            })
            .collect();
        Self {
            models,
            position: Position::default(),
            total_bits,
            max_run: ctx.max_run(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn done(&self) -> bool {
        self.position.input >= self.total_bits
    }

    /// Combine one round of votes into a single guess. Every vote is
    /// weighted by confidence times performance; the bit with the larger
    /// weighted support wins, ties going to one. With no support at all
    /// the guess is an uninformed 1 at confidence 0.5.
    fn aggregate(votes: &[(usize, Vote)]) -> Guess {
        let mut support = [0.0f64; 2];
        for (_, vote) in votes {
            let weight = vote.weight.confidence * vote.weight.performance;
            support[vote.bit as usize] += weight;
        }
        let total = support[0] + support[1];
        if total <= 0.0 {
            return Guess {
                bit: 1,
                confidence: 0.5,
            };
        }
        let bit = if support[1] >= support[0] { 1 } else { 0 };
        Guess {
            bit,
            confidence: support[bit as usize] / total,
        }
    }

    /// Ask every registered model for its votes on the bit at the current
    /// virtual position.
    fn collect_votes(
        &self,
        history: &BitBuf,
        guessed: &[u8],
    ) -> Result<Vec<(usize, Vote)>, Error> {
        let fixed = FixedBits::new(history, self.position.input, guessed);
        let mut votes = Vec::new();
        for (index, model) in self.models.iter().enumerate() {
            for vote in model.votes(&fixed, guessed.len())? {
                votes.push((index, vote));
            }
        }
        Ok(votes)
    }

    /// Grow a guess run: keep appending aggregated bits while the product
    /// of their confidences stays above one half, up to the run cap and
    /// the end of the stream. The returned run is never empty.
    ///
    /// 'history' holds the committed bits; only bits below the current
    /// input position are read from it.
    pub fn guess_run(&mut self, history: &BitBuf) -> Result<GuessRun, Error> {
        debug_assert!(!self.done());
        let remaining = self.total_bits - self.position.input;
        let cap = self.max_run.min(remaining);

        let mut bits: Vec<u8> = Vec::new();
        let mut votes: Vec<Vec<TaggedVote>> = Vec::new();
        let mut confidence = 1.0f64;

        loop {
            self.position.run = bits.len();
            let round = self.collect_votes(history, &bits)?;
            let guess = Self::aggregate(&round);

            votes.push(
                round
                    .iter()
                    .map(|(model, vote)| TaggedVote {
                        model: *model,
                        level: vote.level,
                        bit: vote.bit,
                    })
                    .collect(),
            );
            bits.push(guess.bit);
            confidence *= guess.confidence;

            if confidence <= 0.5 || bits.len() >= cap {
                break;
            }
        }
        self.position.run = 0;
        Ok(GuessRun { bits, votes })
    }

    /// Feed the truth back into the models. 'actual' holds the committed
    /// bits of the run (the correct prefix, plus the corrected bit on a
    /// mismatch) and 'history' must already contain them. Grades every
    /// vote that was cast for a committed bit, records the observed
    /// patterns, and advances the stream position.
    pub fn commit(
        &mut self,
        history: &BitBuf,
        run: &GuessRun,
        actual: &[u8],
    ) {
        debug_assert!(actual.len() <= run.bits.len());
        debug_assert!(
            history.len() >= self.position.input + actual.len(),
            "History must contain the committed bits"
        );

        for (index, bit) in actual.iter().enumerate() {
            for vote in &run.votes[index] {
                self.models[vote.model]
                    .history
                    .record_outcome(vote.level, vote.bit == *bit);
            }
        }

        let start = self.position.input;
        for pos in start..start + actual.len() {
            for model in &mut self.models {
                model.observe(history, pos);
            }
        }
        self.position.advance(actual.len());
    }
}
