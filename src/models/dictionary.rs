//! The pattern-dictionary model. For every context it has seen, it keeps
//! a table of the bit patterns that followed and how often. A vote is the
//! tally of the continuations recorded after the context that is actually
//! in front of us, so this model conditions on what happened after this
//! exact prefix, not on global pattern frequency.

use super::{tally_vote, window_key, History, LevelSchedule, Vote};
use crate::bitstream::BitBuf;
use crate::key::{consistent, historic_key, FixedBits};
use crate::position::sample_offset;

/// One vote per consulted level. A level is only consulted once the
/// active run has guessed at least that many bits; the level loop ends
/// early when the run (or the stream behind it) is too short.
pub(crate) fn votes(
    history: &History,
    ceiling: usize,
    fixed: &FixedBits,
    run: usize,
) -> Vec<Vote> {
    let mut votes = Vec::new();
    for level in LevelSchedule::new(ceiling) {
        if run < level {
            break;
        }
        let offset = sample_offset(level, run);
        // The lookup context is the window that precedes the continuation
        // window the sample offset points into.
        let Some(context) = historic_key(level, offset, fixed) else {
            break;
        };

        let mut zeros: u64 = 0;
        let mut ones: u64 = 0;
        if let Some(table) = history.continuations.get(&context) {
            for (continuation, count) in table {
                if !consistent(*continuation, offset, fixed) {
                    continue;
                }
                if continuation.bit(offset) == 1 {
                    ones += count;
                } else {
                    zeros += count;
                }
            }
        }
        votes.push(tally_vote(zeros, ones, level, history));
    }
    votes
}

/// Record the continuation window ending at the newly committed bit
/// 'pos' under the context window that preceded it.
pub(crate) fn observe(
    history: &mut History,
    ceiling: usize,
    bits: &BitBuf,
    pos: usize,
) {
    for level in LevelSchedule::new(ceiling) {
        // Both the context and the continuation must fit in the stream.
        if pos + 1 < 2 * level {
            break;
        }
        let context = window_key(bits, pos - level, level).unwrap();
        let continuation = window_key(bits, pos, level).unwrap();
        *history
            .continuations
            .entry(context)
            .or_default()
            .entry(continuation)
            .or_insert(0) += 1;
    }
}
