//! The frequency model. It keeps one global occurrence count per exact
//! bit pattern and votes by summing the counts of every pattern that is
//! still consistent with the bits already fixed. Unlike the dictionary
//! model it does not care what preceded a pattern, only how often the
//! pattern itself has occurred anywhere in the stream.

use super::{tally_vote, window_key, History, LevelSchedule, Vote};
use crate::bitstream::BitBuf;
use crate::key::{consistent, FixedBits, Key};
use crate::position::sample_offset;

/// One vote per consulted level, in ascending level order.
pub(crate) fn votes(
    history: &History,
    ceiling: usize,
    fixed: &FixedBits,
    run: usize,
) -> Vec<Vote> {
    let mut votes = Vec::new();
    for level in LevelSchedule::new(ceiling) {
        let offset = sample_offset(level, run);
        let mut zeros: u64 = 0;
        let mut ones: u64 = 0;

        // Enumerate every combination of 'level' bits, keep the ones that
        // were actually observed and do not contradict fixed bits, and
        // tally them by the bit each hypothesis places at the sample
        // offset.
        for value in 0..(1u64 << level) {
            let key = Key::new(level, value as u32);
            let Some(&count) = history.counts.get(&key) else {
                continue;
            };
            if !consistent(key, offset, fixed) {
                continue;
            }
            if key.bit(offset) == 1 {
                ones += count;
            } else {
                zeros += count;
            }
        }
        votes.push(tally_vote(zeros, ones, level, history));
    }
    votes
}

/// Count the pattern windows that end at the newly committed bit 'pos'.
pub(crate) fn observe(
    history: &mut History,
    ceiling: usize,
    bits: &BitBuf,
    pos: usize,
) {
    for level in LevelSchedule::new(ceiling) {
        let Some(key) = window_key(bits, pos, level) else {
            break;
        };
        *history.counts.entry(key).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_evidence_yields_zero_confidence() {
        let history = History::default();
        let stream = BitBuf::new();
        let fixed = FixedBits::new(&stream, 0, &[]);

        let votes = votes(&history, 1, &fixed, 0);
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].level, 1);
        assert_eq!(votes[0].weight.confidence, 0.0);
        assert_eq!(votes[0].weight.performance, 0.0);
    }

    #[test]
    fn test_repeat_of_recorded_context_is_certain() {
        // The stream so far is a single 1 bit.
        let mut stream = BitBuf::new();
        stream.push(1);

        let mut history = History::default();
        observe(&mut history, 1, &stream, 0);
        assert_eq!(history.counts[&Key::new(1, 1)], 1);

        // The next bit is predicted as 1 with full confidence.
        let fixed = FixedBits::new(&stream, 1, &[]);
        let votes = votes(&history, 1, &fixed, 0);
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].bit, 1);
        assert_eq!(votes[0].weight.confidence, 1.0);
    }

    #[test]
    fn test_majority_and_confidence() {
        let mut history = History::default();
        history.counts.insert(Key::new(1, 0), 3);
        history.counts.insert(Key::new(1, 1), 1);

        let stream = BitBuf::new();
        let fixed = FixedBits::new(&stream, 0, &[]);
        let votes = votes(&history, 1, &fixed, 0);
        assert_eq!(votes[0].bit, 0);
        assert_eq!(votes[0].weight.confidence, 0.75);
    }

    #[test]
    fn test_ties_resolve_toward_one() {
        let mut history = History::default();
        history.counts.insert(Key::new(1, 0), 2);
        history.counts.insert(Key::new(1, 1), 2);

        let stream = BitBuf::new();
        let fixed = FixedBits::new(&stream, 0, &[]);
        let votes = votes(&history, 1, &fixed, 0);
        assert_eq!(votes[0].bit, 1);
        assert_eq!(votes[0].weight.confidence, 0.5);
    }

    #[test]
    fn test_observe_records_every_scheduled_window() {
        let mut stream = BitBuf::new();
        for bit in [1, 0, 1, 1] {
            stream.push(bit);
        }
        let mut history = History::default();
        observe(&mut history, 4, &stream, 3);

        assert_eq!(history.counts[&Key::new(1, 0b1)], 1);
        assert_eq!(history.counts[&Key::new(2, 0b11)], 1);
        assert_eq!(history.counts[&Key::new(4, 0b1011)], 1);
        // Level 3 is not on the schedule.
        assert!(history.counts.get(&Key::new(3, 0b011)).is_none());
    }
}
