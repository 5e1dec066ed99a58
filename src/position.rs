//! Position arithmetic for the two coordinate systems of the engine: the
//! absolute bit index into the stream, and the "virtual" index inside the
//! guess run that is currently in flight.

/// The position of the next bit to be resolved. The 'input' field is the
/// absolute bit index of the first bit that has not been committed to the
/// stream; 'run' is the offset inside the active guess run. 'run' resets
/// to zero whenever a run is committed, so the bit under prediction always
/// sits at absolute index `input + run`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub input: usize,
    pub run: usize,
}

impl Position {
    /// Commit 'bits' resolved bits: fold the run into the absolute
    /// position and start a fresh run.
    pub fn advance(&mut self, bits: usize) {
        self.input += bits;
        self.run = 0;
    }
}

/// Pick the sample alignment for a context of 'level' bits at position
/// 'relative'. Among the 'level' candidate offsets the one with the largest
/// stride that divides evenly is chosen, so longer contexts are consulted
/// on a sparser periodic schedule. Stride 1 always divides, so the search
/// always terminates with an offset below 'level'.
pub fn sample_offset(level: usize, relative: usize) -> usize {
    debug_assert!(level >= 1);
    for stride in (1..=level).rev() {
        let offset = level - stride;
        if relative >= offset && (relative - offset) % stride == 0 {
            return offset;
        }
    }
    // Unreachable: offset == relative matches when relative < level, and
    // stride 1 matches otherwise.
    0
}
