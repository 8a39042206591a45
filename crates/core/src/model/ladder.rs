use thiserror::Error;

//
// ─── LADDER ────────────────────────────────────────────────────────────────────
//

/// The reward ladder: an ascending sequence of amounts a correct streak climbs,
/// plus the checkpoint subset that survives losing all lives.
///
/// Immutable once constructed; a session borrows it for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ladder {
    values: Vec<u64>,
    checkpoints: Vec<u64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LadderError {
    #[error("ladder has no values")]
    Empty,

    #[error("ladder values must be strictly increasing and positive")]
    NotIncreasing,

    #[error("checkpoint {0} is not a ladder value")]
    UnknownCheckpoint(u64),
}

impl Ladder {
    /// Build a ladder from its values and checkpoint subset.
    ///
    /// Checkpoints are stored sorted ascending regardless of input order.
    ///
    /// # Errors
    ///
    /// Returns `LadderError` if `values` is empty, not strictly increasing
    /// from a positive start, or if any checkpoint is not a ladder value.
    pub fn new(values: Vec<u64>, mut checkpoints: Vec<u64>) -> Result<Self, LadderError> {
        if values.is_empty() {
            return Err(LadderError::Empty);
        }
        if values[0] == 0 || values.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LadderError::NotIncreasing);
        }
        checkpoints.sort_unstable();
        checkpoints.dedup();
        for cp in &checkpoints {
            if !values.contains(cp) {
                return Err(LadderError::UnknownCheckpoint(*cp));
            }
        }
        Ok(Self {
            values,
            checkpoints,
        })
    }

    /// The default game ladder: ten rungs with safe amounts at 100 and 1000.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            values: vec![1, 5, 10, 50, 100, 150, 250, 500, 750, 1000],
            checkpoints: vec![100, 1000],
        }
    }

    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[u64] {
        &self.checkpoints
    }

    #[must_use]
    pub fn top(&self) -> u64 {
        *self.values.last().unwrap_or(&0)
    }

    /// The value one rung above `bank`.
    ///
    /// A bank that is not on the ladder (0 at session start) maps to the first
    /// rung; the top rung saturates to itself.
    #[must_use]
    pub fn next_value(&self, bank: u64) -> u64 {
        match self.values.iter().position(|v| *v == bank) {
            None => self.values[0],
            Some(pos) => *self.values.get(pos + 1).unwrap_or(&self.values[pos]),
        }
    }

    /// Greatest checkpoint ≤ `bank`, or 0 if none qualifies. This is the safe
    /// amount a player falls back to after losing all lives.
    #[must_use]
    pub fn last_checkpoint_at_or_below(&self, bank: u64) -> u64 {
        self.checkpoints
            .iter()
            .copied()
            .filter(|cp| *cp <= bank)
            .max()
            .unwrap_or(0)
    }

    /// Checkpoints reached by `bank` that are not in `seen` yet, ascending.
    ///
    /// A single bank jump can cross several checkpoints; each is reported
    /// exactly once so the caller can queue them individually.
    #[must_use]
    pub fn newly_reached_checkpoints(&self, bank: u64, seen: &[u64]) -> Vec<u64> {
        self.checkpoints
            .iter()
            .copied()
            .filter(|cp| *cp <= bank && !seen.contains(cp))
            .collect()
    }

    /// The sequence of amounts the reveal animation counts through on its way
    /// to `target`: every ladder value up to and including it.
    ///
    /// An empty result means the display should simply show 0.
    #[must_use]
    pub fn reveal_steps(&self, target: u64) -> Vec<u64> {
        self.values
            .iter()
            .copied()
            .filter(|v| *v <= target)
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
