//! CutTable: per-event ledger of tri-state cut decisions
//!
//! One entry per [`CutKind`], reset with [`CutTable::init`] at the start of
//! every record. Cuts carry no dependencies on each other; callers decide
//! evaluation order and short-circuiting.
//!
//! Range queries follow the table's [`UnsetPolicy`]. The default policy
//! lets a never-evaluated cut pass, matching the historical behavior of the
//! analysis code.

use serde::Serialize;
use std::fmt;
use std::ops::Range;
use svj_core::{CutKind, CutState, SvjError, SvjResult, UnsetPolicy};

/// Fixed-size table of cut values for the current event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CutTable {
    values: [CutState; CutKind::COUNT],
    policy: UnsetPolicy,
}

impl Default for CutTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CutTable {
    /// All cuts unset, unset-passes policy
    pub fn new() -> Self {
        Self::with_policy(UnsetPolicy::default())
    }

    /// All cuts unset, with an explicit policy for range queries
    pub fn with_policy(policy: UnsetPolicy) -> Self {
        Self {
            values: [CutState::Unset; CutKind::COUNT],
            policy,
        }
    }

    /// Policy used by range queries
    pub fn policy(&self) -> UnsetPolicy {
        self.policy
    }

    /// Change the policy used by range queries
    pub fn set_policy(&mut self, policy: UnsetPolicy) {
        self.policy = policy;
    }

    /// Reset every cut to unset
    pub fn init(&mut self) {
        self.values = [CutState::Unset; CutKind::COUNT];
    }

    /// Record the outcome of `kind`; a second call overwrites the first
    #[inline]
    pub fn set(&mut self, kind: CutKind, passed: bool) {
        self.values[kind.index()] = CutState::from(passed);
    }

    /// Record `passed` for `kind` and hand it back, for use inside conditions
    #[inline]
    pub fn record(&mut self, kind: CutKind, passed: bool) -> bool {
        self.set(kind, passed);
        passed
    }

    /// Current value of `kind`
    #[inline]
    pub fn get(&self, kind: CutKind) -> CutState {
        self.values[kind.index()]
    }

    /// True only if `kind` was set to pass this event
    #[inline]
    pub fn passed(&self, kind: CutKind) -> bool {
        self.get(kind).is_pass()
    }

    /// Whether every cut with index in `[start, end)` is accepted by the policy
    ///
    /// An empty range is vacuously true.
    ///
    /// # Errors
    ///
    /// `InvalidCutRange` if `start > end` or `end > CutKind::COUNT`.
    pub fn all_pass(&self, start: usize, end: usize) -> SvjResult<bool> {
        if start > end || end > CutKind::COUNT {
            return Err(SvjError::InvalidCutRange {
                start,
                end,
                count: CutKind::COUNT,
            });
        }
        let policy = self.policy;
        Ok(self.values[start..end]
            .iter()
            .all(|&state| policy.accepts(state)))
    }

    /// [`all_pass`](Self::all_pass) over a range of index positions
    pub fn all_pass_range(&self, range: Range<usize>) -> SvjResult<bool> {
        self.all_pass(range.start, range.end)
    }

    /// Whether every cut from the first through `last` (inclusive) passes
    pub fn all_pass_through(&self, last: CutKind) -> bool {
        let policy = self.policy;
        self.values[..=last.index()]
            .iter()
            .all(|&state| policy.accepts(state))
    }

    /// Cuts and their values in index order
    pub fn iter(&self) -> impl Iterator<Item = (CutKind, CutState)> + '_ {
        CutKind::ALL.iter().copied().zip(self.values.iter().copied())
    }

    /// Values in the legacy -1 / 0 / 1 encoding
    pub fn as_legacy(&self) -> [i8; CutKind::COUNT] {
        self.values.map(CutState::as_i8)
    }
}

impl fmt::Display for CutTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for (i, value) in self.as_legacy().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str(" }")
    }
}
