//! Cut kinds and tri-state cut values
//!
//! The set of cuts is a closed, ordered enumeration shared by every dataset.
//! Range queries over the cut table rely on the declaration order below, so
//! new kinds must be appended before `Selection` only with care.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SvjError;

/// Selection cuts tracked per event, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CutKind {
    /// Lepton multiplicity veto
    LeptonCounts = 0,
    /// Minimum jet multiplicity
    JetCounts = 1,
    /// Leading jet pseudorapidity window
    JetEtas = 2,
    /// Leading dijet delta-eta
    JetDeltaEtas = 3,
    /// Missing-energy to transverse-mass ratio
    MetRatio = 4,
    /// Leading jet transverse momentum
    JetPt = 5,
    /// Dijet invariant mass
    JetDiJet = 6,
    /// Absolute missing-energy threshold
    MetValue = 7,
    /// Aggregate preselection flag
    Preselection = 8,
    /// Tightened missing-energy ratio
    MetRatioTight = 9,
    /// Final selection flag
    Selection = 10,
}

impl CutKind {
    /// Number of cut kinds
    pub const COUNT: usize = 11;

    /// Every cut kind in index order
    pub const ALL: [CutKind; CutKind::COUNT] = [
        CutKind::LeptonCounts,
        CutKind::JetCounts,
        CutKind::JetEtas,
        CutKind::JetDeltaEtas,
        CutKind::MetRatio,
        CutKind::JetPt,
        CutKind::JetDiJet,
        CutKind::MetValue,
        CutKind::Preselection,
        CutKind::MetRatioTight,
        CutKind::Selection,
    ];

    /// Position of this cut in the table
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Cut kind at `index`, if any
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable name used in configs and printed tables
    pub const fn name(self) -> &'static str {
        match self {
            CutKind::LeptonCounts => "leptonCounts",
            CutKind::JetCounts => "jetCounts",
            CutKind::JetEtas => "jetEtas",
            CutKind::JetDeltaEtas => "jetDeltaEtas",
            CutKind::MetRatio => "metRatio",
            CutKind::JetPt => "jetPt",
            CutKind::JetDiJet => "jetDiJet",
            CutKind::MetValue => "metValue",
            CutKind::Preselection => "preselection",
            CutKind::MetRatioTight => "metRatioTight",
            CutKind::Selection => "selection",
        }
    }
}

impl fmt::Display for CutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CutKind {
    type Err = SvjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CutKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SvjError::invalid_config(format!("unknown cut kind '{}'", s)))
    }
}

/// Value of one cut for the current event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CutState {
    /// Not evaluated for this event
    #[default]
    Unset,
    /// Evaluated and failed
    Fail,
    /// Evaluated and passed
    Pass,
}

impl CutState {
    /// Legacy integer encoding: -1 unset, 0 fail, 1 pass
    pub const fn as_i8(self) -> i8 {
        match self {
            CutState::Unset => -1,
            CutState::Fail => 0,
            CutState::Pass => 1,
        }
    }

    /// True only for `Pass`
    pub const fn is_pass(self) -> bool {
        matches!(self, CutState::Pass)
    }

    /// True only for `Fail`
    pub const fn is_fail(self) -> bool {
        matches!(self, CutState::Fail)
    }
}

impl From<bool> for CutState {
    fn from(passed: bool) -> Self {
        if passed {
            CutState::Pass
        } else {
            CutState::Fail
        }
    }
}

impl fmt::Display for CutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// How an unset cut is treated by range queries
///
/// `Pass` reproduces the historical behavior where a never-evaluated cut
/// does not veto an event. `Fail` is the stricter alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsetPolicy {
    /// Unset cuts count as passing
    #[default]
    Pass,
    /// Unset cuts count as failing
    Fail,
}

impl UnsetPolicy {
    /// Whether `state` satisfies a range query under this policy
    #[inline]
    pub const fn accepts(self, state: CutState) -> bool {
        match (self, state) {
            (_, CutState::Pass) => true,
            (_, CutState::Fail) => false,
            (UnsetPolicy::Pass, CutState::Unset) => true,
            (UnsetPolicy::Fail, CutState::Unset) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_declaration_order() {
        for (i, kind) in CutKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(CutKind::from_index(i), Some(*kind));
        }
        assert_eq!(CutKind::from_index(CutKind::COUNT), None);
        assert_eq!(CutKind::Selection.index(), CutKind::COUNT - 1);
    }

    #[test]
    fn test_name_round_trip() {
        for kind in CutKind::ALL {
            assert_eq!(kind.name().parse::<CutKind>().unwrap(), kind);
        }
        assert_eq!("METRATIO".parse::<CutKind>().unwrap(), CutKind::MetRatio);
        assert!("bogus".parse::<CutKind>().is_err());
    }

    #[test]
    fn test_legacy_encoding() {
        assert_eq!(CutState::Unset.as_i8(), -1);
        assert_eq!(CutState::Fail.as_i8(), 0);
        assert_eq!(CutState::Pass.as_i8(), 1);
        assert_eq!(CutState::default(), CutState::Unset);
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(CutState::from(true), CutState::Pass);
        assert_eq!(CutState::from(false), CutState::Fail);
    }

    #[test]
    fn test_unset_policy() {
        assert!(UnsetPolicy::Pass.accepts(CutState::Unset));
        assert!(!UnsetPolicy::Fail.accepts(CutState::Unset));
        for policy in [UnsetPolicy::Pass, UnsetPolicy::Fail] {
            assert!(policy.accepts(CutState::Pass));
            assert!(!policy.accepts(CutState::Fail));
        }
    }

    #[test]
    fn test_unset_policy_serde() {
        let p: UnsetPolicy = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(p, UnsetPolicy::Fail);
        assert_eq!(serde_json::to_string(&UnsetPolicy::Pass).unwrap(), "\"pass\"");
    }
}
