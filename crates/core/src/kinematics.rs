//! Kinematic value objects materialized from columns
//!
//! - `LorentzVector`: full four-vector in (px, py, pz, e), built from
//!   collider coordinates (pt, eta, phi, mass)
//! - `Composite`: lightweight 2–4 component object (pt, eta[, phi[, mass]])
//!   for variables that do not need full four-vector math
//!
//! Formulas are the textbook ones; no numerical-analysis guarantees are made.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Pseudorapidity reported for vectors along the beam axis
const ETA_AT_ZERO_PT: f64 = 1.0e10;

/// Four-momentum in Cartesian components
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LorentzVector {
    /// x momentum
    pub px: f64,
    /// y momentum
    pub py: f64,
    /// z momentum
    pub pz: f64,
    /// Energy
    pub e: f64,
}

impl LorentzVector {
    /// Create from Cartesian components
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Create from transverse momentum, pseudorapidity, azimuth and mass
    ///
    /// A negative mass is treated as spacelike: `e = sqrt(max(p² - m², 0))`.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        let pt = pt.abs();
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p2 = px * px + py * py + pz * pz;
        let e = if m >= 0.0 {
            (p2 + m * m).sqrt()
        } else {
            (p2 - m * m).max(0.0).sqrt()
        };
        Self { px, py, pz, e }
    }

    /// Transverse momentum
    #[inline]
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Magnitude of the three-momentum
    #[inline]
    pub fn p(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    /// Pseudorapidity; ±1e10 along the beam axis, 0 for a null vector
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt > 0.0 {
            (self.pz / pt).asinh()
        } else if self.pz > 0.0 {
            ETA_AT_ZERO_PT
        } else if self.pz < 0.0 {
            -ETA_AT_ZERO_PT
        } else {
            0.0
        }
    }

    /// Azimuthal angle in `(-π, π]`
    #[inline]
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            0.0
        } else {
            self.py.atan2(self.px)
        }
    }

    /// Invariant mass squared
    #[inline]
    pub fn m2(&self) -> f64 {
        self.e * self.e - (self.px * self.px + self.py * self.py + self.pz * self.pz)
    }

    /// Invariant mass; negative for spacelike vectors
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// Transverse mass with respect to the beam axis
    pub fn mt(&self) -> f64 {
        let mt2 = self.e * self.e - self.pz * self.pz;
        if mt2 < 0.0 {
            -(-mt2).sqrt()
        } else {
            mt2.sqrt()
        }
    }

    /// Azimuthal separation wrapped into `[-π, π)`
    pub fn delta_phi(&self, other: &LorentzVector) -> f64 {
        wrap_phi(self.phi() - other.phi())
    }

    /// Angular distance `sqrt(Δη² + Δφ²)`
    pub fn delta_r(&self, other: &LorentzVector) -> f64 {
        (self.eta() - other.eta()).hypot(self.delta_phi(other))
    }
}

impl Add for LorentzVector {
    type Output = LorentzVector;

    fn add(self, rhs: LorentzVector) -> LorentzVector {
        LorentzVector {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

impl Sum for LorentzVector {
    fn sum<I: Iterator<Item = LorentzVector>>(iter: I) -> Self {
        iter.fold(LorentzVector::default(), Add::add)
    }
}

impl<'a> Sum<&'a LorentzVector> for LorentzVector {
    fn sum<I: Iterator<Item = &'a LorentzVector>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for LorentzVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x,y,z,t)=({:.6},{:.6},{:.6},{:.6}) (P,eta,phi,E)=({:.6},{:.6},{:.6},{:.6})",
            self.px,
            self.py,
            self.pz,
            self.e,
            self.p(),
            self.eta(),
            self.phi(),
            self.e
        )
    }
}

/// Wrap an angle difference into `[-π, π)`
pub fn wrap_phi(dphi: f64) -> f64 {
    let wrapped = (dphi + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped.is_nan() {
        dphi
    } else {
        wrapped
    }
}

/// Partial kinematic object with 2 to 4 components
///
/// Components are stored in bound-column order: pt, eta, phi, mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    values: [f64; 4],
    arity: u8,
}

impl Composite {
    /// Smallest supported component count
    pub const MIN_ARITY: usize = 2;
    /// Largest supported component count
    pub const MAX_ARITY: usize = 4;

    /// Build from a slice of 2 to 4 components; `None` otherwise
    pub fn new(components: &[f64]) -> Option<Self> {
        if !(Self::MIN_ARITY..=Self::MAX_ARITY).contains(&components.len()) {
            return None;
        }
        let mut values = [0.0; 4];
        values[..components.len()].copy_from_slice(components);
        Some(Self {
            values,
            arity: components.len() as u8,
        })
    }

    /// Build from a fixed buffer whose first `arity` entries are meaningful
    ///
    /// `arity` is clamped into `2..=4`; unused trailing entries are zeroed.
    #[inline]
    pub fn from_array(mut values: [f64; 4], arity: usize) -> Self {
        let arity = arity.clamp(Self::MIN_ARITY, Self::MAX_ARITY);
        for v in values.iter_mut().skip(arity) {
            *v = 0.0;
        }
        Self {
            values,
            arity: arity as u8,
        }
    }

    /// Number of meaningful components
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity as usize
    }

    /// Meaningful components in bound order
    #[inline]
    pub fn components(&self) -> &[f64] {
        &self.values[..self.arity()]
    }

    /// First component (transverse momentum)
    #[inline]
    pub fn pt(&self) -> f64 {
        self.values[0]
    }

    /// Second component (pseudorapidity)
    #[inline]
    pub fn eta(&self) -> f64 {
        self.values[1]
    }

    /// Third component (azimuth), when bound
    pub fn phi(&self) -> Option<f64> {
        (self.arity >= 3).then_some(self.values[2])
    }

    /// Fourth component (mass), when bound
    pub fn mass(&self) -> Option<f64> {
        (self.arity >= 4).then_some(self.values[3])
    }

    /// Promote to a full four-vector when all four components are bound
    pub fn to_lorentz(&self) -> Option<LorentzVector> {
        match (self.phi(), self.mass()) {
            (Some(phi), Some(m)) => Some(LorentzVector::from_pt_eta_phi_m(
                self.pt(),
                self.eta(),
                phi,
                m,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Pt,Eta)=({},{})", self.pt(), self.eta())?;
        if let Some(phi) = self.phi() {
            write!(f, " Phi={}", phi)?;
        }
        if let Some(m) = self.mass() {
            write!(f, " M={}", m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pt_eta_phi_m_recovered() {
        let v = LorentzVector::from_pt_eta_phi_m(50.0, 1.2, -0.7, 10.0);
        assert!(close(v.pt(), 50.0));
        assert!(close(v.eta(), 1.2));
        assert!(close(v.phi(), -0.7));
        assert!(close(v.m(), 10.0));
    }

    #[test]
    fn test_massless_energy_equals_momentum() {
        let v = LorentzVector::from_pt_eta_phi_m(20.0, 0.0, 0.0, 0.0);
        assert!(close(v.e, 20.0));
        assert!(close(v.p(), 20.0));
    }

    #[test]
    fn test_eta_along_beam() {
        assert_eq!(LorentzVector::new(0.0, 0.0, 5.0, 5.0).eta(), ETA_AT_ZERO_PT);
        assert_eq!(LorentzVector::new(0.0, 0.0, -5.0, 5.0).eta(), -ETA_AT_ZERO_PT);
        assert_eq!(LorentzVector::default().eta(), 0.0);
    }

    #[test]
    fn test_delta_phi_wraps() {
        let a = LorentzVector::from_pt_eta_phi_m(1.0, 0.0, 3.0, 0.0);
        let b = LorentzVector::from_pt_eta_phi_m(1.0, 0.0, -3.0, 0.0);
        let dphi = a.delta_phi(&b);
        assert!(close(dphi, 6.0 - 2.0 * PI));
        assert!(dphi.abs() <= PI);
    }

    #[test]
    fn test_sum_of_back_to_back_pair() {
        let a = LorentzVector::from_pt_eta_phi_m(30.0, 0.0, 0.0, 0.0);
        let b = LorentzVector::from_pt_eta_phi_m(30.0, 0.0, PI, 0.0);
        let total: LorentzVector = [a, b].iter().sum();
        assert!(total.pt() < 1e-9);
        assert!(close(total.m(), 60.0));
    }

    #[test]
    fn test_composite_arity_bounds() {
        assert!(Composite::new(&[1.0]).is_none());
        assert!(Composite::new(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_none());
        let c = Composite::new(&[1.0, 2.0]).unwrap();
        assert_eq!(c.arity(), 2);
        assert_eq!(c.phi(), None);
        assert_eq!(c.mass(), None);
        assert!(c.to_lorentz().is_none());
    }

    #[test]
    fn test_composite_from_array_zeroes_tail() {
        let c = Composite::from_array([1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(c.components(), &[1.0, 2.0, 3.0]);
        assert_eq!(c.mass(), None);
        assert_eq!(c, Composite::new(&[1.0, 2.0, 3.0]).unwrap());
    }

    #[test]
    fn test_composite_promotes_to_lorentz() {
        let c = Composite::new(&[40.0, 0.5, 1.0, 5.0]).unwrap();
        let v = c.to_lorentz().unwrap();
        assert!(close(v.pt(), 40.0));
        assert!(close(v.m(), 5.0));
    }

    proptest::proptest! {
        #[test]
        fn prop_wrap_phi_in_range(dphi in -100.0f64..100.0) {
            let w = wrap_phi(dphi);
            proptest::prop_assert!((-PI..PI).contains(&w) || close(w, PI));
            let turns = (dphi - w) / (2.0 * PI);
            proptest::prop_assert!((turns - turns.round()).abs() < 1e-9);
        }

        #[test]
        fn prop_pt_eta_phi_recovered(
            pt in 1.0f64..1000.0,
            eta in -4.0f64..4.0,
            phi in -3.1f64..3.1,
            m in 0.0f64..100.0,
        ) {
            let v = LorentzVector::from_pt_eta_phi_m(pt, eta, phi, m);
            proptest::prop_assert!((v.pt() - pt).abs() < 1e-6 * pt);
            proptest::prop_assert!((v.eta() - eta).abs() < 1e-6);
            proptest::prop_assert!(wrap_phi(v.phi() - phi).abs() < 1e-9);
        }
    }
}
