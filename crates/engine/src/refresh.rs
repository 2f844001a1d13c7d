//! Entry refresher: rebuild every slot from the current record
//!
//! Each kind has one materialization rule, dispatched through a single
//! exhaustive `match` on the slot:
//!
//! | Kind         | Length source          | Element                         |
//! |--------------|------------------------|---------------------------------|
//! | Scalar       | n/a                    | value at sub-index 0            |
//! | VectorScalar | the bound column       | one value                       |
//! | Composite    | first bound component  | `Composite` from N values       |
//! | Lorentz      | first bound component  | four-vector from (pt,eta,phi,m) |
//! | Tuple        | first bound component  | N raw values                    |
//!
//! Sequence slots are cleared and refilled, never diffed. `clear` keeps the
//! allocation, so once a slot has seen its largest record the refresh loop
//! stops allocating.

use svj_core::{Composite, LorentzVector, RecordSource, SvjError, SvjResult};

use crate::registry::{Slot, Variable, VariableRegistry};

impl Variable {
    /// Recompute this variable's slot from the source's current record
    #[inline]
    pub(crate) fn refresh<S: RecordSource + ?Sized>(&mut self, source: &S) {
        let bindings = &self.bindings;
        match &mut self.slot {
            Slot::Scalar(value) => {
                *value = source.column_value(bindings[0].handle, 0);
            }
            Slot::VectorScalar(values) => {
                let column = bindings[0].handle;
                let n = source.column_length(column);
                values.clear();
                values.extend((0..n).map(|i| source.column_value(column, i)));
            }
            Slot::Composite(objects) => {
                let n = source.column_length(bindings[0].handle);
                let arity = bindings.len();
                objects.clear();
                objects.reserve(n);
                for i in 0..n {
                    let mut parts = [0.0; 4];
                    for (part, binding) in parts.iter_mut().zip(bindings.iter()) {
                        *part = source.column_value(binding.handle, i);
                    }
                    objects.push(Composite::from_array(parts, arity));
                }
            }
            Slot::Lorentz(vectors) => {
                let n = source.column_length(bindings[0].handle);
                let (pt, eta, phi, m) = (
                    bindings[0].handle,
                    bindings[1].handle,
                    bindings[2].handle,
                    bindings[3].handle,
                );
                vectors.clear();
                vectors.reserve(n);
                for i in 0..n {
                    vectors.push(LorentzVector::from_pt_eta_phi_m(
                        source.column_value(pt, i),
                        source.column_value(eta, i),
                        source.column_value(phi, i),
                        source.column_value(m, i),
                    ));
                }
            }
            Slot::Tuple(list) => {
                let n = source.column_length(bindings[0].handle);
                list.values.clear();
                list.values.reserve(n * bindings.len());
                for i in 0..n {
                    for binding in bindings.iter() {
                        list.values.push(source.column_value(binding.handle, i));
                    }
                }
            }
        }
    }

    /// Check that every component reports the first component's length
    pub(crate) fn check_lengths<S: RecordSource + ?Sized>(&self, source: &S) -> SvjResult<()> {
        let Some((first, rest)) = self.bindings.split_first() else {
            return Ok(());
        };
        if rest.is_empty() {
            return Ok(());
        }
        let expected = source.column_length(first.handle);
        for binding in rest {
            let actual = source.column_length(binding.handle);
            if actual != expected {
                return Err(SvjError::InconsistentLength {
                    variable: self.name.clone(),
                    column: binding.column.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

impl VariableRegistry {
    /// Rebuild every slot, in registration order, from the source's current
    /// record
    pub fn refresh<S: RecordSource + ?Sized>(&mut self, source: &S) {
        for variable in &mut self.variables {
            variable.refresh(source);
        }
    }

    /// Rebuild only the most recently registered slot
    pub(crate) fn refresh_latest<S: RecordSource + ?Sized>(&mut self, source: &S) {
        if let Some(variable) = self.variables.last_mut() {
            variable.refresh(source);
        }
    }

    /// Verify that multi-component variables agree on their per-record length
    ///
    /// Reads only; no slot is touched whether or not this fails.
    ///
    /// # Errors
    ///
    /// `InconsistentLength` naming the first offending variable and column.
    pub fn validate_lengths<S: RecordSource + ?Sized>(&self, source: &S) -> SvjResult<()> {
        self.variables
            .iter()
            .try_for_each(|variable| variable.check_lengths(source))
    }
}
