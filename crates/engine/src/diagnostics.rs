//! State dump of the current entry
//!
//! [`StateDump`] is a detached snapshot of every registered variable, grouped
//! by kind in a fixed order (single, vector, composite, Lorentz, tuple) and in
//! registration order within each group. Empty groups are omitted.
//!
//! The `Display` form is the console listing used while debugging an
//! analysis; the `Serialize` form feeds `svj dump --json`.

use serde::Serialize;
use std::fmt;
use svj_core::{Composite, LorentzVector, SvjError, SvjResult, ValueKind};

use crate::registry::{Slot, VariableRegistry};

const INDENT: &str = "   ";

/// Snapshot of all slots at one entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDump {
    /// Entry the values belong to; `None` before the first advance
    pub entry: Option<u64>,
    /// Non-empty kind groups in display order
    pub groups: Vec<DumpGroup>,
}

/// Variables of one kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpGroup {
    /// Kind shared by every variable in the group
    pub kind: ValueKind,
    /// Variables in registration order
    pub variables: Vec<DumpedVariable>,
}

/// One variable's name, columns and current value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpedVariable {
    /// Registered name
    pub name: String,
    /// Bound columns in component order
    pub columns: Vec<String>,
    /// Current contents
    pub value: DumpedValue,
}

/// Owned copy of a slot's contents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DumpedValue {
    /// Single number
    Scalar(f64),
    /// Ragged array
    Vector(Vec<f64>),
    /// Composite objects
    Composite(Vec<Composite>),
    /// Four-vectors
    Lorentz(Vec<LorentzVector>),
    /// Raw tuples, one row per sub-index
    Tuple(Vec<Vec<f64>>),
}

impl From<&Slot> for DumpedValue {
    fn from(slot: &Slot) -> Self {
        match slot {
            Slot::Scalar(v) => DumpedValue::Scalar(*v),
            Slot::VectorScalar(v) => DumpedValue::Vector(v.clone()),
            Slot::Composite(v) => DumpedValue::Composite(v.clone()),
            Slot::Lorentz(v) => DumpedValue::Lorentz(v.clone()),
            Slot::Tuple(t) => DumpedValue::Tuple(t.to_rows()),
        }
    }
}

impl StateDump {
    /// Copy every slot of `registry`
    pub fn capture(entry: Option<u64>, registry: &VariableRegistry) -> Self {
        let groups = ValueKind::ALL
            .iter()
            .filter_map(|&kind| {
                let variables: Vec<DumpedVariable> = registry
                    .iter()
                    .filter(|v| v.kind() == kind)
                    .map(|v| DumpedVariable {
                        name: v.name().to_string(),
                        columns: v.bindings().iter().map(|b| b.column.clone()).collect(),
                        value: DumpedValue::from(v.slot()),
                    })
                    .collect();
                (!variables.is_empty()).then_some(DumpGroup { kind, variables })
            })
            .collect();
        Self { entry, groups }
    }

    /// Group for `kind`, if any variable of that kind is registered
    pub fn group(&self, kind: ValueKind) -> Option<&DumpGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }

    /// Dumped variable by name
    pub fn variable(&self, name: &str) -> Option<&DumpedVariable> {
        self.groups
            .iter()
            .flat_map(|g| g.variables.iter())
            .find(|v| v.name == name)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> SvjResult<String> {
        serde_json::to_string_pretty(self).map_err(SvjError::serialization)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, level: usize, items: &[T]) -> fmt::Result {
    write_indent(f, level)?;
    if items.is_empty() {
        return writeln!(f, "{{ }}");
    }
    f.write_str("{ ")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    writeln!(f, " }}")
}

fn write_indent(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str(INDENT)?;
    }
    Ok(())
}

impl fmt::Display for DumpedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_at(f, 0)
    }
}

impl DumpedValue {
    fn write_at(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        match self {
            DumpedValue::Scalar(v) => {
                write_indent(f, level)?;
                writeln!(f, "{}", v)
            }
            DumpedValue::Vector(values) => write_list(f, level, values),
            DumpedValue::Composite(objects) => {
                if objects.is_empty() {
                    return write_list::<f64>(f, level, &[]);
                }
                for object in objects {
                    write_indent(f, level)?;
                    writeln!(f, "{}", object)?;
                }
                Ok(())
            }
            DumpedValue::Lorentz(vectors) => {
                if vectors.is_empty() {
                    return write_list::<f64>(f, level, &[]);
                }
                for vector in vectors {
                    write_indent(f, level)?;
                    writeln!(f, "{}", vector)?;
                }
                Ok(())
            }
            DumpedValue::Tuple(rows) => {
                if rows.is_empty() {
                    return write_list::<f64>(f, level, &[]);
                }
                rows.iter().try_for_each(|row| write_list(f, level, row))
            }
        }
    }
}

impl fmt::Display for StateDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry {
            Some(entry) => writeln!(f, "Entry {}", entry)?,
            None => writeln!(f, "No entry loaded")?,
        }
        for group in &self.groups {
            writeln!(f)?;
            writeln!(f, "{}:", group.kind.heading())?;
            for variable in &group.variables {
                write_indent(f, 1)?;
                writeln!(f, "{}", variable.name)?;
                variable.value.write_at(f, 2)?;
            }
        }
        Ok(())
    }
}
