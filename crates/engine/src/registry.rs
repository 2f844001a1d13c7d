//! Variable registry: named variables bound to source columns
//!
//! ## Storage model
//!
//! The registry owns every storage slot by value in one `Vec<Variable>`,
//! addressed by a dense `VarId`. A name map gives O(1) lookup by name.
//! Iteration follows the `Vec`, so registration order is the stable
//! iteration order.
//!
//! Registration hands back a typed handle (`ScalarHandle`, `VectorHandle`,
//! ...) wrapping the `VarId`. Handles are `Copy` and carry no lifetime;
//! reading a slot through one borrows the registry, so a value can never be
//! observed across a refresh.
//!
//! ## Registration is all-or-nothing
//!
//! Name, arity and every column are checked before anything is inserted. A
//! failed registration leaves the registry unchanged.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::slice::ChunksExact;
use svj_core::{
    short_label, ColumnHandle, Composite, LorentzVector, RecordSource, SvjError, SvjResult,
    ValueKind,
};
use tracing::debug;

// ============================================================================
// Identifiers and handles
// ============================================================================

/// Dense index of a registered variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    /// Position in registration order
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var#{}", self.0)
    }
}

/// Untyped handle: variable index plus its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarHandle {
    /// Variable index
    pub id: VarId,
    /// Materialization rule
    pub kind: ValueKind,
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(VarId);

        impl $name {
            /// Underlying variable index
            #[inline]
            pub const fn id(self) -> VarId {
                self.0
            }
        }

        impl From<$name> for VarHandle {
            fn from(h: $name) -> VarHandle {
                VarHandle { id: h.0, kind: $kind }
            }
        }
    };
}

typed_handle!(
    /// Handle to a single-value variable
    ScalarHandle => ValueKind::Scalar
);
typed_handle!(
    /// Handle to a ragged-array variable
    VectorHandle => ValueKind::VectorScalar
);
typed_handle!(
    /// Handle to a composite-object list variable
    CompositeHandle => ValueKind::Composite
);
typed_handle!(
    /// Handle to a four-vector list variable
    LorentzHandle => ValueKind::Lorentz
);
typed_handle!(
    /// Handle to a raw tuple list variable
    TupleHandle => ValueKind::Tuple
);

// ============================================================================
// Storage
// ============================================================================

/// Fixed-width tuples stored row-major in one flat buffer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TupleList {
    width: usize,
    pub(crate) values: Vec<f64>,
}

impl TupleList {
    /// Empty list of `width`-wide tuples
    pub fn new(width: usize) -> Self {
        Self {
            width,
            values: Vec::new(),
        }
    }

    /// Components per tuple
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of tuples
    #[inline]
    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    /// True when there are no tuples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Tuple at `index`
    pub fn get(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.width)?;
        self.values.get(start..start + self.width)
    }

    /// Iterate over tuples in sub-index order
    pub fn iter(&self) -> ChunksExact<'_, f64> {
        self.values.chunks_exact(self.width.max(1))
    }

    /// All components, row-major
    pub fn as_flat(&self) -> &[f64] {
        &self.values
    }

    /// Copy out as one `Vec` per tuple
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter().map(<[f64]>::to_vec).collect()
    }
}

impl<'a> IntoIterator for &'a TupleList {
    type Item = &'a [f64];
    type IntoIter = ChunksExact<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Current-entry storage of one variable
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Single number
    Scalar(f64),
    /// Ragged array
    VectorScalar(Vec<f64>),
    /// Composite objects, one per sub-index
    Composite(Vec<Composite>),
    /// Four-vectors, one per sub-index
    Lorentz(Vec<LorentzVector>),
    /// Raw tuples, one per sub-index
    Tuple(TupleList),
}

impl Slot {
    fn empty(kind: ValueKind, width: usize) -> Self {
        match kind {
            ValueKind::Scalar => Slot::Scalar(f64::NAN),
            ValueKind::VectorScalar => Slot::VectorScalar(Vec::new()),
            ValueKind::Composite => Slot::Composite(Vec::new()),
            ValueKind::Lorentz => Slot::Lorentz(Vec::new()),
            ValueKind::Tuple => Slot::Tuple(TupleList::new(width)),
        }
    }

    /// Kind tag of this slot
    pub fn kind(&self) -> ValueKind {
        match self {
            Slot::Scalar(_) => ValueKind::Scalar,
            Slot::VectorScalar(_) => ValueKind::VectorScalar,
            Slot::Composite(_) => ValueKind::Composite,
            Slot::Lorentz(_) => ValueKind::Lorentz,
            Slot::Tuple(_) => ValueKind::Tuple,
        }
    }

    /// Number of elements; 1 for scalars
    pub fn len(&self) -> usize {
        match self {
            Slot::Scalar(_) => 1,
            Slot::VectorScalar(v) => v.len(),
            Slot::Composite(v) => v.len(),
            Slot::Lorentz(v) => v.len(),
            Slot::Tuple(t) => t.len(),
        }
    }

    /// True for empty sequence slots; scalars are never empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One bound component column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    /// Full column name as registered
    pub column: String,
    /// Last dot-separated segment of `column`
    pub label: String,
    /// Resolved source handle
    pub handle: ColumnHandle,
}

/// A registered variable and its current slot
#[derive(Debug, Clone)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) bindings: SmallVec<[ColumnBinding; 4]>,
    pub(crate) slot: Slot,
}

impl Variable {
    /// Registered name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Materialization rule
    pub fn kind(&self) -> ValueKind {
        self.slot.kind()
    }

    /// Bound columns in component order
    pub fn bindings(&self) -> &[ColumnBinding] {
        &self.bindings
    }

    /// Number of bound components
    pub fn arity(&self) -> usize {
        self.bindings.len()
    }

    /// Current slot contents
    pub fn slot(&self) -> &Slot {
        &self.slot
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Owner of every variable and its storage slot
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    pub(crate) variables: Vec<Variable>,
    index: FxHashMap<String, VarId>,
}

impl VariableRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind one column to a single-value slot
    ///
    /// # Errors
    ///
    /// `DuplicateName` if `name` is taken, `UnknownColumn` if `column` does
    /// not resolve.
    pub fn register_scalar<S>(&mut self, source: &S, name: &str, column: &str) -> SvjResult<ScalarHandle>
    where
        S: RecordSource + ?Sized,
    {
        self.register(source, name, ValueKind::Scalar, &[column])
            .map(ScalarHandle)
    }

    /// Bind one array-valued column to a ragged slot
    pub fn register_vector_scalar<S>(
        &mut self,
        source: &S,
        name: &str,
        column: &str,
    ) -> SvjResult<VectorHandle>
    where
        S: RecordSource + ?Sized,
    {
        self.register(source, name, ValueKind::VectorScalar, &[column])
            .map(VectorHandle)
    }

    /// Bind 2 to 4 columns read jointly as one composite object per sub-index
    ///
    /// # Errors
    ///
    /// `InvalidArity` if `components` has fewer than 2 or more than 4 names,
    /// plus the errors of [`register_scalar`](Self::register_scalar).
    pub fn register_composite<S, C>(
        &mut self,
        source: &S,
        name: &str,
        components: &[C],
    ) -> SvjResult<CompositeHandle>
    where
        S: RecordSource + ?Sized,
        C: AsRef<str>,
    {
        self.register(source, name, ValueKind::Composite, components)
            .map(CompositeHandle)
    }

    /// Bind exactly 4 columns (pt, eta, phi, mass) read as four-vectors
    pub fn register_lorentz<S, C>(
        &mut self,
        source: &S,
        name: &str,
        components: &[C],
    ) -> SvjResult<LorentzHandle>
    where
        S: RecordSource + ?Sized,
        C: AsRef<str>,
    {
        self.register(source, name, ValueKind::Lorentz, components)
            .map(LorentzHandle)
    }

    /// Bind any non-zero number of columns stored as raw tuples
    pub fn register_tuple<S, C>(
        &mut self,
        source: &S,
        name: &str,
        components: &[C],
    ) -> SvjResult<TupleHandle>
    where
        S: RecordSource + ?Sized,
        C: AsRef<str>,
    {
        self.register(source, name, ValueKind::Tuple, components)
            .map(TupleHandle)
    }

    /// Register a variable of any kind
    pub fn register<S, C>(
        &mut self,
        source: &S,
        name: &str,
        kind: ValueKind,
        components: &[C],
    ) -> SvjResult<VarId>
    where
        S: RecordSource + ?Sized,
        C: AsRef<str>,
    {
        if self.index.contains_key(name) {
            return Err(SvjError::duplicate_name(name));
        }

        let (min, max) = kind.arity_range();
        if components.len() < min || components.len() > max {
            return Err(SvjError::InvalidArity {
                name: name.to_string(),
                arity: components.len(),
                min,
                max,
            });
        }

        let bindings = components
            .iter()
            .map(|c| {
                let column = c.as_ref();
                source.resolve_column(column).map(|handle| ColumnBinding {
                    column: column.to_string(),
                    label: short_label(column).to_string(),
                    handle,
                })
            })
            .collect::<SvjResult<SmallVec<[ColumnBinding; 4]>>>()?;

        let id = VarId(self.variables.len() as u32);
        debug!(
            target: "svj::registry",
            name,
            kind = %kind,
            components = bindings.len(),
            "Registered variable"
        );
        self.variables.push(Variable {
            name: name.to_string(),
            slot: Slot::empty(kind, bindings.len()),
            bindings,
        });
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Handle of the variable registered under `name`
    pub fn lookup(&self, name: &str) -> Option<VarHandle> {
        let id = *self.index.get(name)?;
        Some(VarHandle {
            id,
            kind: self.variables[id.index()].kind(),
        })
    }

    /// Variable registered under `name`
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|id| &self.variables[id.index()])
    }

    /// Variable at `id`
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Slot behind an untyped handle; `None` if the handle is foreign
    pub fn slot(&self, handle: VarHandle) -> Option<&Slot> {
        self.variables
            .get(handle.id.index())
            .map(|v| &v.slot)
            .filter(|slot| slot.kind() == handle.kind)
    }

    /// Variables in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    /// Number of registered variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Total bound columns across all variables
    pub fn component_count(&self) -> usize {
        self.variables.iter().map(Variable::arity).sum()
    }

    // ------------------------------------------------------------------------
    // Typed reads
    //
    // These panic if the handle was issued by a different registry.
    // ------------------------------------------------------------------------

    /// Current value of a scalar variable
    #[inline]
    pub fn scalar(&self, handle: ScalarHandle) -> f64 {
        match &self.variables[handle.0.index()].slot {
            Slot::Scalar(v) => *v,
            other => foreign_handle(handle.0, ValueKind::Scalar, other.kind()),
        }
    }

    /// Current values of a ragged-array variable
    #[inline]
    pub fn vector(&self, handle: VectorHandle) -> &[f64] {
        match &self.variables[handle.0.index()].slot {
            Slot::VectorScalar(v) => v,
            other => foreign_handle(handle.0, ValueKind::VectorScalar, other.kind()),
        }
    }

    /// Current objects of a composite variable
    #[inline]
    pub fn composites(&self, handle: CompositeHandle) -> &[Composite] {
        match &self.variables[handle.0.index()].slot {
            Slot::Composite(v) => v,
            other => foreign_handle(handle.0, ValueKind::Composite, other.kind()),
        }
    }

    /// Current four-vectors of a Lorentz variable
    #[inline]
    pub fn lorentz(&self, handle: LorentzHandle) -> &[LorentzVector] {
        match &self.variables[handle.0.index()].slot {
            Slot::Lorentz(v) => v,
            other => foreign_handle(handle.0, ValueKind::Lorentz, other.kind()),
        }
    }

    /// Current tuples of a tuple variable
    #[inline]
    pub fn tuples(&self, handle: TupleHandle) -> &TupleList {
        match &self.variables[handle.0.index()].slot {
            Slot::Tuple(t) => t,
            other => foreign_handle(handle.0, ValueKind::Tuple, other.kind()),
        }
    }
}

#[cold]
#[track_caller]
fn foreign_handle(id: VarId, expected: ValueKind, found: ValueKind) -> ! {
    panic!(
        "{} holds a {} slot but was used as {}; handle belongs to another registry",
        id, found, expected
    )
}
