//! EventLoader: owned context tying a record source to its variables and cuts
//!
//! The loader owns exactly three things: the [`RecordSource`], the
//! [`VariableRegistry`] whose slots mirror the current entry, and the
//! [`CutTable`] consumer code fills in per event. There is no global state;
//! dropping the loader releases everything.
//!
//! ## Advance
//!
//! ```text
//! advance(i)
//!   ├─ i >= entries        → OutOfRange, nothing touched
//!   ├─ source.load(i)
//!   ├─ validate_lengths     (strict mode only; on failure the previous
//!   │                        entry is reloaded and slots are untouched)
//!   ├─ registry.refresh     (every slot rebuilt in registration order)
//!   └─ current_entry = i
//! ```
//!
//! A variable registered after an advance is filled from the loaded entry
//! straight away; before the first advance its slot stays empty (NaN for a
//! scalar).
//!
//! Slot reads borrow the loader immutably and `advance` needs `&mut self`,
//! so a value read from one entry can never be held across the next.

use std::time::Instant;

use svj_core::{
    Composite, CutKind, CutState, LorentzVector, RecordSource, SvjError, SvjResult, UnsetPolicy,
    ValueKind,
};
use tracing::{debug, info};

use crate::cuts::CutTable;
use crate::diagnostics::StateDump;
use crate::instrumentation::{RefreshStats, RefreshTrace};
use crate::registry::{
    CompositeHandle, LorentzHandle, ScalarHandle, TupleHandle, TupleList, VarHandle, VarId,
    VariableRegistry, VectorHandle,
};

/// Runtime switches of an [`EventLoader`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Log every registration and advance at debug level
    pub debug: bool,
    /// Include elapsed time in debug logs
    pub timing: bool,
    /// Reject entries whose multi-component variables disagree on length
    pub strict_lengths: bool,
    /// How range queries on the cut table treat never-evaluated cuts
    pub unset_policy: UnsetPolicy,
}

/// Per-event loader over a record source
#[derive(Debug)]
pub struct EventLoader<S: RecordSource> {
    source: S,
    registry: VariableRegistry,
    cuts: CutTable,
    options: LoaderOptions,
    current: Option<u64>,
    stats: RefreshStats,
}

impl<S: RecordSource> EventLoader<S> {
    /// Loader with default options
    pub fn new(source: S) -> Self {
        Self::with_options(source, LoaderOptions::default())
    }

    /// Loader with explicit options
    pub fn with_options(source: S, options: LoaderOptions) -> Self {
        info!(
            target: "svj::loader",
            entries = source.total_entries(),
            strict_lengths = options.strict_lengths,
            "Loader ready"
        );
        Self {
            source,
            registry: VariableRegistry::new(),
            cuts: CutTable::with_policy(options.unset_policy),
            options,
            current: None,
            stats: RefreshStats::new(),
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a single-value variable (see [`VariableRegistry::register_scalar`])
    pub fn register_scalar(&mut self, name: &str, column: &str) -> SvjResult<ScalarHandle> {
        let start = Instant::now();
        let handle = self.registry.register_scalar(&self.source, name, column)?;
        self.finish_registration(name, ValueKind::Scalar, start);
        Ok(handle)
    }

    /// Register a ragged-array variable
    pub fn register_vector_scalar(&mut self, name: &str, column: &str) -> SvjResult<VectorHandle> {
        let start = Instant::now();
        let handle = self
            .registry
            .register_vector_scalar(&self.source, name, column)?;
        self.finish_registration(name, ValueKind::VectorScalar, start);
        Ok(handle)
    }

    /// Register a composite variable of 2 to 4 components
    pub fn register_composite<C: AsRef<str>>(
        &mut self,
        name: &str,
        components: &[C],
    ) -> SvjResult<CompositeHandle> {
        let start = Instant::now();
        let handle = self
            .registry
            .register_composite(&self.source, name, components)?;
        self.finish_registration(name, ValueKind::Composite, start);
        Ok(handle)
    }

    /// Register a four-vector variable from (pt, eta, phi, mass) columns
    pub fn register_lorentz<C: AsRef<str>>(
        &mut self,
        name: &str,
        components: &[C],
    ) -> SvjResult<LorentzHandle> {
        let start = Instant::now();
        let handle = self
            .registry
            .register_lorentz(&self.source, name, components)?;
        self.finish_registration(name, ValueKind::Lorentz, start);
        Ok(handle)
    }

    /// Register a raw tuple variable of any non-zero width
    pub fn register_tuple<C: AsRef<str>>(
        &mut self,
        name: &str,
        components: &[C],
    ) -> SvjResult<TupleHandle> {
        let start = Instant::now();
        let handle = self.registry.register_tuple(&self.source, name, components)?;
        self.finish_registration(name, ValueKind::Tuple, start);
        Ok(handle)
    }

    /// Register a variable whose kind is only known at runtime
    pub fn register<C: AsRef<str>>(
        &mut self,
        name: &str,
        kind: ValueKind,
        components: &[C],
    ) -> SvjResult<VarId> {
        let start = Instant::now();
        let id = self
            .registry
            .register(&self.source, name, kind, components)?;
        self.finish_registration(name, kind, start);
        Ok(id)
    }

    /// A variable added after an advance is filled from the loaded entry
    fn finish_registration(&mut self, name: &str, kind: ValueKind, start: Instant) {
        if self.current.is_some() {
            self.registry.refresh_latest(&self.source);
        }
        self.log_registration(name, kind, start);
    }

    fn log_registration(&self, name: &str, kind: ValueKind, start: Instant) {
        if !self.options.debug {
            return;
        }
        if self.options.timing {
            debug!(
                target: "svj::loader",
                name,
                kind = %kind,
                elapsed_us = start.elapsed().as_micros() as u64,
                "Added variable"
            );
        } else {
            debug!(target: "svj::loader", name, kind = %kind, "Added variable");
        }
    }

    // ========================================================================
    // Advance
    // ========================================================================

    /// Load entry `index` and rebuild every slot from it
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `index >= entries()`; the source and all slots are
    ///   left untouched.
    /// - `InconsistentLength` in strict mode when a multi-component variable's
    ///   columns disagree; slots keep the previous entry and
    ///   `current_entry()` is unchanged.
    /// - Any error from the source's `load`.
    pub fn advance(&mut self, index: u64) -> SvjResult<()> {
        let total = self.source.total_entries();
        if index >= total {
            return Err(SvjError::OutOfRange { index, total });
        }

        let start = Instant::now();
        #[allow(unused_mut, unused_variables)]
        let mut trace = RefreshTrace::new();

        crate::perf_time!(trace, load_ns, self.source.load(index))?;

        if self.options.strict_lengths {
            let checked = crate::perf_time!(
                trace,
                validate_ns,
                self.registry.validate_lengths(&self.source)
            );
            if let Err(e) = checked {
                // Put the cursor back on the entry the slots still show
                if let Some(previous) = self.current {
                    self.source.load(previous)?;
                }
                return Err(e);
            }
        }

        crate::perf_time!(trace, refresh_ns, self.registry.refresh(&self.source));
        self.current = Some(index);

        #[cfg(feature = "perf-trace")]
        {
            trace.variables = self.registry.len();
        }
        self.stats.record(trace);

        if self.options.debug {
            if self.options.timing {
                debug!(
                    target: "svj::loader",
                    entry = index,
                    variables = self.registry.len(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Loaded entry"
                );
            } else {
                debug!(
                    target: "svj::loader",
                    entry = index,
                    variables = self.registry.len(),
                    "Loaded entry"
                );
            }
        }
        Ok(())
    }

    /// Total entries in the underlying dataset
    pub fn entries(&self) -> u64 {
        self.source.total_entries()
    }

    /// Entry the slots currently reflect; `None` before the first advance
    pub fn current_entry(&self) -> Option<u64> {
        self.current
    }

    // ========================================================================
    // Slot access
    // ========================================================================

    /// Registered variables
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Current value of a scalar variable
    #[inline]
    pub fn scalar(&self, handle: ScalarHandle) -> f64 {
        self.registry.scalar(handle)
    }

    /// Current values of a ragged-array variable
    #[inline]
    pub fn vector(&self, handle: VectorHandle) -> &[f64] {
        self.registry.vector(handle)
    }

    /// Current objects of a composite variable
    #[inline]
    pub fn composites(&self, handle: CompositeHandle) -> &[Composite] {
        self.registry.composites(handle)
    }

    /// Current four-vectors of a Lorentz variable
    #[inline]
    pub fn lorentz(&self, handle: LorentzHandle) -> &[LorentzVector] {
        self.registry.lorentz(handle)
    }

    /// Current tuples of a tuple variable
    #[inline]
    pub fn tuples(&self, handle: TupleHandle) -> &TupleList {
        self.registry.tuples(handle)
    }

    /// Untyped handle of the variable registered under `name`
    pub fn lookup(&self, name: &str) -> Option<VarHandle> {
        self.registry.lookup(name)
    }

    // ========================================================================
    // Cuts
    // ========================================================================

    /// Cut table for the current event
    pub fn cuts(&self) -> &CutTable {
        &self.cuts
    }

    /// Mutable cut table for the current event
    pub fn cuts_mut(&mut self) -> &mut CutTable {
        &mut self.cuts
    }

    /// Reset every cut to unset
    pub fn init_cuts(&mut self) {
        self.cuts.init();
    }

    /// Record a cut outcome and return it
    pub fn cut(&mut self, kind: CutKind, passed: bool) -> bool {
        self.cuts.record(kind, passed)
    }

    /// Current state of one cut
    pub fn cut_state(&self, kind: CutKind) -> CutState {
        self.cuts.get(kind)
    }

    /// Whether every cut in `[start, end)` passes under the table's policy
    pub fn cuts_range(&self, start: usize, end: usize) -> SvjResult<bool> {
        self.cuts.all_pass(start, end)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Toggle debug logging of registrations and advances
    pub fn set_debug(&mut self, debug: bool) {
        self.options.debug = debug;
    }

    /// Toggle elapsed-time reporting in debug logs
    pub fn set_timing(&mut self, timing: bool) {
        self.options.timing = timing;
    }

    /// Toggle per-entry component length validation
    pub fn set_strict_lengths(&mut self, strict: bool) {
        self.options.strict_lengths = strict;
    }

    /// Active options
    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    /// Snapshot of every variable's current contents, grouped by kind
    pub fn dump(&self) -> StateDump {
        StateDump::capture(self.current, &self.registry)
    }

    /// Aggregate refresh timings (empty unless built with `perf-trace`)
    pub fn stats(&self) -> &RefreshStats {
        &self.stats
    }

    /// Underlying record source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consume the loader, returning its source
    pub fn into_source(self) -> S {
        self.source
    }
}
