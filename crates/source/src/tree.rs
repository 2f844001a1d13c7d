//! MemoryTree: In-memory columnar event tree
//!
//! ## Layout
//!
//! Every column stores all of its values in one flat buffer plus an offset
//! table with `entries + 1` elements. The values of entry `e` are
//! `values[offsets[e]..offsets[e + 1]]`, so a scalar column is simply a
//! ragged column whose entries all have length 1.
//!
//! ```text
//! Jet.PT   values:  [50.0, 30.0, 42.0]
//!          offsets: [0, 2, 3]            entry 0 → [50, 30], entry 1 → [42]
//! ```
//!
//! Name lookup uses an FxHashMap rebuilt on deserialization; it is never
//! persisted.
//!
//! Values are plain floats in binary encodings. Human-readable encodings
//! have no literal for non-finite floats, so there `NaN`, `inf` and `-inf`
//! are written as strings (a `null` also reads back as `NaN`).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use svj_core::{ColumnHandle, RecordSource, SvjError, SvjResult};

/// One named column in flat-values + offsets form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ColumnData {
    name: String,
    #[serde(with = "float_values")]
    values: Vec<f64>,
    offsets: Vec<usize>,
}

impl ColumnData {
    fn new(name: String) -> Self {
        Self {
            name,
            values: Vec::new(),
            offsets: vec![0],
        }
    }

    #[inline]
    fn range(&self, entry: usize) -> (usize, usize) {
        (self.offsets[entry], self.offsets[entry + 1])
    }
}

mod float_values {
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    struct Text(f64);

    impl Serialize for Text {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let v = self.0;
            if v.is_finite() {
                serializer.serialize_f64(v)
            } else if v.is_nan() {
                serializer.serialize_str("NaN")
            } else if v > 0.0 {
                serializer.serialize_str("inf")
            } else {
                serializer.serialize_str("-inf")
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextValue {
        Number(f64),
        Text(String),
    }

    pub(super) fn serialize<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if !serializer.is_human_readable() {
            return values.serialize(serializer);
        }
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for &v in values {
            seq.serialize_element(&Text(v))?;
        }
        seq.end()
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        if !deserializer.is_human_readable() {
            return Vec::<f64>::deserialize(deserializer);
        }
        Vec::<Option<TextValue>>::deserialize(deserializer)?
            .into_iter()
            .map(|value| match value {
                None => Ok(f64::NAN),
                Some(TextValue::Number(v)) => Ok(v),
                Some(TextValue::Text(text)) => text
                    .parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("invalid float value '{}'", text))),
            })
            .collect()
    }
}

/// Serialized form of a tree; validated when converted back
#[derive(Serialize, Deserialize)]
struct TreeRepr {
    entries: u64,
    columns: Vec<ColumnData>,
}

/// In-memory columnar tree of event records
///
/// Implements [`RecordSource`] directly, so a single tree can back a loader
/// without going through a [`Chain`](crate::Chain).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TreeRepr", into = "TreeRepr")]
pub struct MemoryTree {
    entries: u64,
    columns: Vec<ColumnData>,
    lookup: FxHashMap<String, u32>,
    current: Option<usize>,
}

impl MemoryTree {
    /// Start building a tree with the given column names
    pub fn builder<I, N>(columns: I) -> TreeBuilder
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        TreeBuilder::new(columns)
    }

    /// Build a tree from whole columns, each given as one array per entry
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the columns disagree on the number of
    /// entries or a column name repeats.
    pub fn from_columns<N, R>(columns: Vec<(N, Vec<R>)>) -> SvjResult<Self>
    where
        N: Into<String>,
        R: AsRef<[f64]>,
    {
        let mut data = Vec::with_capacity(columns.len());
        let mut entries: Option<usize> = None;
        for (name, rows) in columns {
            let mut column = ColumnData::new(name.into());
            match entries {
                Some(n) if n != rows.len() => {
                    return Err(SvjError::invalid_config(format!(
                        "column '{}' has {} entries, expected {}",
                        column.name,
                        rows.len(),
                        n
                    )));
                }
                _ => entries = Some(rows.len()),
            }
            for row in &rows {
                column.values.extend_from_slice(row.as_ref());
                column.offsets.push(column.values.len());
            }
            data.push(column);
        }
        Self::assemble(entries.unwrap_or(0) as u64, data)
    }

    fn assemble(entries: u64, columns: Vec<ColumnData>) -> SvjResult<Self> {
        let mut lookup = FxHashMap::with_capacity_and_hasher(columns.len(), Default::default());
        for (i, column) in columns.iter().enumerate() {
            if lookup.insert(column.name.clone(), i as u32).is_some() {
                return Err(SvjError::invalid_config(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(Self {
            entries,
            columns,
            lookup,
            current: None,
        })
    }

    /// Number of entries
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Whether a column with this exact name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Entry made current by the last successful `load`
    pub fn current_entry(&self) -> Option<u64> {
        self.current.map(|e| e as u64)
    }

    /// Values of `column` for an arbitrary entry, independent of the cursor
    pub fn values_at(&self, column: ColumnHandle, entry: u64) -> Option<&[f64]> {
        let data = self.columns.get(column.index())?;
        if entry >= self.entries {
            return None;
        }
        let (start, end) = data.range(entry as usize);
        Some(&data.values[start..end])
    }

    /// Drop the current-entry cursor
    pub(crate) fn unload(&mut self) {
        self.current = None;
    }
}

impl RecordSource for MemoryTree {
    fn total_entries(&self) -> u64 {
        self.entries
    }

    fn load(&mut self, index: u64) -> SvjResult<()> {
        if index >= self.entries {
            return Err(SvjError::OutOfRange {
                index,
                total: self.entries,
            });
        }
        self.current = Some(index as usize);
        Ok(())
    }

    fn resolve_column(&self, name: &str) -> SvjResult<ColumnHandle> {
        self.lookup
            .get(name)
            .map(|&i| ColumnHandle::new(i))
            .ok_or_else(|| SvjError::unknown_column(name))
    }

    #[inline]
    fn column_length(&self, column: ColumnHandle) -> usize {
        match (self.current, self.columns.get(column.index())) {
            (Some(entry), Some(data)) => {
                let (start, end) = data.range(entry);
                end - start
            }
            _ => 0,
        }
    }

    #[inline]
    fn column_value(&self, column: ColumnHandle, sub_index: usize) -> f64 {
        match (self.current, self.columns.get(column.index())) {
            (Some(entry), Some(data)) => {
                let (start, end) = data.range(entry);
                if sub_index < end - start {
                    data.values[start + sub_index]
                } else {
                    f64::NAN
                }
            }
            _ => f64::NAN,
        }
    }
}

impl PartialEq for MemoryTree {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.columns == other.columns
    }
}

impl TryFrom<TreeRepr> for MemoryTree {
    type Error = SvjError;

    fn try_from(repr: TreeRepr) -> SvjResult<Self> {
        let expected = repr.entries.checked_add(1).ok_or_else(|| {
            SvjError::serialization(format!("entry count {} is too large", repr.entries))
        })?;
        for column in &repr.columns {
            if u64::try_from(column.offsets.len()).ok() != Some(expected) {
                return Err(SvjError::serialization(format!(
                    "column '{}' has {} offsets for {} entries",
                    column.name,
                    column.offsets.len(),
                    repr.entries
                )));
            }
            let monotonic = column.offsets.windows(2).all(|w| w[0] <= w[1]);
            if column.offsets.first() != Some(&0)
                || !monotonic
                || column.offsets.last().copied() != Some(column.values.len())
            {
                return Err(SvjError::serialization(format!(
                    "column '{}' has a malformed offset table",
                    column.name
                )));
            }
        }
        MemoryTree::assemble(repr.entries, repr.columns)
    }
}

impl From<MemoryTree> for TreeRepr {
    fn from(tree: MemoryTree) -> Self {
        TreeRepr {
            entries: tree.entries,
            columns: tree.columns,
        }
    }
}

/// Row-wise builder for [`MemoryTree`]
#[derive(Debug)]
pub struct TreeBuilder {
    columns: Vec<ColumnData>,
    entries: u64,
}

impl TreeBuilder {
    /// New builder with the given column names
    pub fn new<I, N>(columns: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|n| ColumnData::new(n.into()))
                .collect(),
            entries: 0,
        }
    }

    /// Append one entry: one array per column, in column order
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the row does not supply exactly one array
    /// per column. The builder is unchanged on error.
    pub fn push_entry<I, R>(&mut self, row: I) -> SvjResult<&mut Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        let row: Vec<R> = row.into_iter().collect();
        if row.len() != self.columns.len() {
            return Err(SvjError::invalid_config(format!(
                "entry has {} columns, tree has {}",
                row.len(),
                self.columns.len()
            )));
        }
        for (column, values) in self.columns.iter_mut().zip(&row) {
            column.values.extend_from_slice(values.as_ref());
            column.offsets.push(column.values.len());
        }
        self.entries += 1;
        Ok(self)
    }

    /// Finish the tree
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a column name repeats.
    pub fn build(self) -> SvjResult<MemoryTree> {
        MemoryTree::assemble(self.entries, self.columns)
    }
}
