//! Integration tests for EventLoader over in-memory and chained sources
//!
//! These tests exercise the public loader surface end to end:
//! - Slot freshness after every advance
//! - Ragged length consistency and rebuild-not-append
//! - Composite arity and component ordering
//! - Duplicate registration across kinds
//! - Cut range semantics
//! - Error paths that must leave slots untouched

use proptest::prelude::*;
use svj_core::{CutKind, SvjError, ValueKind};
use svj_engine::{DumpedValue, EventLoader, LoaderOptions};
use svj_source::{Chain, MemoryTree, TreeFile};
use tempfile::TempDir;

fn ragged(rows: &[Vec<f64>]) -> MemoryTree {
    MemoryTree::from_columns(vec![("x", rows.to_vec())]).unwrap()
}

#[test]
fn test_vector_shrinks_three_to_one() {
    let mut loader = EventLoader::new(ragged(&[vec![1.0, 2.0, 3.0], vec![9.0]]));
    let x = loader.register_vector_scalar("x", "x").unwrap();

    loader.advance(0).unwrap();
    assert_eq!(loader.vector(x), &[1.0, 2.0, 3.0]);

    loader.advance(1).unwrap();
    assert_eq!(loader.vector(x), &[9.0]);
}

#[test]
fn test_four_component_composite_two_entries() {
    let tree = MemoryTree::from_columns(vec![
        ("Jet.PT", vec![vec![50.0, 30.0], vec![80.0]]),
        ("Jet.Eta", vec![vec![0.5, -1.0], vec![2.0]]),
        ("Jet.Phi", vec![vec![0.1, 3.0], vec![-2.0]]),
        ("Jet.Mass", vec![vec![4.0, 2.0], vec![10.0]]),
    ])
    .unwrap();
    let mut loader = EventLoader::new(tree);
    let jet = loader
        .register_composite("jet", &["Jet.PT", "Jet.Eta", "Jet.Phi", "Jet.Mass"])
        .unwrap();

    loader.advance(0).unwrap();
    let objs = loader.composites(jet);
    assert_eq!(objs.len(), 2);
    assert_eq!(objs[0].components(), &[50.0, 0.5, 0.1, 4.0]);
    assert_eq!(objs[1].components(), &[30.0, -1.0, 3.0, 2.0]);

    loader.advance(1).unwrap();
    let objs = loader.composites(jet);
    assert_eq!(objs.len(), 1);
    assert_eq!(objs[0].components(), &[80.0, 2.0, -2.0, 10.0]);
    assert_eq!(objs[0].mass(), Some(10.0));
}

#[test]
fn test_out_of_range_leaves_every_slot() {
    let mut loader = EventLoader::new(ragged(&[vec![1.0, 2.0], vec![3.0]]));
    let x = loader.register_vector_scalar("x", "x").unwrap();
    let first = loader.register_scalar("x0", "x").unwrap();
    loader.advance(0).unwrap();

    for bad in [2, 3, u64::MAX] {
        let err = loader.advance(bad).unwrap_err();
        assert!(matches!(err, SvjError::OutOfRange { total: 2, .. }));
        assert_eq!(err.is_end_of_data(), bad == 2);
    }
    assert_eq!(loader.vector(x), &[1.0, 2.0]);
    assert_eq!(loader.scalar(first), 1.0);
    assert_eq!(loader.current_entry(), Some(0));
}

#[test]
fn test_strict_mismatch_leaves_every_slot() {
    let tree = MemoryTree::from_columns(vec![
        ("a", vec![vec![1.0], vec![1.0, 2.0]]),
        ("b", vec![vec![5.0], vec![6.0]]),
    ])
    .unwrap();
    let options = LoaderOptions {
        strict_lengths: true,
        ..LoaderOptions::default()
    };
    let mut loader = EventLoader::with_options(tree, options);
    let a = loader.register_vector_scalar("a", "a").unwrap();
    let pair = loader.register_tuple("pair", &["a", "b"]).unwrap();

    loader.advance(0).unwrap();
    let err = loader.advance(1).unwrap_err();
    assert!(matches!(
        err,
        SvjError::InconsistentLength { ref variable, expected: 2, actual: 1, .. } if variable == "pair"
    ));
    assert_eq!(loader.vector(a), &[1.0]);
    assert_eq!(loader.tuples(pair).to_rows(), vec![vec![1.0, 5.0]]);
    assert_eq!(loader.current_entry(), Some(0));
}

#[test]
fn test_duplicate_registration_fails_for_every_kind() {
    let tree = MemoryTree::from_columns(vec![
        ("a", vec![vec![1.0]]),
        ("b", vec![vec![2.0]]),
        ("c", vec![vec![3.0]]),
        ("d", vec![vec![4.0]]),
    ])
    .unwrap();
    let mut loader = EventLoader::new(tree);
    loader.register_lorentz("v", &["a", "b", "c", "d"]).unwrap();

    for kind in ValueKind::ALL {
        let columns: Vec<&str> = match kind {
            ValueKind::Scalar | ValueKind::VectorScalar => vec!["a"],
            _ => vec!["a", "b", "c", "d"],
        };
        let err = loader.register("v", kind, columns.as_slice()).unwrap_err();
        assert!(matches!(err, SvjError::DuplicateName { .. }), "{kind}");
    }
    assert_eq!(loader.registry().len(), 1);
}

#[test]
fn test_cut_range_sequence() {
    let mut loader = EventLoader::new(ragged(&[vec![1.0]]));
    loader.advance(0).unwrap();
    loader.init_cuts();

    assert!(loader.cuts_range(0, 3).unwrap());
    loader.cut(CutKind::from_index(1).unwrap(), false);
    assert!(!loader.cuts_range(0, 3).unwrap());
    loader.cut(CutKind::from_index(1).unwrap(), true);
    assert!(loader.cuts_range(0, 3).unwrap());
}

#[test]
fn test_dump_reflects_current_entry() {
    let mut loader = EventLoader::new(ragged(&[vec![1.0, 2.0], vec![]]));
    loader.register_vector_scalar("x", "x").unwrap();

    loader.advance(1).unwrap();
    let dump = loader.dump();
    assert_eq!(dump.entry, Some(1));
    assert_eq!(dump.variable("x").unwrap().value, DumpedValue::Vector(vec![]));
    assert!(dump.to_string().contains("VECTOR VARIABLES:"));
}

#[test]
fn test_chain_across_files() {
    let dir = TempDir::new().unwrap();
    let mut lines = String::new();
    for (i, rows) in [vec![vec![1.0], vec![2.0, 2.5]], vec![vec![3.0]]]
        .into_iter()
        .enumerate()
    {
        let mut file = TreeFile::new();
        file.insert("Delphes", ragged(&rows));
        let name = format!("part{i}.json");
        file.write(&dir.path().join(&name)).unwrap();
        lines.push_str(&name);
        lines.push('\n');
    }
    let list = dir.path().join("sample.txt");
    std::fs::write(&list, lines).unwrap();

    let chain = Chain::open(&list, "Delphes").unwrap();
    let mut loader = EventLoader::new(chain);
    let x = loader.register_vector_scalar("x", "x").unwrap();
    assert_eq!(loader.entries(), 3);

    let mut seen = Vec::new();
    for i in 0..loader.entries() {
        loader.advance(i).unwrap();
        seen.push(loader.vector(x).to_vec());
    }
    assert_eq!(seen, vec![vec![1.0], vec![2.0, 2.5], vec![3.0]]);
    assert_eq!(loader.source().current_tree(), Some(1));
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    proptest::collection::vec(proptest::collection::vec(-1.0e3..1.0e3f64, 0..6), 1..12)
}

proptest! {
    /// Every advance reproduces exactly the entry's values, in any visiting order
    #[test]
    fn prop_slots_match_entry(rows in rows_strategy(), order in proptest::collection::vec(0usize..64, 1..20)) {
        let mut loader = EventLoader::new(ragged(&rows));
        let x = loader.register_vector_scalar("x", "x").unwrap();
        let pair = loader.register_tuple("pair", &["x", "x"]).unwrap();
        for raw in order {
            let i = raw % rows.len();
            loader.advance(i as u64).unwrap();
            prop_assert_eq!(loader.vector(x), rows[i].as_slice());
            prop_assert_eq!(loader.tuples(pair).len(), rows[i].len());
            for (row, &v) in loader.tuples(pair).iter().zip(&rows[i]) {
                prop_assert_eq!(row, &[v, v][..]);
            }
        }
    }
}
