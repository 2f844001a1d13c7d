//! Refresh Performance Benchmarks
//!
//! Measures the per-entry cost of `EventLoader::advance`, which rebuilds every
//! registered slot from the current record. Steady-state refresh should not
//! allocate once slots have seen their largest entry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use svj_engine::EventLoader;
use svj_source::MemoryTree;

const ENTRIES: u64 = 1024;

/// Delphes-like tree with ragged jet collections of 0..=11 jets per entry
fn jets_tree() -> MemoryTree {
    let mut builder = MemoryTree::builder([
        "MissingET.MET",
        "Jet.PT",
        "Jet.Eta",
        "Jet.Phi",
        "Jet.Mass",
    ]);
    for entry in 0..ENTRIES {
        let n = (entry % 12) as usize;
        let pt: Vec<f64> = (0..n).map(|j| 200.0 / (j as f64 + 1.0)).collect();
        let eta: Vec<f64> = (0..n).map(|j| (j as f64 - 3.0) * 0.4).collect();
        let phi: Vec<f64> = (0..n).map(|j| (j as f64 * 0.7) % 3.0).collect();
        let mass: Vec<f64> = (0..n).map(|j| 5.0 + j as f64).collect();
        builder
            .push_entry([vec![entry as f64], pt, eta, phi, mass])
            .unwrap();
    }
    builder.build().unwrap()
}

fn loader_with(kinds: &str) -> EventLoader<MemoryTree> {
    let mut loader = EventLoader::new(jets_tree());
    loader.register_scalar("met", "MissingET.MET").unwrap();
    match kinds {
        "vector" => {
            loader.register_vector_scalar("jetPt", "Jet.PT").unwrap();
        }
        "composite" => {
            loader
                .register_composite("jet", &["Jet.PT", "Jet.Eta", "Jet.Phi"])
                .unwrap();
        }
        "lorentz" => {
            loader
                .register_lorentz("jets", &["Jet.PT", "Jet.Eta", "Jet.Phi", "Jet.Mass"])
                .unwrap();
        }
        _ => {
            loader
                .register_tuple("raw", &["Jet.PT", "Jet.Eta", "Jet.Phi", "Jet.Mass"])
                .unwrap();
        }
    }
    loader
}

/// Benchmark a full sequential pass per variable kind
fn bench_advance_by_kind(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    group.throughput(Throughput::Elements(ENTRIES));

    for kind in ["vector", "composite", "lorentz", "tuple"] {
        let mut loader = loader_with(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, _| {
            b.iter(|| {
                for i in 0..ENTRIES {
                    loader.advance(i).unwrap();
                }
                black_box(loader.current_entry())
            })
        });
    }
    group.finish();
}

/// Benchmark the cut table range query after a typical selection
fn bench_cut_range(c: &mut Criterion) {
    let mut loader = loader_with("lorentz");
    loader.advance(0).unwrap();

    c.bench_function("cuts/all_pass", |b| {
        b.iter(|| {
            loader.init_cuts();
            for kind in svj_core::CutKind::ALL {
                loader.cut(kind, true);
            }
            black_box(loader.cuts_range(0, svj_core::CutKind::COUNT).unwrap())
        })
    });
}

criterion_group!(benches, bench_advance_by_kind, bench_cut_range);
criterion_main!(benches);
