//! Benchmarks for usage-index construction and graph analytics over
//! synthetic repo maps.
//!
//! Run with: `cargo bench --bench usage_index`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use repo_map::analysis::{find_circular_dependencies, find_unused_exports};
use repo_map::{build_usage_index, FileEntry, RepoMap};

/// `modules` directories of `files_per_module` files; each file imports
/// its predecessor and a shared utility module.
fn synthetic_map(modules: usize, files_per_module: usize) -> RepoMap {
    let mut map = RepoMap::new().with_file(
        "src/shared/utils.ts",
        FileEntry::new().with_exports(["formatDate", "parseDate", "clamp"]),
    );
    for m in 0..modules {
        for f in 0..files_per_module {
            let mut entry = FileEntry::new()
                .with_exports([format!("item{}_{}", m, f), format!("helper{}_{}", m, f)])
                .importing("../shared/utils", &["formatDate"]);
            if f > 0 {
                let previous = format!("./file{}", f - 1);
                entry = entry.importing(&previous, &["helper"]);
            }
            map.insert(&format!("src/mod{}/file{}.ts", m, f), entry);
        }
    }
    map
}

fn bench_build_usage_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_usage_index");
    for (modules, files) in [(10, 10), (50, 20), (100, 50)] {
        let map = synthetic_map(modules, files);
        group.bench_with_input(BenchmarkId::from_parameter(map.len()), &map, |b, map| {
            b.iter(|| build_usage_index(black_box(map)))
        });
    }
    group.finish();
}

fn bench_analytics(c: &mut Criterion) {
    let map = synthetic_map(50, 20);
    c.bench_function("find_unused_exports", |b| {
        b.iter(|| find_unused_exports(black_box(&map)))
    });
    c.bench_function("find_circular_dependencies", |b| {
        b.iter(|| find_circular_dependencies(black_box(&map)))
    });
}

criterion_group!(benches, bench_build_usage_index, bench_analytics);
criterion_main!(benches);
