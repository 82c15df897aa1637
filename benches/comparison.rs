// Copyright © SurrealDB Ltd
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Criterion benchmarks comparing Oaktree against the standard library.
//!
//! This benchmark suite compares:
//! - `oaktree::Tree` - Arena-backed binary search tree with explicit balancing
//! - `std::collections::BTreeMap` - Standard library B-tree
//!
//! Oaktree never rebalances on its own, so most groups measure both the raw
//! tree built from random keys and a tree that has been through `balance()`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oaktree::{Order, Tree};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;
use std::hint::black_box;

const SEED: u64 = 42;

// ============================================================================
// Helper Functions
// ============================================================================

/// Generate sequential keys from 0 to count-1
fn sequential_keys(count: usize) -> Vec<u64> {
	(0..count as u64).collect()
}

/// Generate random keys using a seeded RNG
fn random_keys(count: usize) -> Vec<u64> {
	let mut rng = StdRng::seed_from_u64(SEED);
	(0..count).map(|_| rng.random()).collect()
}

/// Generate keys that don't exist in a random key set (odd keys only)
fn missing_keys(count: usize) -> Vec<u64> {
	let mut rng = StdRng::seed_from_u64(SEED + 1);
	(0..count).map(|_| rng.random::<u64>() | 1).collect()
}

/// Random even keys, so `missing_keys` never hits
fn even_keys(count: usize) -> Vec<u64> {
	random_keys(count).into_iter().map(|k| k & !1).collect()
}

fn build_tree(keys: &[u64]) -> Tree<u64> {
	let mut tree = Tree::with_capacity(keys.len());
	for &k in keys {
		tree.insert(k, k);
	}
	tree
}

fn build_balanced(keys: &[u64]) -> Tree<u64> {
	let mut tree = build_tree(keys);
	tree.balance();
	tree
}

fn build_btreemap(keys: &[u64]) -> BTreeMap<u64, u64> {
	keys.iter().map(|&k| (k, k)).collect()
}

// ============================================================================
// Insert Benchmarks
// ============================================================================

fn bench_insert_random(c: &mut Criterion) {
	let mut group = c.benchmark_group("insert_random");

	for count in [1_000, 10_000, 100_000] {
		let keys = random_keys(count);
		group.throughput(Throughput::Elements(count as u64));

		// Oaktree
		group.bench_with_input(BenchmarkId::new("oaktree", count), &keys, |b, keys| {
			b.iter_batched(
				Tree::new,
				|mut tree| {
					for &k in keys {
						tree.insert(k, k);
					}
					tree
				},
				criterion::BatchSize::SmallInput,
			)
		});

		// BTreeMap
		group.bench_with_input(BenchmarkId::new("btreemap", count), &keys, |b, keys| {
			b.iter_batched(
				BTreeMap::new,
				|mut map| {
					for &k in keys {
						black_box(map.insert(k, k));
					}
					map
				},
				criterion::BatchSize::SmallInput,
			)
		});
	}
	group.finish();
}

/// Sequential keys build a chain, so sizes stay small and the tree is balanced afterwards.
fn bench_insert_sequential_then_balance(c: &mut Criterion) {
	let mut group = c.benchmark_group("insert_sequential_then_balance");

	for count in [500, 2_000] {
		let keys = sequential_keys(count);
		group.throughput(Throughput::Elements(count as u64));

		// Oaktree
		group.bench_with_input(BenchmarkId::new("oaktree", count), &keys, |b, keys| {
			b.iter_batched(
				Tree::new,
				|mut tree| {
					for &k in keys {
						tree.insert(k, k);
					}
					tree.balance();
					tree
				},
				criterion::BatchSize::SmallInput,
			)
		});

		// BTreeMap
		group.bench_with_input(BenchmarkId::new("btreemap", count), &keys, |b, keys| {
			b.iter_batched(
				BTreeMap::new,
				|mut map| {
					for &k in keys {
						black_box(map.insert(k, k));
					}
					map
				},
				criterion::BatchSize::SmallInput,
			)
		});
	}
	group.finish();
}

// ============================================================================
// Search Benchmarks
// ============================================================================

fn bench_search_hit(c: &mut Criterion) {
	let mut group = c.benchmark_group("search_hit");

	for count in [1_000, 10_000, 100_000] {
		let keys = random_keys(count);
		let raw = build_tree(&keys);
		let balanced = build_balanced(&keys);
		let map = build_btreemap(&keys);
		group.throughput(Throughput::Elements(count as u64));

		// Oaktree, as inserted
		group.bench_with_input(BenchmarkId::new("oaktree_raw", count), &keys, |b, keys| {
			b.iter(|| {
				for k in keys {
					black_box(raw.search(*k));
				}
			})
		});

		// Oaktree, after balance()
		group.bench_with_input(BenchmarkId::new("oaktree_balanced", count), &keys, |b, keys| {
			b.iter(|| {
				for k in keys {
					black_box(balanced.search(*k));
				}
			})
		});

		// BTreeMap
		group.bench_with_input(BenchmarkId::new("btreemap", count), &keys, |b, keys| {
			b.iter(|| {
				for k in keys {
					black_box(map.get(k));
				}
			})
		});
	}
	group.finish();
}

fn bench_search_miss(c: &mut Criterion) {
	let mut group = c.benchmark_group("search_miss");

	for count in [1_000, 10_000, 100_000] {
		let keys = even_keys(count);
		let missing = missing_keys(count);
		let balanced = build_balanced(&keys);
		let map = build_btreemap(&keys);
		group.throughput(Throughput::Elements(count as u64));

		// Oaktree
		group.bench_with_input(BenchmarkId::new("oaktree", count), &missing, |b, missing| {
			b.iter(|| {
				for k in missing {
					black_box(balanced.search(*k));
				}
			})
		});

		// BTreeMap
		group.bench_with_input(BenchmarkId::new("btreemap", count), &missing, |b, missing| {
			b.iter(|| {
				for k in missing {
					black_box(map.get(k));
				}
			})
		});
	}
	group.finish();
}

// ============================================================================
// Remove Benchmarks
// ============================================================================

fn bench_remove(c: &mut Criterion) {
	let mut group = c.benchmark_group("remove");

	for count in [1_000, 10_000, 100_000] {
		let keys = random_keys(count);
		let remove_count = count / 10; // Remove 10% of entries
		let remove_keys: Vec<u64> = keys[..remove_count].to_vec();

		group.throughput(Throughput::Elements(remove_count as u64));

		// Oaktree
		group.bench_with_input(BenchmarkId::new("oaktree", count), &remove_keys, |b, remove_keys| {
			b.iter_batched(
				|| build_balanced(&keys),
				|mut tree| {
					for &k in remove_keys {
						black_box(tree.remove(k));
					}
					tree
				},
				criterion::BatchSize::SmallInput,
			)
		});

		// BTreeMap
		group.bench_with_input(BenchmarkId::new("btreemap", count), &remove_keys, |b, remove_keys| {
			b.iter_batched(
				|| build_btreemap(&keys),
				|mut map| {
					for &k in remove_keys {
						black_box(map.remove(&k));
					}
					map
				},
				criterion::BatchSize::SmallInput,
			)
		});
	}
	group.finish();
}

// ============================================================================
// Traversal and Balance Benchmarks
// ============================================================================

fn bench_traversal(c: &mut Criterion) {
	let mut group = c.benchmark_group("traversal");

	let count = 100_000;
	let keys = random_keys(count);
	let tree = build_balanced(&keys);
	let map = build_btreemap(&keys);
	group.throughput(Throughput::Elements(count as u64));

	for order in Order::ALL {
		group.bench_function(BenchmarkId::new("oaktree_iter", format!("{:?}", order)), |b| {
			b.iter(|| {
				for (k, v) in tree.iter(order) {
					black_box((k, v));
				}
			})
		});
	}

	group.bench_function(BenchmarkId::new("oaktree_keys", "InOrder"), |b| {
		b.iter(|| black_box(tree.keys(Order::InOrder)))
	});

	group.bench_function(BenchmarkId::new("oaktree_snapshot", "InOrder"), |b| {
		b.iter(|| black_box(tree.snapshot(Order::InOrder)))
	});

	group.bench_function(BenchmarkId::new("btreemap_iter", "InOrder"), |b| {
		b.iter(|| {
			for (k, v) in map.iter() {
				black_box((k, v));
			}
		})
	});

	group.finish();
}

fn bench_balance(c: &mut Criterion) {
	let mut group = c.benchmark_group("balance");

	for count in [1_000, 10_000, 100_000] {
		let keys = random_keys(count);
		group.throughput(Throughput::Elements(count as u64));

		// Random insertion order: a shallow but lopsided tree
		group.bench_with_input(BenchmarkId::new("random", count), &keys, |b, keys| {
			b.iter_batched(
				|| build_tree(keys),
				|mut tree| {
					tree.balance();
					tree
				},
				criterion::BatchSize::LargeInput,
			)
		});

		// Already balanced: no rotations, only the height pass
		group.bench_with_input(BenchmarkId::new("already_balanced", count), &keys, |b, keys| {
			b.iter_batched(
				|| build_balanced(keys),
				|mut tree| {
					tree.balance();
					tree
				},
				criterion::BatchSize::LargeInput,
			)
		});
	}

	for count in [1_000, 5_000] {
		let keys = sequential_keys(count);
		group.throughput(Throughput::Elements(count as u64));

		// Degenerate chain from sequential inserts
		group.bench_with_input(BenchmarkId::new("chain", count), &keys, |b, keys| {
			b.iter_batched(
				|| build_tree(keys),
				|mut tree| {
					tree.balance();
					tree
				},
				criterion::BatchSize::LargeInput,
			)
		});
	}
	group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
	benches,
	bench_insert_random,
	bench_insert_sequential_then_balance,
	bench_search_hit,
	bench_search_miss,
	bench_remove,
	bench_traversal,
	bench_balance,
);

criterion_main!(benches);
