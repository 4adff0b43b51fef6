//! Benchmarks for layout generation and placement checks
//!
//! Run with: cargo bench --bench layout

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::broadcast;

use esoterica::puzzle::layout::{generate_layout_with_rng, BoardSize, InteractionMode};
use esoterica::puzzle::placement::{all_placed, DEFAULT_TOLERANCE_PX};
use esoterica::puzzle::session::SessionConfig;
use esoterica::{Catalog, DeterministicRng, MemoryStore, ProgressStore, PuzzleDefinition, PuzzleSession};

const BOARD: BoardSize = BoardSize::new(400.0, 400.0);

fn make_puzzle(grid_size: u32) -> PuzzleDefinition {
    let json = format!(r#"[{{"id":"bench","gridSize":{grid_size},"imageRef":"bench.png"}}]"#);
    let catalog = Catalog::from_json_str(&json).expect("bench catalog should parse");
    catalog.get("bench").expect("bench puzzle should exist").clone()
}

fn bench_generate_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/generate");

    for grid in [3u32, 5, 10, 20] {
        let puzzle = make_puzzle(grid);
        for mode in [InteractionMode::Continuous, InteractionMode::Discrete] {
            group.bench_with_input(BenchmarkId::new(format!("{mode:?}"), grid), &puzzle, |b, puzzle| {
                let mut rng = DeterministicRng::new(42);
                b.iter(|| black_box(generate_layout_with_rng(puzzle, BOARD, mode, &mut rng)))
            });
        }
    }

    group.finish();
}

fn bench_all_placed(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement/all_placed");

    for grid in [3u32, 10, 20] {
        let puzzle = make_puzzle(grid);
        let pieces = generate_layout_with_rng(&puzzle, BOARD, InteractionMode::Continuous, &mut DeterministicRng::new(7))
            .expect("bench layout should generate");
        group.bench_with_input(BenchmarkId::from_parameter(grid), &pieces, |b, pieces| {
            b.iter(|| black_box(all_placed(pieces, DEFAULT_TOLERANCE_PX)))
        });
    }

    group.finish();
}

fn bench_random_drags(c: &mut Criterion) {
    let puzzle = make_puzzle(5);
    let progress = Arc::new(ProgressStore::new(Arc::new(MemoryStore::new()), "bench"));
    let (completions, _) = broadcast::channel(4);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("bench runtime should build");

    c.bench_function("session/random_drags_5x5", |b| {
        let mut input = StdRng::seed_from_u64(99);
        b.iter_batched(
            || {
                let mut session = PuzzleSession::new(
                    puzzle.clone(),
                    InteractionMode::Continuous,
                    SessionConfig::default(),
                    progress.clone(),
                    completions.clone(),
                )
                .with_runtime(runtime.handle().clone());
                session.start_with_seed(BOARD, 1).expect("bench session should start");
                session
            },
            |mut session| {
                for _ in 0..100 {
                    let index = input.gen_range(0..25);
                    let x = input.gen_range(0.0..320.0);
                    let y = input.gen_range(0.0..320.0);
                    black_box(session.move_piece(index, x, y).ok());
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_generate_layout, bench_all_placed, bench_random_drags);
criterion_main!(benches);
