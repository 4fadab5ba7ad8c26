use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridmdp::{
    solve_policy_iteration, solve_policy_iteration_modified, solve_value_iteration, Action,
    CellKind, Grid, RewardTable, TransitionProfile,
};

/// An open `side x side` field with goals in two corners and a wall band
/// across the middle.
fn field(side: usize) -> Grid {
    let rows = (0..side)
        .map(|row| {
            (0..side)
                .map(|col| {
                    if (row, col) == (0, side - 1) || (row, col) == (side - 1, 0) {
                        CellKind::Goal
                    } else if row == side / 2 && col % 4 != 0 {
                        CellKind::Wall
                    } else if (row + 2 * col) % 11 == 0 {
                        CellKind::Penalty
                    } else {
                        CellKind::Empty
                    }
                })
                .collect()
        })
        .collect();
    Grid::new(rows).unwrap()
}

fn bench_solvers(c: &mut Criterion) {
    let rewards = RewardTable::default();
    let profile = TransitionProfile::default();
    let mut group = c.benchmark_group("grid_mdp");

    for side in [6, 12, 24] {
        let grid = field(side);

        group.bench_with_input(BenchmarkId::new("value_iteration", side), &grid, |b, grid| {
            b.iter(|| {
                solve_value_iteration(
                    black_box(grid),
                    &rewards,
                    &Action::ALL,
                    profile,
                    0.99,
                    0.01,
                )
                .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("policy_iteration", side), &grid, |b, grid| {
            b.iter(|| {
                solve_policy_iteration(
                    black_box(grid),
                    &rewards,
                    &Action::ALL,
                    profile,
                    0.99,
                    0.01,
                )
                .unwrap()
            })
        });

        for k in [5, 50] {
            group.bench_with_input(
                BenchmarkId::new(format!("modified_policy_iteration_k{}", k), side),
                &grid,
                |b, grid| {
                    b.iter(|| {
                        solve_policy_iteration_modified(
                            black_box(grid),
                            &rewards,
                            &Action::ALL,
                            profile,
                            0.99,
                            k,
                        )
                        .unwrap()
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
