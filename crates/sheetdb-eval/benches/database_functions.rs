use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sheetdb_common::LiteralValue;
use sheetdb_eval::pivot::{StreamingStats, accumulate_parallel};
use sheetdb_eval::{CalcValue, DefaultFunctionContext, FunctionRegistry, RangeView};

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

/// `Region, Units, Price` table with `n` data rows.
fn sales_table(n: usize) -> Vec<Vec<LiteralValue>> {
    let mut rows = Vec::with_capacity(n + 1);
    rows.push(vec![
        LiteralValue::Text("Region".into()),
        LiteralValue::Text("Units".into()),
        LiteralValue::Text("Price".into()),
    ]);
    for i in 0..n {
        rows.push(vec![
            LiteralValue::Text(REGIONS[i % REGIONS.len()].into()),
            LiteralValue::Int((i % 97) as i64),
            LiteralValue::Number(1.0 + (i % 13) as f64 * 0.25),
        ]);
    }
    rows
}

fn criteria() -> Vec<Vec<LiteralValue>> {
    vec![
        vec![
            LiteralValue::Text("Region".into()),
            LiteralValue::Text("Units".into()),
        ],
        vec![LiteralValue::Text("No".into()), LiteralValue::Text(">50".into())],
        vec![LiteralValue::Text("E*".into()), LiteralValue::Empty],
    ]
}

fn bench_d_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("DFunctions");
    let registry = FunctionRegistry::with_builtins().expect("builtins");
    let ctx = DefaultFunctionContext::default();
    let crit = criteria();

    // 1k rows for typical sheets, 50k for large exported tables.
    for n in [1000usize, 10_000, 50_000] {
        let table = sales_table(n);
        for name in ["DSUM", "DAVERAGE", "DSTDEV"] {
            let f = registry.get("", name).expect("registered");
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, _| {
                b.iter(|| {
                    let args = [
                        CalcValue::Range(RangeView::from_borrowed(&table)),
                        CalcValue::Scalar(LiteralValue::Text("Price".into())),
                        CalcValue::Range(RangeView::from_borrowed(&crit)),
                    ];
                    black_box(f.dispatch(&args, &ctx))
                })
            });
        }
    }

    group.finish();
}

fn bench_accumulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("StreamingStats");

    for n in [10_000usize, 1_000_000] {
        let xs: Vec<f64> = (0..n).map(|i| ((i * 7919) % 1000) as f64 * 0.1).collect();

        group.bench_with_input(BenchmarkId::new("Sequential", n), &xs, |b, xs| {
            b.iter(|| black_box(xs.iter().copied().collect::<StreamingStats>()))
        });

        group.bench_with_input(BenchmarkId::new("Parallel", n), &xs, |b, xs| {
            b.iter(|| black_box(accumulate_parallel(xs, 4096)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_d_functions, bench_accumulation);
criterion_main!(benches);
