use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgcompose::{
    And, Array, Expr, Fragment, Operand, PlaceholderFormat, Predicate, Select, StatementBuilder,
    args,
};

/// SELECT col0, col1, ... FROM t WHERE col0 = ? AND col1 = ? ...
fn build_select(n: usize) -> Select {
    let psql = StatementBuilder::new().placeholder_format(PlaceholderFormat::DOLLAR);
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let pred = Predicate::eq((0..n).map(|i| (format!("col{i}"), i as i64)));
    psql.select(columns).from(["t"]).filter(pred)
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select_to_sql");

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_sql()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).to_sql()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let pred = Predicate::eq([("id", Operand::list(values.iter().copied()))]);
                black_box(pred.render())
            });
        });
    }

    group.finish();
}

fn bench_nested_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/nested_expand");

    for depth in [1, 4, 16] {
        let mut frag = Expr::new("x = ?", args![0]);
        for i in 1..depth {
            let inner = And::new([frag, Expr::new("y = ?", args![i])]);
            frag = Expr::new("(?)", args![inner]);
        }
        group.bench_with_input(BenchmarkId::from_parameter(depth), &frag, |b, frag| {
            b.iter(|| black_box(frag.render()));
        });
    }

    group.finish();
}

fn bench_array_literal(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/array_literal");

    for n in [10, 100, 1000] {
        let rows: Vec<Vec<String>> = (0..n)
            .map(|i| vec![format!("tag{i}"), format!("\"q{i}\"")])
            .collect();
        let array = Array::new(rows);
        group.bench_with_input(BenchmarkId::from_parameter(n), &array, |b, array| {
            b.iter(|| black_box(array.literal()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_build_and_render,
    bench_in_list,
    bench_nested_expand,
    bench_array_literal
);
criterion_main!(benches);
