//! Benchmarks for the symbolic engine and adaptive quadrature.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use planum_calculus::{adaptive_integrate, Calculus, QuadratureConfig};
use planum_core::{parse_expression, ExprArena, SymbolTable};

fn bench_expand_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_power");
    let table = SymbolTable::new(["x", "y"]);

    for n in [4, 8, 16, 32] {
        let src = format!("(x + 2*y + 1)**{n}");
        group.bench_with_input(BenchmarkId::new("trinomial", n), &src, |b, src| {
            b.iter(|| {
                let mut arena = ExprArena::new();
                let h = parse_expression(&mut arena, src, &table).unwrap();
                let mut calc = Calculus::new(&mut arena);
                black_box(calc.expand(h).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_antiderivative(c: &mut Criterion) {
    let mut group = c.benchmark_group("antiderivative");
    let table = SymbolTable::new(["x"]);

    let cases = [
        ("polynomial", "3*x**5 - x**2/2 + 7"),
        ("tabular", "x**3*exp(2*x)"),
        ("trig_product", "sin(x)**3*cos(2*x)"),
        ("linear_power", "(2*x + 1)**-3"),
    ];
    for (name, src) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut arena = ExprArena::new();
                let h = parse_expression(&mut arena, src, &table).unwrap();
                let mut calc = Calculus::new(&mut arena);
                let x = calc.variable("x");
                let f = calc.expand(h).unwrap();
                black_box(calc.antiderivative(&f, x).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_quadrature(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_g7k15");
    let config = QuadratureConfig::default();

    group.bench_function("smooth", |b| {
        b.iter(|| black_box(adaptive_integrate(|x: f64| x.exp() * x.cos(), 0.0, 3.0, &config)));
    });
    group.bench_function("oscillatory", |b| {
        b.iter(|| black_box(adaptive_integrate(|x: f64| (50.0 * x).sin(), 0.0, 1.0, &config)));
    });
    group.bench_function("endpoint_singularity", |b| {
        b.iter(|| black_box(adaptive_integrate(|x: f64| 1.0 / x.sqrt(), 0.0, 1.0, &config)));
    });

    group.finish();
}

criterion_group!(benches, bench_expand_power, bench_antiderivative, bench_quadrature);

criterion_main!(benches);
