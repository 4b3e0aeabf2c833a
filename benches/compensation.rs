use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flowgate_events::compensation::invert_matrix;
use flowgate_events::table::{EventTable, ValueType};

/// Build a table whose first `colours` parameters are fluorescence channels
fn create_table(events: usize, colours: usize, value_type: ValueType) -> EventTable {
    let names: Vec<String> = (0..colours).map(|i| format!("FL{}-A", i + 1)).collect();
    let mut table = EventTable::new(&names, events, value_type).unwrap();
    for parameter in 0..colours {
        for event in 0..events {
            let value = 100.0 + ((event * (parameter + 1)) % 4096) as f64;
            table.set_value(parameter, event, value).unwrap();
        }
    }
    table
}

fn spillover(colours: usize) -> Vec<f64> {
    (0..colours * colours)
        .map(|i| if i / colours == i % colours { 1.0 } else { 0.02 })
        .collect()
}

/// Benchmark per-event unmixing across panel sizes
fn bench_compensate(c: &mut Criterion) {
    let mut group = c.benchmark_group("compensate");
    let events = 250_000;

    for colours in [4, 8, 16] {
        let names: Vec<String> = (0..colours).map(|i| format!("FL{}-A", i + 1)).collect();
        let matrix = spillover(colours);
        group.throughput(Throughput::Elements(events as u64));

        for value_type in [ValueType::Float, ValueType::Double] {
            let table = create_table(events, colours, value_type);
            group.bench_with_input(
                BenchmarkId::new(format!("{}", value_type), format!("{}colours", colours)),
                &table,
                |b, table| {
                    b.iter_batched(
                        || table.clone(),
                        |mut table| {
                            table.compensate(&names, &matrix).unwrap();
                            black_box(table)
                        },
                        criterion::BatchSize::LargeInput,
                    );
                },
            );
        }
    }

    group.finish();
}

/// Benchmark Gauss-Jordan inversion on its own
fn bench_invert(c: &mut Criterion) {
    let mut group = c.benchmark_group("invert_matrix");

    for colours in [4, 16, 40] {
        let matrix = spillover(colours);
        group.bench_with_input(
            BenchmarkId::from_parameter(colours),
            &matrix,
            |b, matrix| b.iter(|| black_box(invert_matrix(matrix, colours).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compensate, bench_invert);
criterion_main!(benches);
