use atlas_core::{Flag, Metric, ResortRecord, ResortTable};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const COUNTRIES: [(&str, &str); 6] = [
    ("Norway", "Europe"),
    ("Austria", "Europe"),
    ("France", "Europe"),
    ("Japan", "Asia"),
    ("Canada", "North America"),
    ("Chile", "South America"),
];

fn build_table(n_resorts: usize) -> ResortTable {
    let records = (0..n_resorts)
        .map(|i| {
            let (country, continent) = COUNTRIES[i % COUNTRIES.len()];
            let mut r = ResortRecord::new(format!("R{i}"), country, continent);
            r.price = (i * 37 % 150) as f64;
            r.highest_point = (1000 + i * 53 % 2800) as f64;
            r.total_slopes = (i * 11 % 300) as f64;
            r.snow_cannons = (i * 7 % 900) as f64;
            r.latitude = 45.0;
            r.longitude = 7.0;
            r.summer_skiing = if i % 9 == 0 { Flag::Yes } else { Flag::No };
            r.night_skiing = if i % 4 == 0 { Flag::Yes } else { Flag::No };
            r
        })
        .collect();
    ResortTable::new(records).unwrap()
}

fn bench_queries(c: &mut Criterion) {
    c.bench_function("rank 5000 resorts", |b| {
        b.iter(|| black_box(build_table(5000)))
    });
    let table = build_table(5000);
    c.bench_function("map filter 5000", |b| {
        b.iter(|| {
            let sel = atlas_query::filter_for_map(&table, black_box(50.0), false, true, false);
            black_box(sel.resorts.len())
        })
    });
    c.bench_function("country view 5000", |b| {
        b.iter(|| {
            let view = atlas_query::resolve_country_view(
                &table,
                "Europe",
                "Austria",
                black_box(Metric::TotalSlopes),
                "R1",
            );
            black_box(view.top.len())
        })
    });
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
