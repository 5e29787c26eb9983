use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dlcscan_vdf::{parse, Property};

/// An app-info dump shaped like a large game: many depots, many DLC.
fn large_app_info() -> String {
    let dlc: Vec<String> = (1..=400).map(|offset| (100_000 + offset).to_string()).collect();
    let depots = (0..200)
        .map(|depot| {
            Property::branch(
                (200_000 + depot).to_string(),
                vec![
                    Property::leaf("name", format!("Depot {depot}")),
                    Property::leaf("dlcappid", dlc[depot as usize % dlc.len()].clone()),
                    Property::branch(
                        "manifests",
                        vec![Property::leaf("public", "1234567890123456789")],
                    ),
                ],
            )
        })
        .collect();
    Property::branch(
        "100000",
        vec![
            Property::branch(
                "common",
                vec![
                    Property::leaf("name", "Benchmark Game"),
                    Property::leaf("icon", "0123456789abcdef"),
                ],
            ),
            Property::branch("extended", vec![Property::leaf("listofdlc", dlc.join(","))]),
            Property::branch("depots", depots),
        ],
    )
    .to_vdf()
}

fn parse_app_info(c: &mut Criterion) {
    let text = large_app_info();
    let mut group = c.benchmark_group("vdf");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("parse_large_app_info", |b| {
        b.iter(|| parse(black_box(&text)).expect("parse"));
    });

    let root = parse(&text).expect("parse");
    group.bench_function("write_large_app_info", |b| {
        b.iter(|| black_box(&root).to_vdf());
    });

    group.finish();
}

criterion_group!(benches, parse_app_info);
criterion_main!(benches);
