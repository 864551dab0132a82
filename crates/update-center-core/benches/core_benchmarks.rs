//! Benchmarks for update-center-core: version ordering and the properties
//! text codec.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::fmt::Write;
use std::hint::black_box;
use update_center_core::{PropertyMap, Version};

fn generate_versions(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("{}.{}", i / 40, i % 40),
            1 => format!("{}.{}.{}", i / 40, i % 40, i % 7),
            2 => format!("{}.{}-RC{}", i / 40, i % 40, i % 3),
            _ => format!("{}.{}-SNAPSHOT", i / 40, i % 40),
        })
        .collect()
}

/// Properties text shaped like an update center with `plugins` plugins.
fn generate_properties(plugins: usize) -> String {
    let mut out = String::from("# generated\nsonar.versions=2.2,2.3,2.4,2.5,2.6,2.7,2.7.1,2.8\n");
    for i in 0..plugins {
        writeln!(out, "plugin{i}.name=Plugin {i}").unwrap();
        writeln!(out, "plugin{i}.description=Description with \\u00e9scapes and = signs").unwrap();
        writeln!(out, "plugin{i}.developers=Alice,\\\n    Bob,\\\n    Carol").unwrap();
        writeln!(out, "plugin{i}.versions=1.0,1.1,1.2").unwrap();
        for r in 0..3 {
            writeln!(out, "plugin{i}.1.{r}.requiredSonarVersions=[2.{},LATEST]", r + 2).unwrap();
            writeln!(out, "plugin{i}.1.{r}.downloadUrl=http://dist/plugin{i}-1.{r}.jar").unwrap();
        }
    }
    out
}

fn bench_version_parsing(c: &mut Criterion) {
    let versions = generate_versions(1000);

    c.bench_function("version_parse_1000", |b| {
        b.iter(|| {
            for text in &versions {
                black_box(Version::parse(black_box(text)));
            }
        });
    });
}

fn bench_version_sorting(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_sorting");

    for count in [100, 1000, 10_000] {
        let versions: Vec<Version> = generate_versions(count)
            .iter()
            .map(|text| Version::parse(text))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &versions, |b, versions| {
            b.iter(|| {
                let mut sorted = versions.clone();
                sorted.sort();
                black_box(sorted)
            });
        });
    }

    group.finish();
}

fn bench_properties_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("properties_codec");

    for plugins in [10, 100, 1000] {
        let text = generate_properties(plugins);
        group.bench_with_input(BenchmarkId::new("parse", plugins), &text, |b, text| {
            b.iter(|| PropertyMap::parse(black_box(text)).unwrap());
        });

        let props = PropertyMap::parse(&text).unwrap();
        group.bench_with_input(BenchmarkId::new("to_text", plugins), &props, |b, props| {
            b.iter(|| black_box(props).to_text());
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let root = PropertyMap::parse(&generate_properties(100)).unwrap();
    let supplement = PropertyMap::parse("versions=1.3,1.4\nname=Renamed\n1.3.requiredSonarVersions=2.8\n").unwrap();

    c.bench_function("merge_prefixed_supplement", |b| {
        b.iter(|| {
            let mut merged = root.clone();
            merged.merge_prefixed("plugin42", black_box(&supplement));
            merged
        });
    });
}

criterion_group!(
    benches,
    bench_version_parsing,
    bench_version_sorting,
    bench_properties_codec,
    bench_merge
);
criterion_main!(benches);
