use std::hint::black_box;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use vgclean::parsers::CsvLoader;
use vgclean::{CleaningStats, Pipeline, Table};

const HEADER: &str = "title,console,genre,publisher,developer,critic_score,total_sales,na_sales,jp_sales,pal_sales,other_sales,release_date,last_update";

fn synthetic_csv(rows: usize) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for i in 0..rows {
        // every 7th row repeats, every 11th lacks a score, every 13th has a bad sale
        let id = if i % 7 == 0 { i.saturating_sub(1) } else { i };
        let score = if i % 11 == 0 { String::new() } else { format!("{}", (i % 100) as f64 / 10.0) };
        let jp = if i % 13 == 0 { "n/a".to_string() } else { format!("{}", (i % 50) as f64 / 100.0) };
        text.push_str(&format!(
            "Game {id}, ps{} ,Action,electronic arts,ea {},{score},{},{},{jp},0.25,0.1,2015-03-{:02},\n",
            id % 5,
            id % 3,
            (id % 90) as f64 / 10.0,
            (id % 40) as f64 / 10.0,
            id % 28 + 1,
        ));
    }
    text
}

fn load(text: &str) -> Table {
    CsvLoader::new()
        .load_reader(text.as_bytes(), Path::new("bench.csv"))
        .unwrap()
}

fn bench_load(c: &mut Criterion) {
    let text = synthetic_csv(10_000);
    c.bench_function("load_10k_rows", |b| {
        b.iter(|| black_box(load(black_box(&text))));
    });
}

fn bench_standard_pipeline(c: &mut Criterion) {
    let table = load(&synthetic_csv(10_000));
    c.bench_function("standard_pipeline_10k_rows", |b| {
        b.iter_batched(
            || table.clone(),
            |table| {
                let mut stats = CleaningStats::new();
                black_box(Pipeline::standard().run(table, &mut stats))
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_load, bench_standard_pipeline);
criterion_main!(benches);
