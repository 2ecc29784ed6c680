use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use openaq_processor::models::{HourlyTable, RawRecord};
use openaq_processor::processors::{pivot_records, DailyAggregator};
use openaq_processor::readers::NdjsonReader;
use openaq_processor::utils::compression::gzip;
use openaq_processor::writers::CsvSummaryWriter;

const PARAMETERS: [&str; 5] = ["pm25", "pm10", "o3", "no2", "so2"];

// Create long-form observations for benchmarking
fn create_test_records(location_count: usize, hours: usize) -> Vec<RawRecord> {
    let mut records = Vec::with_capacity(location_count * hours * PARAMETERS.len());

    for location in 0..location_count {
        let name = format!("Site {}", location);
        for hour in 0..hours {
            let timestamp = format!("2024-03-01T{:02}:00:00Z", hour % 24);
            for (i, parameter) in PARAMETERS.iter().enumerate() {
                let value = 10.0 + (location as f64) * 0.5 + (hour as f64) * 0.1 + i as f64;
                records.push(RawRecord::new("GB", "London", &name, parameter, value, &timestamp));
            }
        }
    }

    records
}

fn create_test_ndjson(records: &[RawRecord]) -> Vec<u8> {
    let lines: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                r#"{{"location":"{}","parameter":"{}","date":{{"utc":"{}"}},"value":{},"unit":"µg/m³","country":"{}","city":"{}"}}"#,
                r.location, r.parameter, r.timestamp, r.value, r.country, r.city
            )
        })
        .collect();
    gzip(lines.join("\n").as_bytes()).unwrap()
}

fn benchmark_ndjson_parsing(c: &mut Criterion) {
    let body = create_test_ndjson(&create_test_records(50, 24));
    let reader = NdjsonReader::new();

    c.bench_function("ndjson_parsing", |b| {
        b.iter(|| {
            let batch = reader.read_batch("bench.ndjson.gz", black_box(&body)).unwrap();
            black_box(batch.len())
        })
    });
}

fn benchmark_pivot(c: &mut Criterion) {
    let records = create_test_records(100, 24);

    c.bench_function("pivot", |b| {
        b.iter(|| {
            let table = pivot_records(black_box(&records));
            black_box(table.row_count())
        })
    });
}

fn benchmark_daily_aggregation(c: &mut Criterion) {
    let tables: Vec<HourlyTable> = (0..4)
        .map(|_| pivot_records(&create_test_records(100, 24)))
        .collect();
    let aggregator = DailyAggregator::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

    c.bench_function("daily_aggregation", |b| {
        b.iter(|| {
            let summary = aggregator.aggregate(black_box(&tables)).unwrap();
            black_box(summary.row_count())
        })
    });
}

fn benchmark_summary_encoding(c: &mut Criterion) {
    let tables = vec![pivot_records(&create_test_records(500, 24))];
    let summary = DailyAggregator::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        .aggregate(&tables)
        .unwrap();
    let writer = CsvSummaryWriter::new();

    c.bench_function("summary_csv_encoding", |b| {
        b.iter(|| black_box(writer.encode(black_box(&summary)).unwrap().len()))
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_reduce_by_size");

    for &size in &[10, 50, 100, 500] {
        group.bench_with_input(
            BenchmarkId::new("locations", size),
            &size,
            |b, &location_count| {
                let records = create_test_records(location_count, 24);
                let aggregator =
                    DailyAggregator::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

                b.iter(|| {
                    let table = pivot_records(&records);
                    let summary = aggregator.aggregate(std::slice::from_ref(&table)).unwrap();
                    black_box(summary.row_count())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_ndjson_parsing,
    benchmark_pivot,
    benchmark_daily_aggregation,
    benchmark_summary_encoding,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
