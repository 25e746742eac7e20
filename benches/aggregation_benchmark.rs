use air_quality_processor::models::{Observation, ObservationTable, Season};
use air_quality_processor::processors::{Aggregator, DashboardBuilder, Dataset};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const COLUMNS: [&str; 7] = ["PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP"];

// Hourly readings for `station_count` stations over `years` full years
fn create_test_dataset(station_count: usize, years: i32) -> Dataset {
    let mut rows = Vec::new();

    for station in 0..station_count {
        let name = format!("Station{}", station);
        for year in 2013..2013 + years {
            for month in 1..=12u32 {
                for day in 1..=28u32 {
                    for hour in 0..24u32 {
                        let base = (month * 31 + day) as f64 + hour as f64 * 0.5;
                        let values = COLUMNS
                            .iter()
                            .enumerate()
                            .map(|(i, _)| {
                                if (day + hour + i as u32) % 17 == 0 {
                                    None
                                } else {
                                    Some(base + i as f64 * 10.0 + station as f64)
                                }
                            })
                            .collect();
                        rows.push(Observation::new(name.clone(), year, month, day, hour, values));
                    }
                }
            }
        }
    }

    let columns = COLUMNS.iter().map(|c| c.to_string()).collect();
    Dataset::new(ObservationTable::new(columns, rows).expect("valid benchmark rows"))
}

fn benchmark_aggregations(c: &mut Criterion) {
    let dataset = create_test_dataset(4, 2);
    let aggregator = Aggregator::new(&dataset);
    let particles = ["PM10", "PM2.5"];

    c.bench_function("daily_mean", |b| {
        b.iter(|| aggregator.daily_mean(black_box("Station1"), &particles).unwrap())
    });

    c.bench_function("hourly_mean", |b| {
        b.iter(|| aggregator.hourly_mean(black_box("Station1"), &particles).unwrap())
    });

    let mut group = c.benchmark_group("seasonal_mean");
    for season in Season::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(season), &season, |b, &season| {
            b.iter(|| {
                aggregator
                    .seasonal_mean(black_box("Station1"), &particles, season)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn benchmark_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");

    for years in [1, 2, 4] {
        let dataset = create_test_dataset(2, years);
        group.bench_with_input(BenchmarkId::new("years", years), &dataset, |b, dataset| {
            b.iter(|| DashboardBuilder::new(dataset).build(black_box("Station0")).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_aggregations, benchmark_dashboard);
criterion_main!(benches);
