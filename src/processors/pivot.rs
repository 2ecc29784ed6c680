use crate::models::{HourlyKey, HourlyTable, HourlyWideRecord, RawRecord};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Running mean that stays finite for any finite input
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    mean: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    fn mean(&self) -> f64 {
        self.mean
    }
}

/// Spread long-form records into one row per (country, city, location, timestamp).
///
/// Several readings for the same key and parameter collapse to their mean.
pub fn pivot_records<'a, I>(records: I) -> HourlyTable
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut cells: BTreeMap<HourlyKey, BTreeMap<String, MeanAccumulator>> = BTreeMap::new();
    let mut parameters = BTreeSet::new();
    let mut input_rows = 0usize;

    for record in records {
        input_rows += 1;
        let key = HourlyKey {
            country: record.country.clone(),
            city: record.city.clone(),
            location: record.location.clone(),
            timestamp: record.timestamp.clone(),
        };

        cells
            .entry(key)
            .or_default()
            .entry(record.parameter.clone())
            .or_default()
            .push(record.value);
        parameters.insert(record.parameter.clone());
    }

    let rows: Vec<HourlyWideRecord> = cells
        .into_iter()
        .map(|(key, readings)| {
            let readings = readings
                .into_iter()
                .map(|(parameter, acc)| (parameter, acc.mean()))
                .collect();
            HourlyWideRecord::from_key(key, readings)
        })
        .collect();

    info!("Rows before pivot: {}, after pivot: {}", input_rows, rows.len());

    HourlyTable::new(parameters.into_iter().collect(), rows)
}
