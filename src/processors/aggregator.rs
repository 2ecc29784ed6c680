use crate::error::Result;
use crate::models::{order_pollutants, DailySummaryRecord, HourlyTable, PollutantStats, SummaryTable};
use crate::utils::dates::parse_utc_instant;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Running min/max/mean over the non-missing readings of one pollutant
#[derive(Debug, Clone, Copy)]
struct StatsAccumulator {
    min: f64,
    max: f64,
    mean: f64,
    count: usize,
}

impl StatsAccumulator {
    fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            mean: value,
            count: 1,
        }
    }

    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
        // Incremental mean; a running sum overflows near f64::MAX
        self.mean += (value - self.mean) / self.count as f64;
    }

    fn finish(&self) -> PollutantStats {
        PollutantStats::new(self.min, self.max, self.mean)
    }
}

type DayKey = (NaiveDate, String, String, String);

/// Reduces hourly tables to one summary row per location for a target day
pub struct DailyAggregator {
    target_date: NaiveDate,
}

impl DailyAggregator {
    pub fn new(target_date: NaiveDate) -> Self {
        Self { target_date }
    }

    pub fn aggregate(&self, tables: &[HourlyTable]) -> Result<SummaryTable> {
        let mut groups: BTreeMap<DayKey, BTreeMap<String, StatsAccumulator>> = BTreeMap::new();
        let mut pollutants = BTreeSet::new();
        let mut hourly_rows = 0usize;

        for table in tables {
            pollutants.extend(table.parameters.iter().cloned());

            for row in &table.rows {
                hourly_rows += 1;
                let day = parse_utc_instant(&row.timestamp)?.date_naive();
                let stats = groups
                    .entry((day, row.country.clone(), row.city.clone(), row.location.clone()))
                    .or_default();

                for (pollutant, &value) in &row.readings {
                    pollutants.insert(pollutant.clone());
                    if value.is_nan() {
                        continue;
                    }
                    stats
                        .entry(pollutant.clone())
                        .and_modify(|acc| acc.push(value))
                        .or_insert_with(|| StatsAccumulator::new(value));
                }
            }
        }

        let group_count = groups.len();

        // Keep the target day only
        let mut rows: Vec<DailySummaryRecord> = groups
            .into_iter()
            .filter(|((day, ..), _)| *day == self.target_date)
            .map(|((date, country, city, location), stats)| {
                let mut record = DailySummaryRecord::new(date, country, city, location);
                for (pollutant, acc) in stats {
                    record.stats.insert(pollutant, acc.finish());
                }
                record
            })
            .collect();

        let dropped = group_count - rows.len();
        if dropped > 0 {
            debug!("Dropped {} groups outside {}", dropped, self.target_date);
        }

        for row in &rows {
            row.validate_relationships()?;
        }

        dedup_rows(&mut rows);

        info!(
            "Aggregated {} hourly rows into {} daily rows for {}",
            hourly_rows,
            rows.len(),
            self.target_date
        );

        Ok(SummaryTable::new(order_pollutants(pollutants), rows))
    }
}

/// Sort by (date, country, city, location) and drop exact duplicates
pub fn dedup_rows(rows: &mut Vec<DailySummaryRecord>) {
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    rows.dedup();
}
