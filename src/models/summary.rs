use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    CITY_COLUMN, COUNTRY_COLUMN, DATE_COLUMN, DATE_UTC_COLUMN, KNOWN_POLLUTANTS, LOCATION_COLUMN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    Min,
    Max,
    Mean,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Min, Statistic::Max, Statistic::Mean];

    /// Suffix used while aggregating, before columns are renamed
    pub fn internal_suffix(&self) -> &'static str {
        match self {
            Statistic::Min => "nanmin",
            Statistic::Max => "nanmax",
            Statistic::Mean => "nanmean",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Mean => "mean",
        }
    }

    pub fn internal_column(&self, pollutant: &str) -> String {
        format!("{}_{}", pollutant, self.internal_suffix())
    }

    pub fn column(&self, pollutant: &str) -> String {
        format!("{}_{}", pollutant, self.suffix())
    }
}

/// Daily statistics for one pollutant; all three are absent when no reading exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl PollutantStats {
    pub fn new(min: f64, max: f64, mean: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
        }
    }

    pub fn get(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Min => self.min,
            Statistic::Max => self.max,
            Statistic::Mean => self.mean,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.mean.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DailySummaryRecord {
    pub date: NaiveDate,
    pub country: String,
    pub city: String,

    #[validate(length(min = 1))]
    pub location: String,

    /// Only pollutants with at least one reading are present
    pub stats: BTreeMap<String, PollutantStats>,
}

impl DailySummaryRecord {
    pub fn new(date: NaiveDate, country: String, city: String, location: String) -> Self {
        Self {
            date,
            country,
            city,
            location,
            stats: BTreeMap::new(),
        }
    }

    pub fn with_stats(mut self, pollutant: &str, stats: PollutantStats) -> Self {
        self.stats.insert(pollutant.to_string(), stats);
        self
    }

    pub fn stat(&self, pollutant: &str, statistic: Statistic) -> Option<f64> {
        self.stats.get(pollutant).and_then(|s| s.get(statistic))
    }

    pub fn sort_key(&self) -> (NaiveDate, &str, &str, &str) {
        (
            self.date,
            self.country.as_str(),
            self.city.as_str(),
            self.location.as_str(),
        )
    }

    /// Check min <= mean <= max for every pollutant, allowing for float rounding
    pub fn validate_relationships(&self) -> Result<()> {
        for (pollutant, stats) in &self.stats {
            if let (Some(min), Some(max), Some(mean)) = (stats.min, stats.max, stats.mean) {
                let tolerance = 1e-9 * max.abs().max(min.abs()).max(1.0);
                if min > mean + tolerance || mean > max + tolerance {
                    return Err(ProcessingError::aggregation(format!(
                        "{} at {} on {}: inconsistent statistics min={} mean={} max={}",
                        pollutant, self.location, self.date, min, mean, max
                    )));
                }
            }
        }

        self.validate()?;

        Ok(())
    }
}

/// Order pollutants by the renaming table, unknown ones alphabetically after it
pub fn order_pollutants<I, S>(pollutants: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ordered: Vec<String> = pollutants.into_iter().map(Into::into).collect();
    ordered.sort_by(|a, b| {
        let rank = |p: &str| {
            KNOWN_POLLUTANTS
                .iter()
                .position(|known| *known == p)
                .unwrap_or(KNOWN_POLLUTANTS.len())
        };
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });
    ordered.dedup();
    ordered
}

/// Internal to external column names: `date.utc -> date`, `<p>_nanmin -> <p>_min`, ...
pub fn rename_table(pollutants: &[String]) -> Vec<(String, String)> {
    let mut table = vec![(DATE_UTC_COLUMN.to_string(), DATE_COLUMN.to_string())];
    for pollutant in pollutants {
        for statistic in Statistic::ALL {
            table.push((
                statistic.internal_column(pollutant),
                statistic.column(pollutant),
            ));
        }
    }
    table
}

/// The reduced day: ordered pollutant columns plus one row per location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    pub pollutants: Vec<String>,
    pub rows: Vec<DailySummaryRecord>,
}

impl SummaryTable {
    pub fn new(pollutants: Vec<String>, rows: Vec<DailySummaryRecord>) -> Self {
        Self { pollutants, rows }
    }

    /// External column names in output order
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            DATE_UTC_COLUMN.to_string(),
            COUNTRY_COLUMN.to_string(),
            CITY_COLUMN.to_string(),
            LOCATION_COLUMN.to_string(),
        ];
        for pollutant in &self.pollutants {
            for statistic in Statistic::ALL {
                columns.push(statistic.internal_column(pollutant));
            }
        }

        let renames: BTreeMap<String, String> =
            rename_table(&self.pollutants).into_iter().collect();
        columns
            .into_iter()
            .map(|c| renames.get(&c).cloned().unwrap_or(c))
            .collect()
    }

    /// Statistic cells of a row, in column order after the four key columns
    pub fn stat_cells(&self, row: &DailySummaryRecord) -> Vec<Option<f64>> {
        self.pollutants
            .iter()
            .flat_map(|p| Statistic::ALL.into_iter().map(move |s| row.stat(p, s)))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
