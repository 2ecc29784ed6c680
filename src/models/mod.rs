pub mod hourly;
pub mod payload;
pub mod record;
pub mod summary;

pub use hourly::{HourlyKey, HourlyTable, HourlyWideRecord};
pub use payload::{
    ArtifactReference, Chunk, CleanupOutput, CleanupRequest, InventoryPlan, MapOutput,
    ReduceOutput,
};
pub use record::{flatten_one_level, project_columns, Projection, RawRecord, RecordBatch};
pub use summary::{
    order_pollutants, rename_table, DailySummaryRecord, PollutantStats, Statistic, SummaryTable,
};
