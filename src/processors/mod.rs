pub mod aggregator;
pub mod cleanup;
pub mod mapper;
pub mod pipeline;
pub mod pivot;
pub mod planner;
pub mod reducer;

pub use aggregator::DailyAggregator;
pub use cleanup::CleanupSweeper;
pub use mapper::MapTransformer;
pub use pipeline::{new_request_id, LocalPipeline, PipelineReport};
pub use pivot::pivot_records;
pub use planner::InventoryPlanner;
pub use reducer::ReduceAggregator;
