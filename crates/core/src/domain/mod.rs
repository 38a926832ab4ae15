pub mod metric;
pub mod result;
pub mod ticker;

pub use metric::MetricDefinition;
pub use result::{AnalysisResult, FetchOutcome, MetricResult, SourceReading};
pub use ticker::Ticker;
