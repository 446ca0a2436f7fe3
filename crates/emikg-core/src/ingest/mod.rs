mod builder;
mod pipeline;
mod reader;
mod record;
mod sink;

pub use builder::{BatchStats, GraphBatchBuilder, RowIndexCounter, Vocabularies};
pub use pipeline::{PipelineStats, StreamingPipeline};
pub use reader::{is_gzip, open_input, RecordReader};
pub use record::{
    has_value, is_absent, is_unmatched, ColumnSchema, InteractionRecord, Side, SideRecord,
};
pub use sink::GraphSink;
