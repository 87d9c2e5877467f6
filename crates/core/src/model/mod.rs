pub mod endpoint;
pub mod time;
pub mod trace;

pub use endpoint::EndpointRow;
pub use time::{GlobalTime, IntervalUnit};
pub use trace::{EMPTY_TRACE_ID, TraceMetaData, TraceSpanNode};
