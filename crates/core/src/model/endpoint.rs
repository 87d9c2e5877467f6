use serde::{Deserialize, Serialize};
use tracedash_protocol::SharedStr;

/// Latency percentiles and call volume of one endpoint of a service.
///
/// Percentiles are in nanoseconds. `name` keys the row; duplicates are
/// rendered as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRow {
    pub name: SharedStr,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    #[serde(rename = "numCalls")]
    pub num_calls: u64,
}
