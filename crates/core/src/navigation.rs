//! Client-side navigation targets.

use crate::model::GlobalTime;

/// Route of the trace explorer.
pub const TRACE_ROUTE: &str = "/trace";

pub mod query_param {
    pub const START_TIME: &str = "startTime";
    pub const END_TIME: &str = "endTime";
}

/// Receives navigation requests. Implementations decide what "navigate"
/// means: a browser history push, a status line, a log entry.
pub trait Navigator {
    fn push(&mut self, url: &str);
}

/// In-memory history stack.
#[derive(Debug, Clone, Default)]
pub struct HistoryNavigator {
    entries: Vec<String>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Navigator for HistoryNavigator {
    fn push(&mut self, url: &str) {
        tracing::info!(url, "navigate");
        self.entries.push(url.to_string());
    }
}

/// Deep link into the trace explorer, filtered to one operation of one
/// service over the selected time range.
///
/// The filter fragments are embedded literally, without escaping; the
/// explorer parses them as-is.
pub fn endpoint_deep_link(service_name: &str, operation: &str, time: &GlobalTime) -> String {
    let start = number_to_string(time.min_time_ms());
    let end = number_to_string(time.max_time_ms());
    format!(
        "{TRACE_ROUTE}?{start_key}={start}&{end_key}={end}\
         &selected={{\"serviceName\":[\"{service_name}\"],\"operation\":[\"{operation}\"]}}\
         &filterToFetchData=[\"duration\",\"status\",\"serviceName\",\"operation\"]\
         &spanAggregateCurrentPage=1\
         &selectedTags=[]\
         &&isFilterExclude={{\"serviceName\":false,\"operation\":false}}\
         &userSelectedFilter={{\"status\":[\"error\",\"ok\"],\"serviceName\":[\"{service_name}\"],\"operation\":[\"{operation}\"]}}\
         &spanAggregateCurrentPage=1\
         &spanAggregateOrder=ascend",
        start_key = query_param::START_TIME,
        end_key = query_param::END_TIME,
    )
}

/// Shortest round-trip decimal, without a trailing `.0` for integers.
fn number_to_string(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    format!("{v}")
}
