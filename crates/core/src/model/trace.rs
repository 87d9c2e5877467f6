use serde::{Deserialize, Serialize};
use tracedash_protocol::SharedStr;

/// Root id used by the trace loader for "no trace yet".
pub const EMPTY_TRACE_ID: &str = "empty";

/// One span of a distributed trace, with its children in display order.
///
/// `start_time` is absolute and shares the unit of
/// [`TraceMetaData::global_start`] (milliseconds). `value` is the span's
/// duration in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSpanNode {
    pub id: SharedStr,
    pub name: SharedStr,
    pub start_time: f64,
    pub value: f64,
    pub service_colour: SharedStr,
    #[serde(default)]
    pub children: Vec<TraceSpanNode>,
}

impl TraceSpanNode {
    /// The placeholder tree the flame graph renders as nothing.
    pub fn empty() -> Self {
        Self {
            id: EMPTY_TRACE_ID.into(),
            name: SharedStr::default(),
            start_time: 0.0,
            value: 0.0,
            service_colour: SharedStr::default(),
            children: Vec::new(),
        }
    }

    pub fn is_empty_trace(&self) -> bool {
        self.id == EMPTY_TRACE_ID
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.value / 1e6
    }

    /// Pre-order walk with the depth of each node (root = `root_level`).
    pub fn walk(&self, root_level: u32, visit: &mut impl FnMut(&TraceSpanNode, u32)) {
        visit(self, root_level);
        for child in &self.children {
            child.walk(root_level + 1, visit);
        }
    }

    pub fn find(&self, id: &str) -> Option<&TraceSpanNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Per-trace geometry shared by every span of the flame graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceMetaData {
    pub global_start: f64,
    #[serde(default)]
    pub global_end: f64,
    /// Visible duration, `global_end - global_start`. Must be positive.
    pub spread: f64,
    /// Number of rows (maximum depth, root counted as 1).
    pub levels: u32,
    #[serde(default)]
    pub total_spans: usize,
}

impl TraceMetaData {
    /// Derive metadata from a tree: earliest start, latest end
    /// (`start_time + value / 1e6`), depth and span count.
    pub fn from_tree(root: &TraceSpanNode) -> Self {
        let mut global_start = f64::INFINITY;
        let mut global_end = f64::NEG_INFINITY;
        let mut levels: u32 = 1;
        let mut total_spans: usize = 0;

        root.walk(1, &mut |node: &TraceSpanNode, level: u32| {
            total_spans += 1;
            levels = levels.max(level);
            global_start = global_start.min(node.start_time);
            global_end = global_end.max(node.start_time + node.duration_ms());
        });

        Self {
            global_start,
            global_end,
            spread: global_end - global_start,
            levels,
            total_spans,
        }
    }

    /// `spread` is the divisor of every layout formula.
    pub fn has_usable_spread(&self) -> bool {
        self.spread.is_finite() && self.spread > 0.0
    }
}
