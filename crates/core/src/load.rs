//! JSON loading for trace trees and endpoint tables.

use serde::Deserialize;
use thiserror::Error;

use crate::model::{EndpointRow, TraceMetaData, TraceSpanNode};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid trace JSON: {0}")]
    Trace(#[source] serde_json::Error),
    #[error("invalid endpoints JSON: {0}")]
    Endpoints(#[source] serde_json::Error),
}

/// A trace tree plus, optionally, metadata computed by whoever exported it.
#[derive(Debug, Clone)]
pub struct TraceDocument {
    pub tree: TraceSpanNode,
    pub meta: TraceMetaData,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Wrapped {
        #[serde(rename = "treeData")]
        tree_data: TraceSpanNode,
        #[serde(rename = "traceMetaData")]
        trace_meta_data: Option<TraceMetaData>,
    },
    Bare(TraceSpanNode),
}

/// Accepts either a bare span tree or `{"treeData": .., "traceMetaData": ..}`.
/// Missing metadata is derived from the tree.
pub fn load_trace(data: &[u8]) -> Result<TraceDocument, LoadError> {
    let file: TraceFile = serde_json::from_slice(data).map_err(LoadError::Trace)?;
    let (tree, meta) = match file {
        TraceFile::Wrapped {
            tree_data,
            trace_meta_data,
        } => (tree_data, trace_meta_data),
        TraceFile::Bare(tree) => (tree, None),
    };
    let meta = meta.unwrap_or_else(|| TraceMetaData::from_tree(&tree));
    tracing::debug!(
        root = %tree.id,
        spans = meta.total_spans,
        levels = meta.levels,
        "loaded trace"
    );
    Ok(TraceDocument { tree, meta })
}

pub fn load_endpoints(data: &[u8]) -> Result<Vec<EndpointRow>, LoadError> {
    let rows: Vec<EndpointRow> = serde_json::from_slice(data).map_err(LoadError::Endpoints)?;
    tracing::debug!(rows = rows.len(), "loaded endpoints");
    Ok(rows)
}
