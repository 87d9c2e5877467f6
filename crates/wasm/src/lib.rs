use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracedash_core::load::{LoadError, load_endpoints, load_trace};
use tracedash_core::model::{GlobalTime, IntervalUnit, TraceMetaData, TraceSpanNode};
use tracedash_core::navigation::endpoint_deep_link;
use tracedash_core::views::endpoints_table::{
    self, EndpointColumn, EndpointsTable, SortOrder, TableSort,
};
use tracedash_core::views::flame_graph::{
    self, FlameGraph, FlameGraphFrame, FlameGraphProps, x_to_pct,
};
use tracedash_protocol::{RenderCommand, ThemeMode, Viewport};
use wasm_bindgen::prelude::*;

/// A flame graph mounted by the host, with the frame it last rendered.
struct Mounted {
    graph: FlameGraph,
    frame: FlameGraphFrame,
    viewport: Viewport,
}

impl Mounted {
    fn new() -> Self {
        Self {
            graph: FlameGraph::new(),
            frame: FlameGraphFrame::default(),
            viewport: Viewport::sized(0.0, 0.0),
        }
    }
}

/// Handle-indexed mounted graphs. Unmounted slots are reused, so the
/// registry never holds more slots than graphs mounted at one time.
struct Registry {
    slots: Vec<Option<Mounted>>,
}

impl Registry {
    const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    fn mount(&mut self) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(handle) => {
                self.slots[handle] = Some(Mounted::new());
                handle
            }
            None => {
                self.slots.push(Some(Mounted::new()));
                self.slots.len() - 1
            }
        }
    }

    fn unmount(&mut self, handle: usize) -> BridgeResult<()> {
        match self.slots.get_mut(handle) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                Ok(())
            }
            _ => Err(BridgeError::InvalidHandle(handle)),
        }
    }

    fn get_mut(&mut self, handle: usize) -> BridgeResult<&mut Mounted> {
        self.slots
            .get_mut(handle)
            .and_then(Option::as_mut)
            .ok_or(BridgeError::InvalidHandle(handle))
    }
}

static GRAPHS: Mutex<Registry> = Mutex::new(Registry::new());

#[derive(Debug, Error)]
enum BridgeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("no mounted flame graph with handle {0}")]
    InvalidHandle(usize),
    #[error("flame graph registry is poisoned")]
    Poisoned,
    #[error("unknown interval unit: {0}")]
    UnknownUnit(String),
    #[error("unknown sort column: {0}")]
    UnknownColumn(String),
    #[error("unknown sort order: {0}")]
    UnknownOrder(String),
}

// `From<BridgeError> for JsError` comes from wasm-bindgen's blanket impl
// for `std::error::Error` types, which builds the JsError from `to_string()`.

type BridgeResult<T> = Result<T, BridgeError>;

/// Everything the host passes on each render.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlameGraphInput {
    #[serde(default)]
    tree: Option<TraceSpanNode>,
    #[serde(default)]
    meta: Option<TraceMetaData>,
    #[serde(default)]
    hovered_span_id: String,
    #[serde(default)]
    selected_span_id: String,
    /// `ms`, `s` or `m`; milliseconds when absent.
    #[serde(default)]
    interval_unit: Option<String>,
    #[serde(default)]
    theme: ThemeMode,
}

#[derive(Debug, Serialize)]
struct FlameGraphOutput<'a> {
    height: f64,
    commands: &'a [RenderCommand],
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn with_graph<T>(handle: usize, f: impl FnOnce(&mut Mounted) -> T) -> BridgeResult<T> {
    let mut graphs = GRAPHS.lock().map_err(|_| BridgeError::Poisoned)?;
    graphs.get_mut(handle).map(f)
}

fn mount() -> BridgeResult<usize> {
    let mut graphs = GRAPHS.lock().map_err(|_| BridgeError::Poisoned)?;
    Ok(graphs.mount())
}

fn unmount(handle: usize) -> BridgeResult<()> {
    let mut graphs = GRAPHS.lock().map_err(|_| BridgeError::Poisoned)?;
    graphs.unmount(handle)
}

fn render_graph(handle: usize, input_json: &str, viewport: Viewport) -> BridgeResult<String> {
    let input: FlameGraphInput = serde_json::from_str(input_json)?;
    let unit = match input.interval_unit.as_deref() {
        None => IntervalUnit::default(),
        Some(name) => {
            IntervalUnit::by_name(name).ok_or_else(|| BridgeError::UnknownUnit(name.to_string()))?
        }
    };
    let props = FlameGraphProps {
        tree: input.tree.as_ref(),
        meta: input.meta.as_ref(),
        hovered_span_id: &input.hovered_span_id,
        selected_span_id: &input.selected_span_id,
        interval_unit: &unit,
        theme: input.theme,
    };

    let json = with_graph(handle, |mounted| {
        mounted.frame = mounted.graph.render(&props);
        mounted.viewport = viewport;
        let commands = flame_graph::render_flame_graph(&mounted.frame, &viewport);
        serde_json::to_string(&FlameGraphOutput {
            height: mounted.frame.height,
            commands: &commands,
        })
    })??;
    Ok(json)
}

fn hit_test(handle: usize, x_px: f64, y_px: f64) -> BridgeResult<Option<String>> {
    with_graph(handle, |mounted| {
        let x_pct = x_to_pct(&mounted.viewport, x_px);
        mounted
            .frame
            .hit_test(x_pct, y_px)
            .map(|block| block.layout.id.to_string())
    })
}

fn metadata(trace_json: &str) -> BridgeResult<String> {
    let doc = load_trace(trace_json.as_bytes())?;
    Ok(serde_json::to_string(&doc.meta)?)
}

fn parse_sort(column: Option<&str>, order: Option<&str>) -> BridgeResult<Option<TableSort>> {
    let Some(key) = column else {
        return Ok(None);
    };
    let column =
        EndpointColumn::from_key(key).ok_or_else(|| BridgeError::UnknownColumn(key.to_string()))?;
    let order = match order.unwrap_or("ascend") {
        "ascend" => SortOrder::Ascend,
        "descend" => SortOrder::Descend,
        other => return Err(BridgeError::UnknownOrder(other.to_string())),
    };
    Ok(Some(TableSort { column, order }))
}

fn table_commands(
    rows_json: &str,
    viewport: Viewport,
    sort_column: Option<&str>,
    sort_order: Option<&str>,
) -> BridgeResult<String> {
    let table = EndpointsTable::new(load_endpoints(rows_json.as_bytes())?);
    let sort = parse_sort(sort_column, sort_order)?;
    let commands = endpoints_table::render_endpoints_table(&table, &viewport, sort, None);
    Ok(serde_json::to_string(&commands)?)
}

/// Create a flame graph instance. Returns its handle.
#[wasm_bindgen]
pub fn mount_flame_graph() -> Result<usize, JsError> {
    Ok(mount()?)
}

/// Render a mounted flame graph.
///
/// `input_json` is `{tree, meta, hoveredSpanId, selectedSpanId,
/// intervalUnit, theme}`; returns `{height, commands}`.
#[wasm_bindgen]
pub fn render_flame_graph(
    handle: usize,
    input_json: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    dpr: f64,
) -> Result<String, JsError> {
    let viewport = Viewport {
        x,
        y,
        width,
        height,
        dpr,
    };
    Ok(render_graph(handle, input_json, viewport)?)
}

/// Id of the span under a pixel position of the last render, if any.
#[wasm_bindgen]
pub fn flame_graph_hit_test(handle: usize, x: f64, y: f64) -> Result<Option<String>, JsError> {
    Ok(hit_test(handle, x, y)?)
}

#[wasm_bindgen]
pub fn unmount_flame_graph(handle: usize) -> Result<(), JsError> {
    Ok(unmount(handle)?)
}

/// Metadata derived from a trace (or the one it carries), as JSON.
#[wasm_bindgen]
pub fn trace_metadata(trace_json: &str) -> Result<String, JsError> {
    Ok(metadata(trace_json)?)
}

/// Render commands for the endpoints table. `scroll_y` scrolls the body
/// under the pinned header. `sort_column` is an API field name (`p50`,
/// `numCalls`, ...), `sort_order` is `ascend` or `descend`.
#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)]
pub fn render_endpoints_table(
    rows_json: &str,
    width: f64,
    height: f64,
    scroll_y: f64,
    sort_column: Option<String>,
    sort_order: Option<String>,
) -> Result<String, JsError> {
    Ok(table_commands(
        rows_json,
        Viewport {
            y: scroll_y,
            ..Viewport::sized(width, height)
        },
        sort_column.as_deref(),
        sort_order.as_deref(),
    )?)
}

/// Deep link for a clicked endpoint name. Times are nanoseconds.
#[wasm_bindgen]
pub fn endpoint_link(service_name: &str, operation: &str, min_time: f64, max_time: f64) -> String {
    endpoint_deep_link(
        service_name,
        operation,
        &GlobalTime::new(min_time, max_time),
    )
}
