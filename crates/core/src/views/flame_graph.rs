//! Trace flame graph: one block per span, x = time, y = depth.
//!
//! Geometry is recomputed from the props on every render. Horizontal
//! position and width are percentages of the trace spread. Rows are a fixed
//! pixel height. The only state kept between renders is the per-span
//! highlight latch of the mounted [`FlameGraph`].

use std::collections::HashSet;

use tracedash_protocol::{
    Color, Paint, Rect, RenderCommand, SharedStr, ThemeMode, ThemeToken, Viewport,
};

use crate::format::to_fixed;
use crate::model::{IntervalUnit, TraceMetaData, TraceSpanNode};

/// Height of a span block in pixels.
pub const SPAN_HEIGHT: f64 = 10.0;
/// Vertical gap between rows.
pub const ROW_GAP: f64 = 5.0;
/// Distance between the tops of two consecutive rows.
pub const ROW_HEIGHT: f64 = SPAN_HEIGHT + ROW_GAP;
/// HSL lightness ratio applied to the service colour of a selected span.
pub const SELECTED_COLOR_RATIO: f64 = 0.3;

/// Everything one render pass of the flame graph depends on.
#[derive(Debug, Clone, Copy)]
pub struct FlameGraphProps<'a> {
    pub tree: Option<&'a TraceSpanNode>,
    pub meta: Option<&'a TraceMetaData>,
    /// Empty string means no span is hovered.
    pub hovered_span_id: &'a str,
    /// Empty string means no span is selected.
    pub selected_span_id: &'a str,
    pub interval_unit: &'a IntervalUnit,
    pub theme: ThemeMode,
}

/// Geometry of one span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanLayout {
    pub id: SharedStr,
    pub name: SharedStr,
    pub level: u32,
    /// Percent of the spread from the trace's global start.
    pub left_offset: f64,
    /// Percent of the spread.
    pub width: f64,
    /// Pixels from the top of the graph.
    pub top_offset: f64,
    /// Sum of the ancestors' left offsets. Informational only: `left_offset`
    /// is already anchored to the global start.
    pub parent_left_offset: f64,
    pub tooltip: SharedStr,
    pub service_colour: SharedStr,
}

/// Lay out every span of the tree, depth-first pre-order.
///
/// Callers must ensure `meta.spread > 0`; [`FlameGraph::render`] does.
pub fn layout_spans(
    tree: &TraceSpanNode,
    meta: &TraceMetaData,
    unit: &IntervalUnit,
) -> Vec<SpanLayout> {
    let mut out = Vec::with_capacity(meta.total_spans.max(1));
    layout_recursive(tree, meta, unit, 0, 0.0, &mut out);
    out
}

fn layout_recursive(
    node: &TraceSpanNode,
    meta: &TraceMetaData,
    unit: &IntervalUnit,
    level: u32,
    parent_left_offset: f64,
    out: &mut Vec<SpanLayout>,
) {
    let left_offset = ((node.start_time - meta.global_start) * 100.0) / meta.spread;
    let width = ((node.value / 1e6) * 100.0) / meta.spread;

    out.push(SpanLayout {
        id: node.id.clone(),
        name: node.name.clone(),
        level,
        left_offset,
        width,
        top_offset: f64::from(level) * ROW_HEIGHT,
        parent_left_offset,
        tooltip: tooltip_text(node, unit).into(),
        service_colour: node.service_colour.clone(),
    });

    for child in &node.children {
        layout_recursive(
            child,
            meta,
            unit,
            level + 1,
            left_offset + parent_left_offset,
            out,
        );
    }
}

/// `"{name}\n{duration} {unit}"`, duration converted from nanoseconds and
/// shown with two decimals.
pub fn tooltip_text(node: &TraceSpanNode, unit: &IntervalUnit) -> String {
    format!(
        "{}\n{} {}",
        node.name,
        to_fixed(unit.resolve(node.value / 1e6), 2),
        unit.name
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Unselected,
    Selected,
}

/// A laid-out span with its resolved appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanBlock {
    pub layout: SpanLayout,
    pub highlight: Highlight,
    pub fill: Paint,
    /// 1 for selected spans, so they paint above their siblings.
    pub z_index: u8,
}

impl SpanBlock {
    fn contains(&self, x_pct: f64, y_px: f64) -> bool {
        let l = &self.layout;
        x_pct >= l.left_offset
            && x_pct < l.left_offset + l.width
            && y_px >= l.top_offset
            && y_px < l.top_offset + SPAN_HEIGHT
    }
}

/// Output of one render pass. Blocks are in paint order: ascending
/// `z_index`, pre-order within a z level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlameGraphFrame {
    pub blocks: Vec<SpanBlock>,
    /// `ROW_HEIGHT * levels`, or 0 for an empty frame.
    pub height: f64,
}

impl FlameGraphFrame {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: &str) -> Option<&SpanBlock> {
        self.blocks.iter().find(|b| b.layout.id == id)
    }

    /// Topmost block under a point given as (percent of spread, pixels).
    pub fn hit_test(&self, x_pct: f64, y_px: f64) -> Option<&SpanBlock> {
        self.blocks.iter().rev().find(|b| b.contains(x_pct, y_px))
    }
}

/// Upward event channel of the flame graph. The graph never changes the
/// hovered or selected id itself; the owner does, then renders again.
pub trait SpanEventHandler {
    /// Called with the span id on pointer enter and with `""` on leave.
    fn on_span_hover(&mut self, id: &str);
    fn on_span_select(&mut self, id: &str);
}

/// A mounted flame graph.
///
/// A span becomes [`Highlight::Selected`] the first time its id matches the
/// hovered or selected id and stays selected for the lifetime of the mount.
/// A span that drops out of the tree loses its latch, so it comes back
/// unselected. Rendering a tree with a different root id, or an empty tree,
/// remounts and clears every latch.
#[derive(Debug, Default)]
pub struct FlameGraph {
    mount_key: Option<SharedStr>,
    latched: HashSet<SharedStr>,
    pointer_over: Option<SharedStr>,
}

impl FlameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_latched(&self, id: &str) -> bool {
        self.latched.contains(id)
    }

    pub fn render(&mut self, props: &FlameGraphProps<'_>) -> FlameGraphFrame {
        let (Some(tree), Some(meta)) = (props.tree, props.meta) else {
            tracing::debug!("flame graph: no trace data");
            self.unmount();
            return FlameGraphFrame::default();
        };
        if tree.is_empty_trace() {
            tracing::debug!("flame graph: empty trace placeholder");
            self.unmount();
            return FlameGraphFrame::default();
        }
        if !meta.has_usable_spread() {
            tracing::warn!(spread = meta.spread, "flame graph: non-positive spread");
            self.unmount();
            return FlameGraphFrame::default();
        }

        if self.mount_key.as_ref() != Some(&tree.id) {
            if self.mount_key.is_some() {
                tracing::debug!(root = %tree.id, "flame graph: remount");
            }
            self.unmount();
            self.mount_key = Some(tree.id.clone());
        }

        let layouts = layout_spans(tree, meta, props.interval_unit);
        if !self.latched.is_empty() {
            let present: HashSet<&str> = layouts.iter().map(|l| l.id.as_str()).collect();
            self.latched.retain(|id| present.contains(id.as_str()));
        }
        let mut blocks = Vec::with_capacity(layouts.len());
        for layout in layouts {
            let highlight = self.observe(&layout.id, props);
            let fill = span_fill(&layout.service_colour, highlight, props.theme);
            let z_index = match highlight {
                Highlight::Selected => 1,
                Highlight::Unselected => 0,
            };
            blocks.push(SpanBlock {
                layout,
                highlight,
                fill,
                z_index,
            });
        }
        // Stable: pre-order is kept within each z level.
        blocks.sort_by_key(|b| b.z_index);

        FlameGraphFrame {
            blocks,
            height: ROW_HEIGHT * f64::from(meta.levels),
        }
    }

    fn observe(&mut self, id: &SharedStr, props: &FlameGraphProps<'_>) -> Highlight {
        if self.latched.contains(id.as_str()) {
            return Highlight::Selected;
        }
        let matches = |other: &str| !other.is_empty() && *id == other;
        if matches(props.hovered_span_id) || matches(props.selected_span_id) {
            self.latched.insert(id.clone());
            Highlight::Selected
        } else {
            Highlight::Unselected
        }
    }

    fn unmount(&mut self) {
        self.mount_key = None;
        self.latched.clear();
        self.pointer_over = None;
    }

    /// Track the pointer and report enter/leave transitions.
    pub fn pointer_moved(
        &mut self,
        frame: &FlameGraphFrame,
        x_pct: f64,
        y_px: f64,
        handler: &mut impl SpanEventHandler,
    ) {
        let hit = frame.hit_test(x_pct, y_px).map(|b| b.layout.id.clone());
        if hit == self.pointer_over {
            return;
        }
        if self.pointer_over.take().is_some() {
            handler.on_span_hover("");
        }
        if let Some(id) = hit {
            handler.on_span_hover(&id);
            self.pointer_over = Some(id);
        }
    }

    /// The pointer left the graph entirely.
    pub fn pointer_left(&mut self, handler: &mut impl SpanEventHandler) {
        if self.pointer_over.take().is_some() {
            handler.on_span_hover("");
        }
    }

    pub fn click(
        &self,
        frame: &FlameGraphFrame,
        x_pct: f64,
        y_px: f64,
        handler: &mut impl SpanEventHandler,
    ) {
        if let Some(block) = frame.hit_test(x_pct, y_px) {
            handler.on_span_select(&block.layout.id);
        }
    }
}

/// Service colour, lightened on dark themes and darkened on light themes
/// once selected. Unparseable colours fall back to a theme token.
fn span_fill(service_colour: &str, highlight: Highlight, theme: ThemeMode) -> Paint {
    let base = match Color::from_hex(service_colour) {
        Ok(c) => c,
        Err(err) => {
            tracing::debug!(%err, "flame graph: falling back to neutral span colour");
            return Paint::Token(ThemeToken::FlameNeutral);
        }
    };
    match (highlight, theme) {
        (Highlight::Unselected, _) => Paint::Rgb(base),
        (Highlight::Selected, ThemeMode::Dark) => Paint::Rgb(base.lighten(SELECTED_COLOR_RATIO)),
        (Highlight::Selected, ThemeMode::Light) => Paint::Rgb(base.darken(SELECTED_COLOR_RATIO)),
    }
}

/// Percent-of-spread position of a viewport x coordinate.
pub fn x_to_pct(viewport: &Viewport, x_px: f64) -> f64 {
    if viewport.width <= 0.0 {
        return 0.0;
    }
    (x_px - viewport.x) * 100.0 / viewport.width
}

/// Convert a frame into pixel-space render commands.
pub fn render_flame_graph(frame: &FlameGraphFrame, viewport: &Viewport) -> Vec<RenderCommand> {
    if frame.is_empty() {
        return Vec::new();
    }

    let mut commands = Vec::with_capacity(frame.blocks.len() + 3);
    commands.push(RenderCommand::BeginGroup {
        id: "flame-graph".into(),
        label: Some("Trace flame graph".into()),
    });

    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(viewport.x, 0.0, viewport.width, frame.height),
        fill: Paint::Token(ThemeToken::Background),
        border_color: None,
        label: None,
        tooltip: None,
        hit_id: None,
    });

    for block in &frame.blocks {
        let l = &block.layout;
        let x = viewport.x + l.left_offset * viewport.width / 100.0;
        let w = l.width * viewport.width / 100.0;
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(x, l.top_offset, w, SPAN_HEIGHT),
            fill: block.fill,
            border_color: match block.highlight {
                Highlight::Selected => Some(ThemeToken::SpanSelectedBorder),
                Highlight::Unselected => Some(ThemeToken::SpanBorder),
            },
            label: Some(l.name.clone()),
            tooltip: Some(l.tooltip.clone()),
            hit_id: Some(l.id.clone()),
        });
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(
        id: &str,
        start: f64,
        value: f64,
        colour: &str,
        children: Vec<TraceSpanNode>,
    ) -> TraceSpanNode {
        TraceSpanNode {
            id: id.into(),
            name: format!("op-{id}").into(),
            start_time: start,
            value,
            service_colour: colour.into(),
            children,
        }
    }

    fn sample_tree() -> TraceSpanNode {
        span(
            "root",
            1000.0,
            10_000_000.0,
            "#808080",
            vec![
                span(
                    "a",
                    1002.0,
                    4_000_000.0,
                    "#808080",
                    vec![span("a1", 1003.0, 1_000_000.0, "#808080", vec![])],
                ),
                span("b", 1007.0, 2_500_000.0, "#808080", vec![]),
            ],
        )
    }

    fn meta(global_start: f64, spread: f64, levels: u32) -> TraceMetaData {
        TraceMetaData {
            global_start,
            global_end: global_start + spread,
            spread,
            levels,
            total_spans: 0,
        }
    }

    fn props<'a>(
        tree: &'a TraceSpanNode,
        meta: &'a TraceMetaData,
        unit: &'a IntervalUnit,
        hovered: &'a str,
        selected: &'a str,
    ) -> FlameGraphProps<'a> {
        FlameGraphProps {
            tree: Some(tree),
            meta: Some(meta),
            hovered_span_id: hovered,
            selected_span_id: selected,
            interval_unit: unit,
            theme: ThemeMode::Light,
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl SpanEventHandler for Recorder {
        fn on_span_hover(&mut self, id: &str) {
            self.events.push(format!("hover:{id}"));
        }
        fn on_span_select(&mut self, id: &str) {
            self.events.push(format!("select:{id}"));
        }
    }

    #[test]
    fn root_span_example() {
        let tree = span("r", 1000.0, 5_000_000.0, "#ff0000", vec![]);
        let layout = layout_spans(&tree, &meta(1000.0, 10.0, 1), &IntervalUnit::milliseconds());
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].left_offset, 0.0);
        assert_eq!(layout[0].width, 50.0);
        assert_eq!(layout[0].top_offset, 0.0);
    }

    #[test]
    fn offsets_follow_the_formulas() {
        let tree = sample_tree();
        let m = meta(1000.0, 12.0, 3);
        let layout = layout_spans(&tree, &m, &IntervalUnit::milliseconds());

        let ids: Vec<_> = layout.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["root", "a", "a1", "b"]);

        let tree_nodes = ["root", "a", "a1", "b"].map(|id| tree.find(id).cloned());
        for (l, node) in layout.iter().zip(tree_nodes) {
            let node = node.unwrap_or_else(TraceSpanNode::empty);
            assert_eq!(l.left_offset, ((node.start_time - 1000.0) * 100.0) / 12.0);
            assert_eq!(l.width, ((node.value / 1e6) * 100.0) / 12.0);
        }

        let levels: Vec<_> = layout.iter().map(|l| (l.level, l.top_offset)).collect();
        assert_eq!(levels, [(0, 0.0), (1, 15.0), (2, 30.0), (1, 15.0)]);
    }

    #[test]
    fn children_are_absolute_not_relative() {
        let tree = sample_tree();
        let layout = layout_spans(&tree, &meta(1000.0, 10.0, 3), &IntervalUnit::milliseconds());
        let a1 = &layout[2];
        assert_eq!(a1.left_offset, 30.0);
        // root (0) + a (20) accumulated, but not applied.
        assert_eq!(a1.parent_left_offset, 20.0);
    }

    #[test]
    fn tooltip_uses_interval_unit() {
        let node = span("x", 0.0, 1_234_567.0, "#000", vec![]);
        assert_eq!(tooltip_text(&node, &IntervalUnit::milliseconds()), "op-x\n1.23 ms");
        let slow = span("y", 0.0, 2_500_000_000.0, "#000", vec![]);
        assert_eq!(tooltip_text(&slow, &IntervalUnit::seconds()), "op-y\n2.50 s");
    }

    #[test]
    fn tooltip_rounds_halfway_durations_up() {
        let node = span("t", 0.0, 2_625_000.0, "#000", vec![]);
        assert_eq!(tooltip_text(&node, &IntervalUnit::milliseconds()), "op-t\n2.63 ms");
        let short = span("u", 0.0, 125_000.0, "#000", vec![]);
        assert_eq!(tooltip_text(&short, &IntervalUnit::milliseconds()), "op-u\n0.13 ms");
    }

    #[test]
    fn nothing_rendered_without_data() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 12.0, 3);
        let mut graph = FlameGraph::new();

        let mut no_tree = props(&tree, &m, &unit, "", "");
        no_tree.tree = None;
        assert!(graph.render(&no_tree).is_empty());

        let mut no_meta = props(&tree, &m, &unit, "", "");
        no_meta.meta = None;
        assert!(graph.render(&no_meta).is_empty());

        let placeholder = TraceSpanNode::empty();
        let frame = graph.render(&props(&placeholder, &m, &unit, "", ""));
        assert!(frame.is_empty());
        assert!(render_flame_graph(&frame, &Viewport::sized(800.0, 100.0)).is_empty());
    }

    #[test]
    fn zero_spread_renders_nothing() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 0.0, 3);
        assert!(FlameGraph::new().render(&props(&tree, &m, &unit, "", "")).is_empty());
    }

    #[test]
    fn selection_latches_for_the_mount() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 12.0, 3);
        let mut graph = FlameGraph::new();

        let frame = graph.render(&props(&tree, &m, &unit, "a", ""));
        assert_eq!(frame.block("a").map(|b| b.highlight), Some(Highlight::Selected));
        assert_eq!(frame.block("b").map(|b| b.highlight), Some(Highlight::Unselected));

        // Hover moves on; "a" stays selected.
        let frame = graph.render(&props(&tree, &m, &unit, "b", "a1"));
        for id in ["a", "b", "a1"] {
            assert_eq!(frame.block(id).map(|b| b.highlight), Some(Highlight::Selected), "{id}");
        }

        let frame = graph.render(&props(&tree, &m, &unit, "", ""));
        assert_eq!(frame.block("a").map(|b| b.highlight), Some(Highlight::Selected));
        assert_eq!(frame.block("root").map(|b| b.highlight), Some(Highlight::Unselected));
    }

    #[test]
    fn removed_span_loses_its_latch() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 12.0, 3);
        let mut graph = FlameGraph::new();
        graph.render(&props(&tree, &m, &unit, "a", "b"));
        assert!(graph.is_latched("a"));

        // Same root, "a" and its child gone.
        let mut pruned = sample_tree();
        pruned.children.retain(|c| c.id != "a");
        let frame = graph.render(&props(&pruned, &m, &unit, "", ""));
        assert!(frame.block("a").is_none());
        assert!(!graph.is_latched("a"));
        assert!(graph.is_latched("b"));

        // Back again with nothing hovered: a fresh, unselected span.
        let frame = graph.render(&props(&tree, &m, &unit, "", ""));
        assert_eq!(frame.block("a").map(|b| b.highlight), Some(Highlight::Unselected));
        assert_eq!(frame.block("b").map(|b| b.highlight), Some(Highlight::Selected));
    }

    #[test]
    fn new_root_remounts() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 12.0, 3);
        let mut graph = FlameGraph::new();
        graph.render(&props(&tree, &m, &unit, "a", ""));
        assert!(graph.is_latched("a"));

        let mut other = sample_tree();
        other.id = "root-2".into();
        let frame = graph.render(&props(&other, &m, &unit, "", ""));
        assert!(!graph.is_latched("a"));
        assert_eq!(frame.block("a").map(|b| b.highlight), Some(Highlight::Unselected));
    }

    #[test]
    fn selected_blocks_paint_last_with_adjusted_colour() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 12.0, 3);
        let mut graph = FlameGraph::new();
        let frame = graph.render(&props(&tree, &m, &unit, "", "a"));

        let order: Vec<_> = frame.blocks.iter().map(|b| b.layout.id.as_str()).collect();
        assert_eq!(order, ["root", "a1", "b", "a"]);
        assert_eq!(frame.blocks[3].z_index, 1);
        assert_eq!(frame.blocks[0].z_index, 0);

        let hex = |p: Paint| match p {
            Paint::Rgb(c) => c.to_hex(),
            Paint::Token(_) => String::new(),
        };
        assert_eq!(hex(frame.blocks[0].fill), "#808080");
        // Light theme darkens.
        assert_eq!(hex(frame.blocks[3].fill), "#5a5a5a");

        let mut dark = props(&tree, &m, &unit, "", "a");
        dark.theme = ThemeMode::Dark;
        let frame = FlameGraph::new().render(&dark);
        assert_eq!(frame.block("a").map(|b| hex(b.fill)), Some("#a6a6a6".to_string()));
    }

    #[test]
    fn bad_colour_falls_back_to_token() {
        let unit = IntervalUnit::milliseconds();
        let tree = span("r", 0.0, 1_000_000.0, "not-a-colour", vec![]);
        let m = meta(0.0, 1.0, 1);
        let frame = FlameGraph::new().render(&props(&tree, &m, &unit, "", ""));
        assert_eq!(frame.blocks[0].fill, Paint::Token(ThemeToken::FlameNeutral));
    }

    #[test]
    fn frame_height_tracks_levels() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 12.0, 3);
        let frame = FlameGraph::new().render(&props(&tree, &m, &unit, "", ""));
        assert_eq!(frame.height, 45.0);
    }

    #[test]
    fn hover_enter_and_leave_are_reported() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 10.0, 3);
        let mut graph = FlameGraph::new();
        let frame = graph.render(&props(&tree, &m, &unit, "", ""));
        let mut rec = Recorder::default();

        // Row 1: "a" covers 20%..60%, "b" covers 70%..95%.
        graph.pointer_moved(&frame, 25.0, 16.0, &mut rec);
        graph.pointer_moved(&frame, 30.0, 17.0, &mut rec);
        graph.pointer_moved(&frame, 75.0, 16.0, &mut rec);
        // Gap between rows.
        graph.pointer_moved(&frame, 75.0, 27.0, &mut rec);
        graph.pointer_moved(&frame, 5.0, 2.0, &mut rec);
        graph.pointer_left(&mut rec);
        graph.pointer_left(&mut rec);

        assert_eq!(
            rec.events,
            ["hover:a", "hover:", "hover:b", "hover:", "hover:root", "hover:"]
        );
    }

    #[test]
    fn click_selects_topmost_block() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 10.0, 3);
        let mut graph = FlameGraph::new();
        let frame = graph.render(&props(&tree, &m, &unit, "", ""));
        let mut rec = Recorder::default();

        graph.click(&frame, 35.0, 31.0, &mut rec);
        graph.click(&frame, 99.0, 31.0, &mut rec);
        assert_eq!(rec.events, ["select:a1"]);
        // The graph itself never selects.
        assert!(!graph.is_latched("a1"));
    }

    #[test]
    fn render_commands_scale_to_viewport() {
        let unit = IntervalUnit::milliseconds();
        let tree = sample_tree();
        let m = meta(1000.0, 10.0, 3);
        let frame = FlameGraph::new().render(&props(&tree, &m, &unit, "", ""));
        let vp = Viewport::sized(500.0, 100.0);
        let cmds = render_flame_graph(&frame, &vp);

        let spans: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect {
                    rect,
                    hit_id: Some(id),
                    tooltip,
                    ..
                } => Some((id.clone(), *rect, tooltip.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(spans.len(), 4);
        let (id, rect, tooltip) = &spans[1];
        assert_eq!(id, "a");
        assert_eq!(*rect, Rect::new(100.0, 15.0, 200.0, SPAN_HEIGHT));
        assert_eq!(tooltip.as_deref(), Some("op-a\n4.00 ms"));
        assert!(matches!(cmds.first(), Some(RenderCommand::BeginGroup { .. })));
        assert!(matches!(cmds.last(), Some(RenderCommand::EndGroup)));
    }

    #[test]
    fn pixel_to_percent() {
        let vp = Viewport::sized(400.0, 50.0);
        assert_eq!(x_to_pct(&vp, 100.0), 25.0);
        assert_eq!(x_to_pct(&Viewport::sized(0.0, 0.0), 10.0), 0.0);
    }
}
