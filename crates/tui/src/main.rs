mod endpoints;
mod flame;
mod renderer;
mod terminal;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracedash_client::{ApiClient, ClientConfig};
use tracedash_core::load::{load_endpoints, load_trace};
use tracedash_core::model::{GlobalTime, IntervalUnit};
use tracedash_core::svg::render_svg;
use tracedash_core::views::endpoints_table::EndpointsTable;
use tracedash_core::views::flame_graph::{FlameGraph, FlameGraphProps, render_flame_graph};
use tracedash_protocol::{ThemeMode, Viewport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tracedash")]
#[command(about = "Trace flame graphs and endpoint tables in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct ThemeArgs {
    /// Dark palette (default)
    #[arg(long, conflicts_with = "light")]
    dark: bool,

    /// Light palette
    #[arg(long)]
    light: bool,
}

impl ThemeArgs {
    fn mode(self) -> ThemeMode {
        match (self.dark, self.light) {
            (false, true) => ThemeMode::Light,
            _ => ThemeMode::Dark,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive flame graph of a trace
    Flame {
        /// Trace JSON: a span tree, or `{"treeData": .., "traceMetaData": ..}`
        trace: PathBuf,

        #[command(flatten)]
        theme: ThemeArgs,

        /// Duration unit: ms, s or m. Picked from the trace length if omitted.
        #[arg(long, value_parser = parse_unit)]
        unit: Option<IntervalUnit>,
    },

    /// Export a flame graph as SVG
    Svg {
        trace: PathBuf,

        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Width of the image in pixels
        #[arg(long, default_value = "1200")]
        width: f64,

        #[command(flatten)]
        theme: ThemeArgs,

        #[arg(long, value_parser = parse_unit)]
        unit: Option<IntervalUnit>,
    },

    /// Interactive "Top Endpoints" table
    Endpoints {
        /// JSON array of `{name, p50, p95, p99, numCalls}`
        rows: PathBuf,

        /// Service the endpoints belong to
        #[arg(long)]
        service: String,

        /// Start of the selected range, nanoseconds
        #[arg(long)]
        min_time: f64,

        /// End of the selected range, nanoseconds
        #[arg(long)]
        max_time: f64,

        #[command(flatten)]
        theme: ThemeArgs,
    },

    /// Store user preferences and print the result envelope
    SetPreference {
        /// Query-service API root
        #[arg(long, env = "TRACEDASH_API_URL", default_value = tracedash_client::config::DEFAULT_BASE_URL)]
        api_url: String,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Preferences as key=value; values are parsed as JSON when possible
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, Value)>,
    },
}

fn parse_unit(s: &str) -> Result<IntervalUnit, String> {
    IntervalUnit::by_name(s).ok_or_else(|| format!("unknown unit `{s}` (expected ms, s or m)"))
}

fn parse_pair(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Full-screen views share the terminal with stderr.
    let interactive = matches!(
        cli.command,
        Commands::Flame { .. } | Commands::Endpoints { .. }
    );
    init_tracing(if interactive { "warn" } else { "info" });

    match cli.command {
        Commands::Flame { trace, theme, unit } => {
            let doc = read_trace(&trace)?;
            let unit = unit.unwrap_or_else(|| IntervalUnit::for_spread(doc.meta.spread));
            flame::run(&doc, &unit, theme.mode())
        }
        Commands::Svg {
            trace,
            output,
            width,
            theme,
            unit,
        } => {
            let doc = read_trace(&trace)?;
            let unit = unit.unwrap_or_else(|| IntervalUnit::for_spread(doc.meta.spread));
            let svg = export_svg(&doc, &unit, width, theme.mode())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, svg)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "wrote svg");
                }
                None => std::io::stdout().lock().write_all(svg.as_bytes())?,
            }
            Ok(())
        }
        Commands::Endpoints {
            rows,
            service,
            min_time,
            max_time,
            theme,
        } => {
            let data =
                std::fs::read(&rows).with_context(|| format!("reading {}", rows.display()))?;
            let table = EndpointsTable::new(load_endpoints(&data)?);
            let time = GlobalTime::new(min_time, max_time);
            endpoints::run(&table, &service, &time, theme.mode())
        }
        Commands::SetPreference {
            api_url,
            timeout,
            pairs,
        } => {
            let config = ClientConfig {
                timeout: timeout.map(std::time::Duration::from_secs),
                ..ClientConfig::with_base_url(api_url)
            };
            let props: Map<String, Value> = pairs.into_iter().collect();
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let api = ApiClient::new(config)?;
            let result = runtime.block_on(api.set_preference(&props));
            let mut out = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
            if !result.is_success() {
                bail!("request failed with status {}", result.status_code());
            }
            Ok(())
        }
    }
}

fn read_trace(path: &Path) -> Result<tracedash_core::load::TraceDocument> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(load_trace(&data)?)
}

fn export_svg(
    doc: &tracedash_core::load::TraceDocument,
    unit: &IntervalUnit,
    width: f64,
    theme: ThemeMode,
) -> Result<String> {
    let mut graph = FlameGraph::new();
    let frame = graph.render(&FlameGraphProps {
        tree: Some(&doc.tree),
        meta: Some(&doc.meta),
        hovered_span_id: "",
        selected_span_id: "",
        interval_unit: unit,
        theme,
    });
    if frame.is_empty() {
        bail!("trace has nothing to draw");
    }
    let viewport = Viewport::sized(width, frame.height);
    let commands = render_flame_graph(&frame, &viewport);
    Ok(render_svg(&commands, width, frame.height, theme))
}
