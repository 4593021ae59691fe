//! HTML dashboard pages.
//!
//! `/` renders the current host snapshot server-side. The log pages are
//! static shells that fetch `/api/logs/{priority}` from the browser.

use crate::error::ApiError;
use crate::routes::metrics::sample;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use shared::models::{MetricsSnapshot, Tier};

const METRICS_TEMPLATE: &str = include_str!("../../templates/metrics.html");
const LOGS_TEMPLATE: &str = include_str!("../../templates/logs.html");

/// Creates the dashboard page routes.
pub fn pages_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(metrics_page))
        .route("/logs", get(all_logs_page))
        .route("/logs/{tier}", get(tier_logs_page))
        .with_state(state)
}

async fn metrics_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let snapshot = sample(&state).await?;
    Ok(Html(render_metrics(&snapshot)))
}

async fn all_logs_page() -> Html<String> {
    Html(render(LOGS_TEMPLATE, &[("title", "All logs"), ("priority", "all")]))
}

async fn tier_logs_page(Path(tier): Path<String>) -> Result<Html<String>, StatusCode> {
    let tier: Tier = tier.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    let title = format!("{} priority logs", capitalize(tier.as_str()));
    Ok(Html(render(
        LOGS_TEMPLATE,
        &[("title", title.as_str()), ("priority", tier.as_str())],
    )))
}

fn disk_rows(snapshot: &MetricsSnapshot) -> String {
    snapshot
        .disk_usage
        .values()
        .map(|info| {
            format!(
                "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td></tr>",
                escape(&info.path),
                escape(&info.total),
                escape(&info.used),
                info.used_percent
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn network_rows(snapshot: &MetricsSnapshot) -> String {
    snapshot
        .network_io
        .iter()
        .map(|(name, info)| {
            format!(
                "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(name),
                escape(&info.bytes_sent),
                escape(&info.bytes_recv),
                info.packets_sent,
                info.packets_recv
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_metrics(snapshot: &MetricsSnapshot) -> String {
    let disk_rows = disk_rows(snapshot);
    let network_rows = network_rows(snapshot);
    let cpu_cores = snapshot
        .cpu_cores
        .iter()
        .map(|load| format!("{load:.1}%"))
        .collect::<Vec<_>>()
        .join(" ");
    let uptime = format!(
        "{}h {}m {}s",
        snapshot.uptime_hours, snapshot.uptime_minutes, snapshot.uptime_seconds
    );
    let cpu_usage = format!("{:.1}", snapshot.cpu_usage);
    let memory_usage = format!("{:.1}", snapshot.memory_usage);
    let hostname = escape(&snapshot.hostname);
    let platform = escape(&snapshot.platform);
    let os = escape(&snapshot.os);
    let kernel_arch = escape(&snapshot.kernel_arch);
    let formatted_total = escape(&snapshot.formatted_total);
    let formatted_free = escape(&snapshot.formatted_free);

    render(
        METRICS_TEMPLATE,
        &[
            ("hostname", hostname.as_str()),
            ("platform", platform.as_str()),
            ("os", os.as_str()),
            ("kernel_arch", kernel_arch.as_str()),
            ("uptime", uptime.as_str()),
            ("cpu_usage", cpu_usage.as_str()),
            ("cpu_cores", cpu_cores.as_str()),
            ("memory_usage", memory_usage.as_str()),
            ("formatted_total", formatted_total.as_str()),
            ("formatted_free", formatted_free.as_str()),
            ("disk_rows", disk_rows.as_str()),
            ("network_rows", network_rows.as_str()),
        ],
    )
}

/// Substitutes `{{key}}` placeholders in one pass. Unknown keys render empty.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        if let Some((_, value)) = values.iter().find(|(k, _)| *k == key) {
            out.push_str(value);
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
