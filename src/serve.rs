//! HTTP server for the interactive dashboard
//!
//! `artistgrid serve history.csv` → starts server, opens browser, shows the grid
//!
//! Every selector change reloads `/` with new query parameters; the page
//! frames `/grid`, which renders from the ranking cache.

use crate::cache::RankingCache;
use crate::config::AppConfig;
use crate::error::{Error, InvalidGridSizeError, InvalidWindowError};
use crate::grid::{GridLayout, GridSize};
use crate::history;
use crate::report::{html, Report};
use crate::window::Window;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self { ok: false, data: None, error: Some(message) }
    }
}

/// Raw selector values as they arrive in the query string
#[derive(Deserialize, Debug, Default)]
struct RawParams {
    grid: Option<String>,
    window: Option<String>,
}

/// Validated selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub grid: GridSize,
    pub window: Window,
}

/// Why a request's selection was rejected
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error(transparent)]
    Grid(#[from] InvalidGridSizeError),
    #[error(transparent)]
    Window(#[from] InvalidWindowError),
    #[error("malformed query string: {0}")]
    Query(String),
}

#[derive(Serialize)]
struct TopResponse<'a> {
    grid: GridSize,
    window: Window,
    window_label: &'static str,
    title: String,
    first_listen: Option<DateTime<Utc>>,
    last_listen: Option<DateTime<Utc>>,
    artists: &'a [crate::RankedEntity],
}

/// Dashboard state owned by the request loop
pub struct Dashboard {
    cache: RankingCache,
    layout: GridLayout,
    defaults: Selection,
}

impl Dashboard {
    pub fn new(cache: RankingCache, layout: GridLayout, defaults: Selection) -> Self {
        Self { cache, layout, defaults }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let cache = RankingCache::open(&config.data_path)?;
        Ok(Self::new(
            cache,
            config.layout,
            Selection {
                grid: config.default_grid,
                window: config.default_window,
            },
        ))
    }

    /// Route one request. Returns status, content type and body.
    pub fn route(&mut self, method: &Method, url: &str) -> (u16, &'static str, String) {
        let path = url.split('?').next().unwrap_or("/");

        if method != &Method::Get {
            return (405, "text/plain", "Method not allowed".to_string());
        }

        if !matches!(path, "/" | "/grid" | "/api/top") {
            return not_found();
        }

        let selection = match parse_selection(url, self.defaults) {
            Ok(selection) => selection,
            Err(e) => {
                return match path {
                    "/api/top" => (400, "application/json", json_body(&ApiResponse::failure(e.to_string()))),
                    _ => (400, "text/plain", e.to_string()),
                }
            }
        };

        match path {
            // Selectors + framed grid
            "/" => (
                200,
                "text/html; charset=utf-8",
                html::render_dashboard(selection.grid, selection.window, &self.layout),
            ),

            // The grid itself
            "/grid" => match self.report(selection) {
                Ok(report) => (200, "text/html; charset=utf-8", html::render_grid(&report)),
                Err(e) => {
                    error!("Failed to build grid: {}", e);
                    (500, "text/plain", e.to_string())
                }
            },

            // API: ranking as JSON
            "/api/top" => match self.cache.ranking(selection.window, selection.grid) {
                Ok(artists) => {
                    let span = history::span(self.cache.events());
                    let body = TopResponse {
                        grid: selection.grid,
                        window: selection.window,
                        window_label: selection.window.label(),
                        title: crate::report::title(selection.grid, selection.window),
                        first_listen: span.map(|(first, _)| first),
                        last_listen: span.map(|(_, last)| last),
                        artists: &artists,
                    };
                    (200, "application/json", json_body(&ApiResponse::success(body)))
                }
                Err(e) => (500, "application/json", json_body(&ApiResponse::failure(e.to_string()))),
            },

            _ => not_found(),
        }
    }

    fn report(&mut self, selection: Selection) -> Result<Report, Error> {
        let artists = self.cache.ranking(selection.window, selection.grid)?;
        Ok(Report::new(
            selection.window,
            selection.grid,
            self.layout,
            self.cache.events(),
            artists.to_vec(),
        ))
    }

    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }
}

/// Start server, open browser, serve the dashboard
pub fn start(config: &AppConfig) -> io::Result<()> {
    let mut dashboard = Dashboard::from_config(config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let addr = format!("127.0.0.1:{}", config.port);
    let server = Server::http(&addr).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", config.port);
    let path_str = config
        .data_path
        .canonicalize()
        .unwrap_or_else(|_| config.data_path.clone())
        .display()
        .to_string();

    eprintln!("\n\x1b[1;32m▦ artistgrid\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   History: {} ({} listens)\n", path_str, dashboard.cache().events().len());

    // Open browser
    let _ = open::that(&url);

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut dashboard) {
            error!("Error: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, dashboard: &mut Dashboard) -> io::Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();

    let (status, content_type, body) = dashboard.route(&method, &url);
    info!("{} {} -> {}", method, url, status);

    let stats = dashboard.cache().stats();
    debug!(
        "cache: {} hits, {} misses, {} entries, {} reloads",
        stats.hits, stats.misses, stats.entries, stats.reloads
    );

    let header = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid content type"))?;
    let response = Response::from_string(body)
        .with_status_code(status)
        .with_header(header);
    request.respond(response)
}

/// Parse `grid` and `window` from the query string, falling back to defaults
/// for absent keys. Present but invalid values are an error.
pub fn parse_selection(url: &str, defaults: Selection) -> Result<Selection, ParamError> {
    let raw = match url.split_once('?') {
        Some((_, query)) => serde_urlencoded::from_str::<RawParams>(query)
            .map_err(|e| ParamError::Query(e.to_string()))?,
        None => RawParams::default(),
    };

    let grid = match raw.grid.as_deref() {
        Some(g) => g.parse()?,
        None => defaults.grid,
    };
    let window = match raw.window.as_deref() {
        Some(w) => w.parse()?,
        None => defaults.window,
    };

    Ok(Selection { grid, window })
}

fn not_found() -> (u16, &'static str, String) {
    (404, "text/plain", "Not found".to_string())
}

fn json_body<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{}"}}"#, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DEFAULTS: Selection = Selection {
        grid: GridSize::THREE,
        window: Window::OneWeek,
    };

    fn dashboard_with(rows: &[(&str, &str, i64)]) -> (tempfile::NamedTempFile, Dashboard) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sp_artist_id,artist,sp_artist_image,timestamp").unwrap();
        for (id, name, ts) in rows {
            writeln!(file, "{},{},http://img/{}.jpg,{}", id, name, id, ts).unwrap();
        }
        file.flush().unwrap();
        let cache = RankingCache::open(file.path()).unwrap();
        (file, Dashboard::new(cache, GridLayout::default(), DEFAULTS))
    }

    // ==========================================================================
    // QUERY PARSING
    // ==========================================================================

    #[test]
    fn test_parse_defaults_without_query() {
        assert_eq!(parse_selection("/", DEFAULTS).unwrap(), DEFAULTS);
        assert_eq!(parse_selection("/grid?", DEFAULTS).unwrap(), DEFAULTS);
    }

    #[test]
    fn test_parse_full_query() {
        let sel = parse_selection("/?grid=7&window=3y", DEFAULTS).unwrap();
        assert_eq!(sel.grid, GridSize::SEVEN);
        assert_eq!(sel.window, Window::ThreeYears);
    }

    #[test]
    fn test_parse_partial_query() {
        let sel = parse_selection("/grid?window=all", DEFAULTS).unwrap();
        assert_eq!(sel.grid, DEFAULTS.grid);
        assert_eq!(sel.window, Window::AllTime);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(parse_selection("/?grid=4", DEFAULTS), Err(ParamError::Grid(_))));
        assert!(matches!(parse_selection("/?window=2w", DEFAULTS), Err(ParamError::Window(_))));
    }

    // ==========================================================================
    // ROUTING
    // ==========================================================================

    #[test]
    fn test_route_dashboard() {
        let (_file, mut dash) = dashboard_with(&[("a", "Radiohead", 0)]);
        let (status, ctype, body) = dash.route(&Method::Get, "/?grid=5&window=1m");
        assert_eq!(status, 200);
        assert!(ctype.starts_with("text/html"));
        assert!(body.contains("Top 5x5 artists for the last 1 month"));
    }

    #[test]
    fn test_route_grid() {
        let (_file, mut dash) = dashboard_with(&[("a", "Radiohead", 0), ("a", "Radiohead", 10), ("b", "Björk", 20)]);
        let (status, _, body) = dash.route(&Method::Get, "/grid?grid=3&window=all");
        assert_eq!(status, 200);
        assert!(body.contains("Radiohead<br>2 plays"));
        assert!(body.contains("Björk<br>1 play"));
    }

    #[test]
    fn test_route_api_top() {
        let (_file, mut dash) = dashboard_with(&[("a", "Radiohead", 0), ("b", "Björk", 10), ("b", "Björk", 20)]);
        let (status, ctype, body) = dash.route(&Method::Get, "/api/top?window=all");
        assert_eq!(status, 200);
        assert_eq!(ctype, "application/json");

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["window"], "all");
        assert_eq!(value["data"]["grid"], 3);
        assert_eq!(value["data"]["artists"][0]["entity_id"], "b");
        assert_eq!(value["data"]["artists"][0]["count"], 2);
    }

    #[test]
    fn test_route_empty_history_renders_empty_grid() {
        let (_file, mut dash) = dashboard_with(&[]);
        let (status, _, body) = dash.route(&Method::Get, "/grid");
        assert_eq!(status, 200);
        assert!(body.contains("No listens in this window."));
    }

    #[test]
    fn test_route_bad_selection_is_400() {
        let (_file, mut dash) = dashboard_with(&[("a", "Radiohead", 0)]);
        let (status, _, body) = dash.route(&Method::Get, "/grid?window=forever");
        assert_eq!(status, 400);
        assert!(body.contains("forever"));

        let (status, _, body) = dash.route(&Method::Get, "/api/top?grid=2");
        assert_eq!(status, 400);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["ok"], false);
    }

    #[test]
    fn test_route_unknown_path_and_method() {
        let (_file, mut dash) = dashboard_with(&[("a", "Radiohead", 0)]);
        assert_eq!(dash.route(&Method::Get, "/nope").0, 404);
        assert_eq!(dash.route(&Method::Post, "/").0, 405);
    }

    #[test]
    fn test_route_unknown_path_ignores_bad_query() {
        let (_file, mut dash) = dashboard_with(&[("a", "Radiohead", 0)]);
        let (status, _, body) = dash.route(&Method::Get, "/nope?grid=4");
        assert_eq!(status, 404);
        assert_eq!(body, "Not found");
        assert_eq!(dash.route(&Method::Get, "/favicon.ico?window=2w").0, 404);
    }

    #[test]
    fn test_route_uses_cache() {
        let (_file, mut dash) = dashboard_with(&[("a", "Radiohead", 0)]);
        dash.route(&Method::Get, "/grid?grid=3&window=1w");
        dash.route(&Method::Get, "/api/top?grid=3&window=1w");
        let stats = dash.cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }
}
