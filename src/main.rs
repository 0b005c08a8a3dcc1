//! edge-demo
//!
//! Runs a small handler on the edge adapter:
//! - configured routes are relayed to their upstream URL (method, headers
//!   minus `host`, body; status, headers and body relayed back)
//! - `/events` streams a few server-sent events
//! - anything else answers `{"ok":true,"path":...}`
//!
//! ```text
//! edge-demo --config edge.toml --port 8080 --log-format json
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use clap::Parser;
use futures_util::stream;
use url::Url;

use edge_adapter::config::{load_config, AppConfig, LogFormat, ServeOptions};
use edge_adapter::error::diagnostic;
use edge_adapter::{observability, serve, Body, HandlerError, Request, Response, Shutdown, Upstream};

const EVENT_COUNT: u32 = 3;
const EVENT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "edge-demo")]
#[command(about = "Demo server for the edge adapter", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Hostname to bind (overrides the config file).
    #[arg(long)]
    hostname: Option<String>,

    /// Log output format (overrides the config file).
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

struct Demo {
    routes: HashMap<String, Url>,
    upstream: Upstream,
}

impl Demo {
    async fn handle(&self, request: Request) -> Result<Response, HandlerError> {
        if let Some(target) = self.routes.get(request.url().path()) {
            return self.upstream.forward(request, target.clone()).await;
        }

        if request.url().path() == "/events" {
            return Ok(events());
        }

        let body = serde_json::json!({ "ok": true, "path": request.url().path() });
        Ok(Response::new(body.to_string()).header("content-type", "application/json"))
    }
}

fn events() -> Response {
    let ticks = stream::unfold(0u32, |n| async move {
        if n == EVENT_COUNT {
            return None;
        }
        if n > 0 {
            tokio::time::sleep(EVENT_INTERVAL).await;
        }
        let event = Bytes::from(format!("data: tick {n}\n\n"));
        Some((Ok::<_, HandlerError>(event), n + 1))
    });

    Response::new(Body::from_stream(ticks))
        .header("content-type", "text/event-stream")
        .header("cache-control", "no-cache")
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        config.listen.port = port;
    }
    if let Some(hostname) = &cli.hostname {
        config.listen.hostname = hostname.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    observability::init(config.logging.format, &config.logging.filter)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        hostname = %config.listen.hostname,
        port = config.listen.port,
        routes = config.upstream.routes.len(),
        "edge-demo starting"
    );

    let routes = config
        .upstream
        .routes
        .iter()
        .map(|route| -> Result<(String, Url), url::ParseError> {
            Ok((route.path.clone(), Url::parse(&route.url)?))
        })
        .collect::<Result<HashMap<_, _>, _>>()?;
    let upstream = Upstream::new(Some(Duration::from_secs(config.upstream.timeout_secs)))?;
    let demo = Arc::new(Demo { routes, upstream });

    let shutdown = Shutdown::new();
    let listen = config.listen.clone().with_signal(shutdown.signal());
    let handler = move |request: Request| {
        let demo = Arc::clone(&demo);
        async move { demo.handle(request).await }
    };

    let options = ServeOptions::config_with_callback(listen, |addr| {
        tracing::info!(address = %addr, "Listening on http://{}", addr);
    });
    let server = match serve(handler, options).await {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(error = %diagnostic(&err), "Failed to start listener");
            return Err(err.into());
        }
    };

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "Failed to listen for Ctrl+C, shutting down"),
    }

    shutdown.trigger();
    server.closed().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
