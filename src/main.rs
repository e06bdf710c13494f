use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use nodered_mcp::{build_hub, NodeRedConfig, NodeRedMcpBridge};
use rmcp::{
    ServiceExt,
    transport::streamable_http_server::{
        session::local::LocalSessionManager,
        StreamableHttpServerConfig, StreamableHttpService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// MCP over stdin/stdout
    Stdio,
    /// MCP streamable HTTP on /mcp
    Http,
}

/// CLI arguments for the Node-RED MCP server
#[derive(Parser, Debug)]
#[command(name = "nodered-mcp")]
#[command(about = "MCP server exposing the Node-RED admin API as tools")]
struct Args {
    /// Node-RED admin API root
    #[arg(long, env = "NODE_RED_URL", default_value = "http://localhost:1880")]
    url: String,

    /// Static bearer token
    #[arg(long, env = "NODE_RED_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Admin username for password login
    #[arg(long, env = "NODE_RED_USERNAME")]
    username: Option<String>,

    /// Admin password for password login
    #[arg(long, env = "NODE_RED_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "NODE_RED_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for the HTTP transport
    #[arg(short, long, default_value = "4446")]
    port: u16,
}

/// Log incoming HTTP requests
async fn log_request_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!("{} {}", method, uri);

    next.run(request).await
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, [("content-type", "application/json")], r#"{"status":"ok"}"#)
}

async fn fallback_handler(request: Request) -> impl IntoResponse {
    tracing::debug!("No route for {} {}", request.method(), request.uri());
    (StatusCode::NOT_FOUND, "Not found. MCP endpoint is /mcp")
}

async fn serve_http(bridge: NodeRedMcpBridge, port: u16) -> anyhow::Result<()> {
    let config = StreamableHttpServerConfig::default();
    let session_manager = LocalSessionManager::default().into();
    let mcp_service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        session_manager,
        config,
    );

    let app = axum::Router::new()
        .nest_service("/mcp", mcp_service)
        .route("/health", get(health_handler))
        .fallback(fallback_handler)
        .layer(middleware::from_fn(log_request_middleware));

    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP endpoint at http://{}/mcp", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (silently ignore if not found)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Logs go to stderr; stdout belongs to the stdio transport
    let default_filter = if args.verbose {
        "nodered_mcp=debug,rmcp=info"
    } else {
        "nodered_mcp=info,rmcp=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = NodeRedConfig::new(
        args.url,
        args.token,
        args.username,
        args.password,
        Duration::from_secs(args.timeout_secs),
    );
    let hub = build_hub(&config)?;

    tracing::info!("Node-RED MCP server for {}", config.url);
    for activation in hub.list_activations() {
        tracing::info!(
            "  {} v{} - {} ({} tools)",
            activation.namespace,
            activation.version,
            activation.description,
            activation.methods.len()
        );
    }

    let bridge = NodeRedMcpBridge::new(hub);
    match args.transport {
        Transport::Stdio => {
            tracing::info!("Serving MCP over stdio");
            let service = bridge.serve(rmcp::transport::stdio()).await?;
            service.waiting().await?;
        }
        Transport::Http => serve_http(bridge, args.port).await?,
    }

    Ok(())
}
