use std::collections::BTreeMap;
use std::path::PathBuf;

use axum::body::{self, Body};
use axum::extract::Request;
use axum::http::{header, Method};
use axum::Json;
use clap::{Parser, Subcommand};
use path_router::config::{load_config, schema::ANY_METHOD, RouterConfig};
use path_router::http::Handler;
use path_router::routing::method::allow_list;
use path_router::{observability, MethodKind, RequestScopeExt, Router, RouterService};
use serde_json::{json, Value};
use tower::ServiceExt;

const BODY_LIMIT: usize = 64 * 1024;

#[derive(Parser)]
#[command(name = "route-check")]
#[command(about = "Inspect a route table and try requests against it", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List compiled routes in match order with their allowed methods
    List,
    /// Dispatch one request and print the outcome
    Match {
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target, optionally with a query string
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    observability::logging::init(&config.logging)?;

    let service = build(&config)?;

    match cli.command {
        Commands::List => {
            for (pattern, methods) in service.routes() {
                println!("{:<40} {}", pattern, allow_list(methods));
            }
        }
        Commands::Match { method, path } => {
            let outcome = dispatch(service, &method, &path).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

/// Register every configured route with a handler that echoes what it saw.
fn build(config: &RouterConfig) -> Result<RouterService, Box<dyn std::error::Error>> {
    let mut router = Router::with_config(config);

    for route in &config.routes {
        let endpoint = router.try_endpoint(&route.pattern)?;
        for (name, value) in &route.context {
            endpoint.set_context(name, value.clone());
        }

        let mut keys: Vec<String> = endpoint.pattern().param_names().map(str::to_owned).collect();
        keys.extend(route.context.keys().cloned());
        let handler = echo(route.name.clone(), keys);

        for method in &route.methods {
            if method.eq_ignore_ascii_case(ANY_METHOD) {
                endpoint.any(handler.clone());
            } else {
                endpoint.on(method.parse::<MethodKind>()?, handler.clone());
            }
        }
    }

    Ok(router.into_service())
}

fn echo(route: String, keys: Vec<String>) -> impl Handler {
    move |req: Request| async move {
        let scope: BTreeMap<&str, &str> = keys
            .iter()
            .filter_map(|key| Some((key.as_str(), req.path_param(key)?)))
            .collect();
        Json(json!({
            "route": route,
            "method": req.method().as_str(),
            "scope": scope,
        }))
    }
}

async fn dispatch(
    service: RouterService,
    method: &str,
    path: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let req = Request::builder()
        .method(Method::from_bytes(method.to_ascii_uppercase().as_bytes())?)
        .uri(path)
        .body(Body::empty())?;
    let res = service.oneshot(req).await?;

    let header = |name: header::HeaderName| {
        res.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let status = res.status();
    let allow = header(header::ALLOW);
    let location = header(header::LOCATION);

    let bytes = body::to_bytes(res.into_body(), BODY_LIMIT).await?;
    let body = serde_json::from_slice::<Value>(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    Ok(json!({
        "status": status.as_u16(),
        "allow": allow,
        "location": location,
        "body": body,
    }))
}
