use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use requiem_http::{Request, Response, Router, Status};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Reads one raw request from stdin, answers it through the router and writes
/// the raw response to stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let router = build_router()?;

    let mut data = Vec::new();
    tokio::io::stdin().read_to_end(&mut data).await?;
    info!(len = data.len(), "read request from stdin.");

    let response = match Request::parse(&data) {
        Ok(request) => {
            info!(method = %request.method, path = %request.path, "successfully parsed request.");
            handle(request, &router).await
        }
        Err(error) => {
            warn!(%error, "failed to parse request.");
            Response::builder()
                .with_status(Status::BadRequest)
                .as_text()
                .with_body(error.to_string())
        }
    };

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&response.to_bytes(HTTP_VERSION)).await?;
    stdout.flush().await?;
    info!(status = response.status_code, "successfully sent response.");
    Ok(())
}

fn build_router() -> anyhow::Result<Router> {
    let mut router = Router::new();
    router.add_handler_for_get("/", Arc::new(index))?;
    router.add_handler_for_post("/echo", Arc::new(echo))?;
    router.add_handler_for_any("/health", Arc::new(health))?;
    Ok(router)
}

async fn handle(request: Request, router: &Router) -> Response {
    let path = request.path.clone();
    match router.dispatch(request).await {
        Some(response) => response,
        None => Response::builder()
            .with_status(Status::NotFound)
            .as_text()
            .with_body(format!("Error 404: no resource with path {} found", path)),
    }
}

async fn index(_: Request) -> Response {
    Response::builder()
        .as_text()
        .with_body("requiem-http demo: try POST /echo or any method on /health\n")
}

async fn echo(request: Request) -> Response {
    match request.json::<Value>() {
        Ok(value) => Response::builder().as_json().with_body(value.to_string()),
        Err(error) => {
            debug!(%error, "rejecting echo body.");
            Response::builder()
                .with_status(Status::BadRequest)
                .as_text()
                .with_body(error.to_string())
        }
    }
}

async fn health(_: Request) -> Response {
    Response::builder().as_text().with_body("ok")
}
