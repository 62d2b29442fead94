//! Relay - same-origin forwarder for the mail provider API
//!
//! Browsers refuse cross-origin calls to the provider, so web front-ends
//! talk to this relay instead: it replicates the provider's operations
//! under /api/mail/*, injects nothing beyond the caller's own bearer
//! header, and forwards provider status codes unchanged.

use std::io::Read;

use anyhow::Result;
use log::{error, info, warn};
use tiny_http::{Header, Response, Server};

mod proxy;

use proxy::{Reply, Route, Upstream};

/// Default listen address, overridable via MISTBOX_RELAY_ADDR
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8025";

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let settings = match tempmail::Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Falling back to default settings: {:#}", e);
            tempmail::Settings::default()
        }
    };

    let listen_addr = std::env::var("MISTBOX_RELAY_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

    let upstream = Upstream::new(&settings.api_base);
    let server = Server::http(&listen_addr)
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", listen_addr, e))?;
    info!("Relaying http://{}{} -> {}", listen_addr, proxy::ROUTE_PREFIX, settings.api_base);

    for mut request in server.incoming_requests() {
        let reply = handle(&upstream, &mut request);
        if let Err(e) = request.respond(into_response(&reply)) {
            warn!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

/// Dispatch one incoming request to the upstream and shape the reply
fn handle(upstream: &Upstream, request: &mut tiny_http::Request) -> Reply {
    let method = request.method().clone();
    let url = request.url().to_string();

    let Some(route) = Route::parse(&method, &url) else {
        return Reply::error(404, "Not found");
    };

    if route == Route::Preflight {
        return Reply::no_content();
    }

    let auth = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string());

    if route.requires_auth() && auth.is_none() {
        return proxy::missing_auth();
    }

    let body = match read_body(request) {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return Reply::error(400, "Invalid request body");
        }
    };

    match upstream.forward(&route, auth.as_deref(), body.as_deref()) {
        Ok(reply) => {
            info!("{} {} -> {}", method, url, reply.status);
            reply
        }
        Err(e) => {
            error!("{} {} failed: {:#}", method, url, e);
            Reply::error(500, "Internal server error")
        }
    }
}

fn read_body(request: &mut tiny_http::Request) -> std::io::Result<Option<String>> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    Ok(if body.is_empty() { None } else { Some(body) })
}

fn into_response(reply: &Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response = Response::from_string(reply.body.clone()).with_status_code(reply.status);
    for (name, value) in proxy::cors_headers() {
        response.add_header(header(name, value));
    }
    if !reply.body.is_empty() {
        response.add_header(header("Content-Type", "application/json"));
    }
    response
}

fn header(name: &str, value: &str) -> Header {
    // Infallible for the static names and JSON-safe values used here
    Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap()
}
