//! Run with:
//!
//! ```no_rust
//! RUST_LOG=debug cargo run -p strong-headers --example correlation --features tracing
//! ```

use http::{Request, request::Parts};
use strong_headers::{HeaderMappings, RequestHeaders, RequestHeadersExt, Typed, error::Error};
use tracing_subscriber::{EnvFilter, prelude::*};

const EXTERNAL_CORRELATION_ID: &str = "X-External-Correlation-Id";
const INTERNAL_CORRELATION_ID: &str = "X-Internal-Correlation-Id";

#[derive(Debug, Clone)]
struct ExternalCorrelationId(Option<String>);

#[derive(Debug, Clone)]
struct InternalCorrelationId(Option<String>);

#[derive(Debug)]
struct AllCorrelation {
    external: Vec<String>,
    internal: Vec<String>,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mappings = HeaderMappings::configure(|builder| {
        builder
            .add_mapping(EXTERNAL_CORRELATION_ID, |v| ExternalCorrelationId(v.last().map(Into::into)))?
            .add_mapping(INTERNAL_CORRELATION_ID, |v| InternalCorrelationId(v.last().map(Into::into)))?
            .add_multi_mapping([EXTERNAL_CORRELATION_ID, INTERNAL_CORRELATION_ID], |h| AllCorrelation {
                external: h.get(EXTERNAL_CORRELATION_ID).map(|v| v.to_vec()).unwrap_or_default(),
                internal: h.get(INTERNAL_CORRELATION_ID).map(|v| v.to_vec()).unwrap_or_default(),
            })?;
        Ok(())
    })?;

    // A second mapping for the same target type is rejected
    if let Err(err) = HeaderMappings::configure(|builder| {
        builder
            .add_mapping(EXTERNAL_CORRELATION_ID, |v| ExternalCorrelationId(v.first().map(Into::into)))?
            .add_mapping("X-Correlation-Id", |v| ExternalCorrelationId(v.last().map(Into::into)))?;
        Ok(())
    }) {
        tracing::info!("{err}");
    }

    let requests = [
        Request::get("/orders")
            .header(EXTERNAL_CORRELATION_ID, "ext-1, ext-2")
            .header(INTERNAL_CORRELATION_ID, "int-1"),
        Request::get("/orders")
            .header("x-internal-correlation-id", "int-2"),
        Request::get("/health"),
    ];

    for builder in requests {
        let Ok(mut req) = builder.body(()) else {
            continue;
        };
        req.attach_headers_scope(&mappings);

        let (parts, _) = req.into_parts();
        middleware(&parts)?;
        handler(&parts)?;
    }

    Ok(())
}

fn middleware(parts: &Parts) -> Result<(), Error> {
    let external = Typed::<ExternalCorrelationId>::try_from(parts)?;
    let internal = Typed::<InternalCorrelationId>::try_from(parts)?;

    tracing::info!(
        uri = %parts.uri,
        external = ?external.0,
        internal = ?internal.0,
        "request correlation"
    );
    Ok(())
}

fn handler(parts: &Parts) -> Result<(), Error> {
    let headers = RequestHeaders::try_from(parts)?;
    let all = headers.require::<AllCorrelation>()?;

    // resolved once by the middleware, served from the request cache here
    let external = headers.require::<ExternalCorrelationId>()?;

    tracing::info!(
        external = ?all.external,
        internal = ?all.internal,
        last_external = ?external.0,
        "all correlation ids"
    );
    Ok(())
}
