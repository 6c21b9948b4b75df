//! The dispatch pipeline.
//!
//! Five stages, in strict order, every request: body intake → context
//! population → route match and handler invocation → static fallback →
//! terminal 404/error handling. A stage either produces input for the next
//! one or finalizes the response and short-circuits the rest. Whatever
//! happens, exactly one response leaves this function.
//!
//! Requests are independent: each gets its own [`Context`] and finalizer,
//! and the only shared state — the route table and options — is immutable
//! while the server listens, so stages never lock anything.

use std::fmt::Display;
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::body::{self, ParsedBody};
use crate::config::Resolved;
use crate::context::Context;
use crate::error::Error;
use crate::headers::{self, HeaderValue};
use crate::responder::{Responder, WireResponse};
use crate::router::Router;
use crate::static_files;

/// Routes one request through the pipeline and produces its one response.
///
/// Generic over the body type so the whole pipeline is testable with
/// in-memory requests; the server instantiates it with `hyper`'s incoming
/// body.
pub(crate) async fn dispatch<B>(
    router: Arc<Router>,
    options: Arc<Resolved>,
    req: http::Request<B>,
) -> WireResponse
where
    B: http_body::Body,
    B::Error: Display,
{
    let (parts, raw_body) = req.into_parts();
    let method = parts.method.as_str().to_ascii_lowercase();
    let path = parts.uri.path().to_owned();

    if options.debug {
        debug!(%method, %path, "dispatch start");
    }

    // Stage 1 — body intake. POST only; other methods skip with empty maps.
    // The raw content-type header is used here, not the normalized one: the
    // multipart boundary is case-sensitive.
    let intake = if method == "post" {
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        match raw_body.collect().await {
            Ok(collected) => body::parse(content_type.as_deref(), &collected.to_bytes()),
            Err(e) => Err(Error::BodyParse(e.to_string())),
        }
    } else {
        Ok(ParsedBody::default())
    };

    let normalized = headers::from_header_map(&parts.headers);
    let accepts_gzip = client_accepts_gzip(normalized.get("accept-encoding"));

    let (tx, rx) = oneshot::channel();
    let responder = Responder::new(tx, options.gzip, accepts_gzip, options.debug);

    // A body-parse failure aborts straight into the terminal error state.
    let parsed = match intake {
        Ok(parsed) => parsed,
        Err(e) => return terminal_error(&e),
    };

    // Stage 2 — context population.
    let mut ctx = Context {
        fields: parsed.fields,
        files: parsed.files,
        captures: None,
        headers: normalized,
        responder: responder.clone(),
    };

    // Stage 3 — route match and handler invocation. The handler runs on its
    // own task (never in this call frame); the pipeline suspends here until
    // the handler finalizes, however long that takes.
    if let Some((handler, captures)) = router.lookup(&method, &path) {
        ctx.captures = Some(captures);
        if options.debug {
            debug!(%path, "route matched");
        }
        tokio::spawn(handler.call(ctx));
        return finalized(rx).await;
    }

    // Stage 4 — static fallback. Only reached when no route matched; skipped
    // entirely when static serving is off.
    if let Some(root) = &options.static_root {
        match static_files::resolve(root, &path).await {
            Ok(Some((bytes, mime))) => {
                if options.debug {
                    debug!(%path, mime, "served static file");
                }
                responder.send(bytes, &[("content-type", mime)]);
                return finalized(rx).await;
            }
            Ok(None) => {}
            Err(e) => return terminal_error(&e),
        }
    }

    // Stage 5 — terminal. A registered not-found handler runs with the
    // status pre-set to 404 and may override it; inline invocation is fine
    // here, nothing runs after it.
    if let Some(handler) = router.not_found_handler() {
        responder.set_status(404);
        handler.call(ctx).await;
        return finalized(rx).await;
    }

    plain(StatusCode::NOT_FOUND, "not found.")
}

/// True when any `accept-encoding` value mentions gzip. Values arrive
/// lowercased from the normalizer, so a substring check suffices.
fn client_accepts_gzip(header: Option<&HeaderValue>) -> bool {
    match header {
        None => false,
        Some(HeaderValue::One(v)) => v.contains("gzip"),
        Some(HeaderValue::Many(vs)) => vs.iter().any(|v| v.contains("gzip")),
    }
}

/// Suspends until the finalizer fires.
///
/// A matched handler that never finalizes (and never hands its context to
/// anyone who will) leaves this pending — the request hangs, which is the
/// documented contract for handlers, not something the pipeline times out.
async fn finalized(rx: oneshot::Receiver<WireResponse>) -> WireResponse {
    match rx.await {
        Ok(response) => response,
        // Unreachable while the pipeline holds its own finalizer clone, but
        // never panic on a channel.
        Err(_) => plain(StatusCode::INTERNAL_SERVER_ERROR, "error."),
    }
}

/// Terminal error state: one log line, one minimal body, no internals leaked.
fn terminal_error(e: &Error) -> WireResponse {
    error!("request failed: {e}");
    plain(StatusCode::INTERNAL_SERVER_ERROR, "error.")
}

fn plain(status: StatusCode, body: &'static str) -> WireResponse {
    let mut response = http::Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, http::HeaderValue::from_static("text/plain"));
    response
}
