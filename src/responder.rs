//! Response finalization.
//!
//! A [`Responder`] is the single permitted path for writing a response. Each
//! request gets exactly one; the first [`send`](Responder::send) wins, decides
//! whether to gzip the body, and resumes the suspended dispatch pipeline by
//! pushing the finished response through a oneshot channel. A second `send`
//! is a bug in handler code — it is logged and ignored, never written.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use http::StatusCode;
use http_body_util::Full;
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::config::GzipMode;

pub(crate) type WireResponse = http::Response<Full<Bytes>>;

/// Per-request response finalizer.
///
/// Cheap to clone — clones share the same single-use send slot, so a handler
/// may stash a copy in a spawned task and finalize later. Whoever sends
/// first, sends; everyone after that is a no-op with an error log.
#[derive(Clone)]
pub struct Responder {
    inner: Arc<Inner>,
}

struct Inner {
    // The pipeline continuation: sending resumes whoever awaits the receiver.
    tx: Mutex<Option<oneshot::Sender<WireResponse>>>,
    status: AtomicU16,
    gzip: GzipMode,
    client_accepts_gzip: bool,
    debug: bool,
}

impl Responder {
    pub(crate) fn new(
        tx: oneshot::Sender<WireResponse>,
        gzip: GzipMode,
        client_accepts_gzip: bool,
        debug: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                tx: Mutex::new(Some(tx)),
                status: AtomicU16::new(200),
                gzip,
                client_accepts_gzip,
                debug,
            }),
        }
    }

    /// Sets the status code used by the next (only) `send`.
    ///
    /// Has no effect once the response is finalized.
    pub fn set_status(&self, code: u16) {
        self.inner.status.store(code, Ordering::Relaxed);
    }

    /// The status code the response will carry.
    pub fn status(&self) -> u16 {
        self.inner.status.load(Ordering::Relaxed)
    }

    /// Finalizes the response: at most once per request.
    ///
    /// Writes the current status code, the supplied headers, and `body` —
    /// gzip-compressed when the configured mode and the client's
    /// `accept-encoding` call for it, in which case `content-encoding: gzip`
    /// is injected automatically.
    pub fn send(&self, body: impl Into<Vec<u8>>, headers: &[(&str, &str)]) {
        let tx = {
            let mut slot = match self.inner.tx.lock() {
                Ok(slot) => slot,
                Err(_) => {
                    error!("response slot poisoned, dropping send");
                    return;
                }
            };
            slot.take()
        };
        let Some(tx) = tx else {
            // Double finalization is a handler bug; never write twice.
            error!("response already finalized, ignoring second send");
            return;
        };

        let mut body = body.into();
        let compress = match self.inner.gzip {
            GzipMode::No => false,
            GzipMode::Always => true,
            GzipMode::Auto => self.inner.client_accepts_gzip,
        };

        let status = StatusCode::from_u16(self.status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        if compress {
            match gzip(&body) {
                Ok(compressed) => {
                    body = compressed;
                    builder = builder.header("content-encoding", "gzip");
                }
                Err(e) => {
                    // Fall back to the uncompressed body rather than failing
                    // the request.
                    error!("gzip failed, sending uncompressed: {e}");
                }
            }
        }

        if self.inner.debug {
            debug!(status = %status, compressed = compress, len = body.len(), "finalizing response");
        }

        let response = match builder.body(Full::new(Bytes::from(body))) {
            Ok(response) => response,
            Err(e) => {
                error!("malformed response header: {e}");
                let mut response = http::Response::new(Full::new(Bytes::new()));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        };

        // The receiver only disappears when the connection is already gone;
        // the write is fire-and-forget at that point.
        if tx.send(response).is_err() && self.inner.debug {
            debug!("client gone before response could be written");
        }
    }
}

fn gzip(body: &[u8]) -> std::io::Result<Vec<u8>> {
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    async fn sent_body(rx: oneshot::Receiver<WireResponse>) -> (WireResponse, Bytes) {
        use http_body_util::BodyExt;
        let response = rx.await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (http::Response::from_parts(parts, Full::new(Bytes::new())), bytes)
    }

    #[tokio::test]
    async fn auto_compresses_when_client_accepts() {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx, GzipMode::Auto, true, false);
        responder.send(b"hello hello hello".to_vec(), &[]);

        let (response, body) = sent_body(rx).await;
        assert_eq!(response.headers()["content-encoding"], "gzip");
        assert_eq!(gunzip(&body), b"hello hello hello");
    }

    #[tokio::test]
    async fn auto_skips_compression_without_client_support() {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx, GzipMode::Auto, false, false);
        responder.send(b"plain".to_vec(), &[]);

        let (response, body) = sent_body(rx).await;
        assert!(!response.headers().contains_key("content-encoding"));
        assert_eq!(&body[..], b"plain");
    }

    #[tokio::test]
    async fn no_mode_never_compresses() {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx, GzipMode::No, true, false);
        responder.send(b"plain".to_vec(), &[]);

        let (response, body) = sent_body(rx).await;
        assert!(!response.headers().contains_key("content-encoding"));
        assert_eq!(&body[..], b"plain");
    }

    #[tokio::test]
    async fn always_mode_compresses_regardless() {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx, GzipMode::Always, false, false);
        responder.send(b"body".to_vec(), &[]);

        let (response, body) = sent_body(rx).await;
        assert_eq!(response.headers()["content-encoding"], "gzip");
        assert_eq!(gunzip(&body), b"body");
    }

    #[tokio::test]
    async fn status_and_headers_are_carried() {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx, GzipMode::No, false, false);
        responder.set_status(404);
        responder.send(b"not found.".to_vec(), &[("content-type", "text/plain")]);

        let (response, body) = sent_body(rx).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(&body[..], b"not found.");
    }

    #[tokio::test]
    async fn second_send_is_ignored() {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx, GzipMode::No, false, false);
        responder.send(b"first".to_vec(), &[]);
        responder.send(b"second".to_vec(), &[]);

        let (_, body) = sent_body(rx).await;
        assert_eq!(&body[..], b"first");
    }

    #[tokio::test]
    async fn clones_share_the_send_slot() {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx, GzipMode::No, false, false);
        let clone = responder.clone();
        clone.send(b"from clone".to_vec(), &[]);
        responder.send(b"too late".to_vec(), &[]);

        let (_, body) = sent_body(rx).await;
        assert_eq!(&body[..], b"from clone");
    }
}
