//! # dispatch
//!
//! A minimal HTTP request dispatcher. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! You register routes — a method spec, a regex pattern, an async handler —
//! and every request runs one fixed pipeline: parse a POST body, find the
//! first matching route, invoke its handler, fall back to a static file,
//! and finish with a 404 (yours or the built-in one). Responses are
//! gzip-compressed when the configuration and the client agree on it.
//!
//! Routing is **first-match-wins**: routes are checked in registration
//! order, the earliest match dispatches, and there is no specificity
//! ranking. Patterns are case-insensitive regexes anchored at the start
//! (a leading `^` is implied) and open at the end.
//!
//! A handler answers exactly once, by calling [`Context::send`]. The
//! finalizer may be carried into a spawned task and fired later; a handler
//! that never fires it leaves its request waiting — that is the handler's
//! contract to keep, not the dispatcher's to police.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use dispatch::{Context, Options, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .map("GET", "/hello", hello)
//!         .map(vec!["post", "put"], r"/users/(\d+)", update_user)
//!         .not_found(missing);
//!
//!     Server::port(3000)
//!         .serve(app, Options::default())
//!         .await
//!         .unwrap();
//! }
//!
//! async fn hello(ctx: Context) {
//!     ctx.send(b"world".to_vec(), &[("content-type", "text/plain")]);
//! }
//!
//! async fn update_user(ctx: Context) {
//!     let id = ctx.capture(1).unwrap_or("unknown").to_owned();
//!     ctx.send(format!("updated {id}").into_bytes(), &[]);
//! }
//!
//! async fn missing(ctx: Context) {
//!     // status is already 404 here
//!     ctx.send(b"nothing at this address".to_vec(), &[]);
//! }
//! ```
//!
//! ## Static files and compression
//!
//! ```rust,no_run
//! use dispatch::{GzipMode, Options, Router, Server, StaticFiles};
//!
//! # #[tokio::main] async fn main() {
//! let options = Options {
//!     gzip: GzipMode::Auto,                       // compress when the client asks
//!     static_files: StaticFiles::DefaultRoot,     // serve static/ next to the binary
//!     debug: false,
//! };
//! Server::port(3000).serve(Router::new(), options).await.unwrap();
//! # }
//! ```

mod body;
mod config;
mod context;
mod error;
mod handler;
mod headers;
mod method;
mod pipeline;
mod responder;
mod router;
mod server;
mod static_files;

pub use config::{GzipMode, Options, StaticFiles};
pub use context::{Context, UploadedFile};
pub use error::Error;
pub use handler::Handler;
pub use headers::HeaderValue;
pub use method::MethodSpec;
pub use responder::Responder;
pub use router::Router;
pub use server::Server;
