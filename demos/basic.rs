//! Minimal dispatch example — a few routes, a form endpoint, a custom 404.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/hello
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/greet -d 'name=alice'
//!   curl --compressed http://localhost:3000/hello
//!   curl http://localhost:3000/missing

use dispatch::{Context, GzipMode, Options, Router, Server, StaticFiles};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .map("GET", "/hello", hello)
        .map("*", r"/users/(\d+)", user)
        .map("POST", "/greet", greet)
        .not_found(missing);

    let options = Options {
        gzip: GzipMode::Auto,
        static_files: StaticFiles::DefaultRoot,
        debug: false,
    };

    Server::port(3000)
        .serve(app, options)
        .await
        .expect("server error");
}

// GET /hello
async fn hello(ctx: Context) {
    ctx.send(b"world".to_vec(), &[("content-type", "text/plain")]);
}

// Any method, /users/<digits> — capture 1 is the id.
async fn user(ctx: Context) {
    let id = ctx.capture(1).unwrap_or("unknown").to_owned();
    ctx.send(
        format!(r#"{{"id":"{id}"}}"#).into_bytes(),
        &[("content-type", "application/json")],
    );
}

// POST /greet — reads a urlencoded form field.
async fn greet(ctx: Context) {
    let name = ctx.field("name").unwrap_or("stranger").to_owned();
    ctx.send(format!("hello, {name}").into_bytes(), &[]);
}

// Runs for anything no route or static file answered; status is already 404.
async fn missing(ctx: Context) {
    ctx.send(
        b"nothing at this address".to_vec(),
        &[("content-type", "text/plain")],
    );
}
