//! Handler trait and type erasure.
//!
//! The route table holds handlers of *different* concrete types in one `Vec`,
//! so each handler is hidden behind a trait object (`dyn ErasedHandler`).
//! The chain from user code to vtable call:
//!
//! ```text
//! async fn hello(ctx: Context) { … }          ← user writes this
//!        ↓ router.map("GET", "/hello", hello)
//! hello.into_boxed_handler()                  ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                  ← stored as BoxedHandler
//!        ↓
//! handler.call(ctx)  at request time          ← one vtable dispatch
//! ```
//!
//! A handler answers by finalizing through its [`Context`] — it returns `()`,
//! not a response value, because finalization may happen from a spawned task
//! long after the handler function itself has returned.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

/// A heap-allocated, type-erased future. `Pin<Box<…>>` because the runtime
/// polls it in place; `Send + 'static` so tokio may move it across threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
/// `Arc` so invoking a handler costs one atomic increment, not a copy.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(ctx: Context)
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype bridging a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin((self.0)(ctx))
    }
}
