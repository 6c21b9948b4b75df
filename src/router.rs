//! Ordered, first-match-wins route table.
//!
//! Routes are regex patterns checked in registration order — the earliest
//! route whose method spec and pattern both match wins, with no specificity
//! ranking. A linear scan is deliberate: route tables are small, built once
//! at startup, and read-only afterwards, so deterministic ordering beats
//! lookup throughput.

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::handler::{BoxedHandler, Handler};
use crate::method::MethodSpec;

struct Route {
    methods: MethodSpec,
    pattern: Regex,
    handler: BoxedHandler,
}

/// The application route table.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::map`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: Vec<Route>,
    not_found: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new(), not_found: None }
    }

    /// Registers a handler for a method spec + path pattern. Returns `self`
    /// for chaining.
    ///
    /// The method spec is a literal (`"GET"`), the wildcard (`"*"`), or a set
    /// (`vec!["post", "put"]`). The pattern is a case-insensitive regex,
    /// anchored at the start: a leading `^` is implied when absent. It is
    /// *not* anchored at the end — `"/users"` also matches `/users/42`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Registration happens once at
    /// startup; a bad pattern is a build-it-again bug, not a runtime
    /// condition.
    pub fn map(mut self, methods: impl Into<MethodSpec>, pattern: &str, handler: impl Handler) -> Self {
        let anchored = if pattern.starts_with('^') {
            pattern.to_owned()
        } else {
            format!("^{pattern}")
        };
        let pattern = RegexBuilder::new(&anchored)
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|e| panic!("invalid route pattern `{anchored}`: {e}"));

        self.routes.push(Route {
            methods: methods.into(),
            pattern,
            handler: handler.into_boxed_handler(),
        });
        self
    }

    /// Registers the custom not-found handler, invoked for requests no route
    /// or static file answers. The pipeline pre-sets the status to 404 before
    /// calling it. Only the first registration is honored.
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        if self.not_found.is_some() {
            warn!("not-found handler already registered, ignoring another");
        } else {
            self.not_found = Some(handler.into_boxed_handler());
        }
        self
    }

    /// First-match-wins lookup.
    ///
    /// The path is lowercased before matching, so captures come back
    /// lowercase as well. Returns the handler and the ordered capture list
    /// (group 0 = the whole match, non-participating groups are `None`).
    pub(crate) fn lookup(
        &self,
        method: &str,
        path: &str,
    ) -> Option<(BoxedHandler, Vec<Option<String>>)> {
        let path = path.to_ascii_lowercase();
        for route in &self.routes {
            if !route.methods.matches(method) {
                continue;
            }
            if let Some(caps) = route.pattern.captures(&path) {
                let captures = caps
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_owned()))
                    .collect();
                return Some((BoxedHandler::clone(&route.handler), captures));
            }
        }
        None
    }

    pub(crate) fn not_found_handler(&self) -> Option<BoxedHandler> {
        self.not_found.as_ref().map(BoxedHandler::clone)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    async fn noop(_ctx: Context) {}

    #[test]
    fn lookup_respects_method_spec() {
        let router = Router::new().map("GET", "/hello", noop);
        assert!(router.lookup("get", "/hello").is_some());
        assert!(router.lookup("GET", "/hello").is_some());
        assert!(router.lookup("post", "/hello").is_none());
    }

    #[test]
    fn wildcard_method_matches_all() {
        let router = Router::new().map("*", "/anything", noop);
        assert!(router.lookup("get", "/anything").is_some());
        assert!(router.lookup("purge", "/anything").is_some());
    }

    #[test]
    fn pattern_is_start_anchored_only() {
        let router = Router::new().map("GET", "/users", noop);
        assert!(router.lookup("get", "/users").is_some());
        // Not end-anchored: longer paths with the same prefix still match.
        assert!(router.lookup("get", "/users/42").is_some());
        // Start-anchored: the pattern must match from the beginning.
        assert!(router.lookup("get", "/api/users").is_none());
    }

    #[test]
    fn explicit_caret_is_not_doubled() {
        let router = Router::new().map("GET", "^/strict$", noop);
        assert!(router.lookup("get", "/strict").is_some());
        assert!(router.lookup("get", "/strict/extra").is_none());
    }

    #[test]
    fn path_matching_is_case_insensitive() {
        let router = Router::new().map("GET", "/Hello", noop);
        assert!(router.lookup("get", "/HELLO").is_some());
    }

    #[test]
    fn captures_include_whole_match_first() {
        let router = Router::new().map("GET", r"/users/(\d+)", noop);
        let (_, captures) = router.lookup("get", "/users/42/posts").unwrap();
        assert_eq!(
            captures,
            vec![Some("/users/42".to_owned()), Some("42".to_owned())]
        );
    }

    #[test]
    fn captures_are_lowercased_with_the_path() {
        let router = Router::new().map("GET", r"/files/(\w+)", noop);
        let (_, captures) = router.lookup("get", "/Files/README").unwrap();
        assert_eq!(captures[1], Some("readme".to_owned()));
    }

    #[test]
    fn non_participating_group_is_none() {
        let router = Router::new().map("GET", r"/a(?:/(b))?", noop);
        let (_, captures) = router.lookup("get", "/a").unwrap();
        assert_eq!(captures[1], None);
    }

    #[test]
    fn no_route_is_no_match() {
        let router = Router::new().map("GET", "/known", noop);
        assert!(router.lookup("get", "/missing").is_none());
    }

    #[test]
    #[should_panic(expected = "invalid route pattern")]
    fn invalid_pattern_panics_at_registration() {
        let _ = Router::new().map("GET", "([unclosed", noop);
    }
}
