//! Dispatch options.
//!
//! Built once at startup, handed to [`Server::serve`](crate::Server::serve),
//! and never mutated while the server is listening. Every in-flight request
//! reads the same immutable copy, so no locking is involved.

use std::path::PathBuf;

/// When to gzip response bodies.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GzipMode {
    /// Never compress.
    No,
    /// Compress every response.
    Always,
    /// Compress when the client's `accept-encoding` advertises gzip.
    #[default]
    Auto,
}

/// Static file serving mode.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum StaticFiles {
    /// No static fallback.
    #[default]
    Disabled,
    /// Serve from `static/` next to the running executable.
    DefaultRoot,
    /// Serve from the given directory.
    Root(PathBuf),
}

impl StaticFiles {
    /// Resolves the configured root directory, once, at startup.
    ///
    /// When the executable's location cannot be determined the default root
    /// falls back to `./static` relative to the working directory.
    pub(crate) fn resolve_root(&self) -> Option<PathBuf> {
        match self {
            Self::Disabled => None,
            Self::Root(dir) => Some(dir.clone()),
            Self::DefaultRoot => {
                let base = std::env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from("."));
                Some(base.join("static"))
            }
        }
    }
}

/// Process-wide dispatch configuration.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub gzip: GzipMode,
    pub static_files: StaticFiles,
    /// Emit per-stage debug logs for every request.
    pub debug: bool,
}

impl Options {
    /// Snapshots the options for the listening phase: the static root is
    /// derived exactly once, before the first request.
    pub(crate) fn resolve(&self) -> Resolved {
        Resolved {
            gzip: self.gzip,
            debug: self.debug,
            static_root: self.static_files.resolve_root(),
        }
    }
}

/// Options after startup resolution, shared read-only across requests.
#[derive(Clone, Debug)]
pub(crate) struct Resolved {
    pub(crate) gzip: GzipMode,
    pub(crate) debug: bool,
    pub(crate) static_root: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.gzip, GzipMode::Auto);
        assert_eq!(opts.static_files, StaticFiles::Disabled);
        assert!(!opts.debug);
    }

    #[test]
    fn disabled_has_no_root() {
        assert_eq!(StaticFiles::Disabled.resolve_root(), None);
    }

    #[test]
    fn custom_root_is_used_verbatim() {
        let root = StaticFiles::Root(PathBuf::from("/srv/www")).resolve_root();
        assert_eq!(root, Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn default_root_ends_with_static() {
        let root = StaticFiles::DefaultRoot.resolve_root().unwrap();
        assert!(root.ends_with("static"));
    }
}
