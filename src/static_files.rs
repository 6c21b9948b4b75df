//! Static file fallback.
//!
//! Resolves a request path against a root directory. Directories resolve
//! through exactly one `index.html` hop; a missing or odd filesystem entry is
//! "not found" (the pipeline moves on), while a file that stats fine but
//! fails to read is a real error.

use std::path::Path;

use crate::error::Error;

/// Infers a content type from the file extension.
///
/// The table is deliberately small; anything unmapped serves as plain text.
fn content_type(path: &Path) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str());
    match extension {
        Some("html" | "htm") => "text/html",
        Some("txt") => "text/plain",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "text/plain",
    }
}

/// Resolves `request_path` under `root`.
///
/// Returns the file bytes and inferred content type, `None` when nothing
/// servable exists there, or an error when a file stats fine but cannot be
/// read. Any `?query` suffix is stripped before the filesystem is touched.
pub(crate) async fn resolve(
    root: &Path,
    request_path: &str,
) -> Result<Option<(Vec<u8>, &'static str)>, Error> {
    let path = request_path.split('?').next().unwrap_or(request_path);
    let relative = Path::new(path.trim_start_matches('/'));

    // Dot segments would let a request climb out of the root; anything that
    // is not a plain downward path is "not found".
    if !relative
        .components()
        .all(|c| matches!(c, std::path::Component::Normal(_)))
    {
        return Ok(None);
    }

    let mut target = root.join(relative);
    let mut hopped = false;

    loop {
        // A failed stat is "not found", whatever the reason: missing file,
        // permission error, dangling link.
        let Ok(meta) = tokio::fs::metadata(&target).await else {
            return Ok(None);
        };

        if meta.is_file() {
            let bytes = tokio::fs::read(&target).await.map_err(Error::StaticRead)?;
            return Ok(Some((bytes, content_type(&target))));
        }

        // Directories resolve through exactly one index.html hop.
        if meta.is_dir() && !hopped {
            target = target.join("index.html");
            hopped = true;
            continue;
        }

        return Ok(None);
    }
}
