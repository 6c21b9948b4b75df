//! Per-request context handed to handlers.

use std::collections::HashMap;

use crate::headers::HeaderValue;
use crate::responder::Responder;

/// A file received through a `multipart/form-data` upload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UploadedFile {
    /// The client-supplied file name, if any.
    pub filename: Option<String>,
    /// The part's declared content type, if any.
    pub content_type: Option<String>,
    /// The raw file bytes.
    pub data: Vec<u8>,
}

/// Everything a handler can see about one request, plus the one way to
/// answer it.
///
/// The context is created at the start of dispatch and moved into the matched
/// handler. It is cheap to clone (the response slot is shared), so a handler
/// may hand a copy to a spawned task and finalize from there. Nothing in it
/// is shared between different requests.
#[derive(Clone)]
pub struct Context {
    pub(crate) fields: HashMap<String, String>,
    pub(crate) files: HashMap<String, UploadedFile>,
    pub(crate) captures: Option<Vec<Option<String>>>,
    pub(crate) headers: HashMap<String, HeaderValue>,
    pub(crate) responder: Responder,
}

impl Context {
    /// Parsed form fields. Empty unless a POST body carried any.
    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// A single form field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Uploaded files. Empty unless the request was multipart with files.
    pub fn files(&self) -> &HashMap<String, UploadedFile> {
        &self.files
    }

    /// A single uploaded file by field name.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    /// The route's regex captures: group 0 is the whole match. `None` until a
    /// route has matched.
    pub fn matches(&self) -> Option<&[Option<String>]> {
        self.captures.as_deref()
    }

    /// A single capture group as a string.
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures
            .as_ref()?
            .get(index)?
            .as_deref()
    }

    /// Normalized request headers (lowercase names and values, repeats
    /// collected in arrival order).
    pub fn headers(&self) -> &HashMap<String, HeaderValue> {
        &self.headers
    }

    /// A single normalized header by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(&name.to_ascii_lowercase())
    }

    /// Sets the response status code. Effective until the response is sent.
    pub fn set_status(&self, code: u16) {
        self.responder.set_status(code);
    }

    /// Finalizes the response. See [`Responder::send`].
    pub fn send(&self, body: impl Into<Vec<u8>>, headers: &[(&str, &str)]) {
        self.responder.send(body, headers);
    }

    /// The underlying finalizer, for handlers that want to move it alone.
    pub fn responder(&self) -> &Responder {
        &self.responder
    }
}
