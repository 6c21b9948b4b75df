//! POST body parsing: form fields and file uploads.
//!
//! Two body shapes are understood: `application/x-www-form-urlencoded`
//! (fields only) and `multipart/form-data` (fields and files). Anything else
//! yields empty maps — an unparseable *shape* is not an error, only a body
//! that claims a shape and then violates it is.

use std::collections::HashMap;

use crate::context::UploadedFile;
use crate::error::Error;

/// The outcome of body intake: form fields and uploaded files.
#[derive(Debug, Default)]
pub(crate) struct ParsedBody {
    pub(crate) fields: HashMap<String, String>,
    pub(crate) files: HashMap<String, UploadedFile>,
}

/// Parses a collected request body according to its declared content type.
///
/// `content_type` must be the raw header value, not the normalized one: the
/// multipart boundary parameter is case-sensitive.
pub(crate) fn parse(content_type: Option<&str>, body: &[u8]) -> Result<ParsedBody, Error> {
    let Some(content_type) = content_type else {
        return Ok(ParsedBody::default());
    };

    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "application/x-www-form-urlencoded" => Ok(parse_urlencoded(body)),
        "multipart/form-data" => {
            let boundary = boundary_param(content_type)
                .ok_or_else(|| Error::BodyParse("multipart body without a boundary".into()))?;
            parse_multipart(&boundary, body)
        }
        _ => Ok(ParsedBody::default()),
    }
}

fn parse_urlencoded(body: &[u8]) -> ParsedBody {
    let fields = url::form_urlencoded::parse(body).into_owned().collect();
    ParsedBody { fields, files: HashMap::new() }
}

/// Extracts the `boundary` parameter from a `multipart/form-data` value,
/// preserving its case.
fn boundary_param(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.eq_ignore_ascii_case("boundary")
                .then(|| value.trim_matches('"').to_owned())
        })
}

/// Splits a multipart body on its boundary and collects each part into
/// either a field or a file, keyed by the part's `name` parameter.
fn parse_multipart(boundary: &str, body: &[u8]) -> Result<ParsedBody, Error> {
    let delimiter = format!("--{boundary}");
    let mut parsed = ParsedBody::default();

    let mut rest = body;
    // Skip the preamble up to the first delimiter.
    let Some(start) = find(rest, delimiter.as_bytes()) else {
        return Err(Error::BodyParse("multipart body missing its boundary".into()));
    };
    rest = &rest[start + delimiter.len()..];

    loop {
        if rest.starts_with(b"--") {
            break; // closing delimiter
        }
        rest = rest.strip_prefix(b"\r\n").unwrap_or(rest);

        let Some(part_end) = find(rest, delimiter.as_bytes()) else {
            return Err(Error::BodyParse("multipart part is not terminated".into()));
        };
        let part = &rest[..part_end];
        rest = &rest[part_end + delimiter.len()..];

        let Some(split) = find(part, b"\r\n\r\n") else {
            return Err(Error::BodyParse("multipart part without a header block".into()));
        };
        let header_block = &part[..split];
        // Part content ends with the CRLF that precedes the next delimiter.
        let content = part[split + 4..]
            .strip_suffix(b"\r\n")
            .unwrap_or(&part[split + 4..]);

        let headers = String::from_utf8_lossy(header_block);
        let mut name = None;
        let mut filename = None;
        let mut content_type = None;
        for line in headers.split("\r\n") {
            let Some((header, value)) = line.split_once(':') else { continue };
            let value = value.trim();
            if header.eq_ignore_ascii_case("content-disposition") {
                name = disposition_param(value, "name");
                filename = disposition_param(value, "filename");
            } else if header.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.to_owned());
            }
        }

        let Some(name) = name else {
            return Err(Error::BodyParse("multipart part without a field name".into()));
        };

        // Only the filename marks a part as a file upload; fields may carry
        // a content type of their own.
        if filename.is_some() {
            parsed.files.insert(
                name,
                UploadedFile { filename, content_type, data: content.to_vec() },
            );
        } else {
            parsed
                .fields
                .insert(name, String::from_utf8_lossy(content).into_owned());
        }
    }

    Ok(parsed)
}

/// First occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Extracts a quoted parameter like `name="avatar"` from a
/// `content-disposition` value.
fn disposition_param(value: &str, key: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let (k, v) = param.split_once('=')?;
            k.eq_ignore_ascii_case(key)
                .then(|| v.trim_matches('"').to_owned())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_content_type_yields_empty_maps() {
        let parsed = parse(None, b"whatever").unwrap();
        assert!(parsed.fields.is_empty());
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn unknown_content_type_yields_empty_maps() {
        let parsed = parse(Some("application/json"), b"{}").unwrap();
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn urlencoded_fields() {
        let parsed = parse(
            Some("application/x-www-form-urlencoded"),
            b"name=alice&greeting=hello%20world",
        )
        .unwrap();
        assert_eq!(parsed.fields["name"], "alice");
        assert_eq!(parsed.fields["greeting"], "hello world");
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn urlencoded_with_charset_param() {
        let parsed = parse(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            b"k=v",
        )
        .unwrap();
        assert_eq!(parsed.fields["k"], "v");
    }

    #[test]
    fn multipart_field_and_file() {
        let body = concat!(
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"who\"\r\n",
            "\r\n",
            "alice\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "file bytes\r\n",
            "--XYZ--\r\n",
        );
        let parsed = parse(Some("multipart/form-data; boundary=XYZ"), body.as_bytes()).unwrap();
        assert_eq!(parsed.fields["who"], "alice");
        let file = &parsed.files["upload"];
        assert_eq!(file.filename.as_deref(), Some("a.txt"));
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
        assert_eq!(file.data, b"file bytes");
    }

    #[test]
    fn typed_field_without_filename_stays_a_field() {
        let body = concat!(
            "--B\r\n",
            "Content-Disposition: form-data; name=\"note\"\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "\r\n",
            "just text\r\n",
            "--B--\r\n",
        );
        let parsed = parse(Some("multipart/form-data; boundary=B"), body.as_bytes()).unwrap();
        assert_eq!(parsed.fields["note"], "just text");
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn boundary_case_is_preserved() {
        // A lowercased boundary would never be found in the body.
        assert_eq!(
            boundary_param("multipart/form-data; boundary=AbC123"),
            Some("AbC123".to_owned())
        );
        assert_eq!(
            boundary_param("multipart/form-data; BOUNDARY=\"abc\""),
            Some("abc".to_owned())
        );
    }

    #[test]
    fn multipart_without_boundary_is_an_error() {
        let err = parse(Some("multipart/form-data"), b"").unwrap_err();
        assert!(matches!(err, Error::BodyParse(_)));
    }

    #[test]
    fn truncated_multipart_is_an_error() {
        let body = b"--B\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\nvalue";
        let err = parse(Some("multipart/form-data; boundary=B"), body).unwrap_err();
        assert!(matches!(err, Error::BodyParse(_)));
    }
}
