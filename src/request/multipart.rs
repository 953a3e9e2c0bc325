//! `multipart/form-data` body construction.
//!
//! A [`MultipartFormData`] is an ordered list of [`BodyPart`]s sharing one
//! random boundary token. Every entry of a part becomes one section of
//! the encoded body:
//!
//! ```text
//! --<boundary>\r\n                      initial marker
//! Content-Disposition: form-data; name="title"\r\n
//! \r\n
//! Morning run
//! \r\n--<boundary>\r\n                  encapsulated marker
//! Content-Disposition: form-data; name="photo"; filename="photo.jpg"\r\n
//! Content-Type: image/jpeg\r\n
//! \r\n
//! <bytes>
//! \r\n--<boundary>--\r\n                final marker
//! ```
//!
//! Sections are written in part order, then in the order each part's
//! entries were supplied.

use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;

use crate::protocol::constants::{headers, media_types};

const CRLF: &str = "\r\n";

/// Which of the three boundary markers to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryType {
    /// `--<boundary>\r\n`, opens the body.
    Initial,
    /// `\r\n--<boundary>\r\n`, separates two sections.
    Encapsulated,
    /// `\r\n--<boundary>--\r\n`, closes the body.
    Final,
}

/// Random boundary tokens and their marker forms.
pub struct BoundaryGenerator;

impl BoundaryGenerator {
    /// Literal prefix of every generated token.
    pub const PREFIX: &'static str = "boundary.";

    /// `boundary.` followed by two random `u32` as 8 lowercase hex digits each.
    pub fn random_boundary() -> String {
        let mut rng = rand::thread_rng();
        format!("{}{:08x}{:08x}", Self::PREFIX, rng.gen::<u32>(), rng.gen::<u32>())
    }

    /// Render one marker for `boundary`.
    pub fn boundary_data(kind: BoundaryType, boundary: &str) -> Bytes {
        let marker = match kind {
            BoundaryType::Initial => format!("--{}{}", boundary, CRLF),
            BoundaryType::Encapsulated => format!("{}--{}{}", CRLF, boundary, CRLF),
            BoundaryType::Final => format!("{}--{}--{}", CRLF, boundary, CRLF),
        };
        Bytes::from(marker)
    }
}

/// Payload of a [`BodyPart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    /// Named text fields in supplied order. Never carry a content type.
    Parameters(Vec<(String, String)>),
    /// Named binary blobs in supplied order.
    Data(Vec<(String, Bytes)>),
}

/// One logical part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPart {
    /// Named fields or blobs.
    pub content: PartContent,
    /// MIME type of binary sections.
    pub mime_type: Option<String>,
    /// Extension appended to the filename of binary sections.
    pub file_extension: Option<String>,
}

impl BodyPart {
    /// Text fields part.
    pub fn parameters<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        BodyPart {
            content: PartContent::Parameters(
                fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ),
            mime_type: None,
            file_extension: None,
        }
    }

    /// Binary blobs part.
    pub fn data<K, V>(blobs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Bytes>,
    {
        BodyPart {
            content: PartContent::Data(
                blobs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ),
            mime_type: None,
            file_extension: None,
        }
    }

    /// Set the MIME type written for binary sections.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the filename extension written for binary sections.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    /// Number of sections this part encodes to.
    pub fn section_count(&self) -> usize {
        match &self.content {
            PartContent::Parameters(fields) => fields.len(),
            PartContent::Data(blobs) => blobs.len(),
        }
    }

    fn write_sections(&self, boundary: &str, first: &mut bool, out: &mut BytesMut) {
        match &self.content {
            PartContent::Parameters(fields) => {
                for (name, value) in fields {
                    write_separator(boundary, first, out);
                    write_header(
                        out,
                        headers::CONTENT_DISPOSITION,
                        &format!("form-data; name=\"{}\"", escape_quoted(name)),
                    );
                    out.put_slice(CRLF.as_bytes());
                    out.put_slice(value.as_bytes());
                }
            }
            PartContent::Data(blobs) => {
                for (name, payload) in blobs {
                    write_separator(boundary, first, out);
                    let filename = match &self.file_extension {
                        Some(ext) => format!("{}.{}", name, ext),
                        None => name.clone(),
                    };
                    write_header(
                        out,
                        headers::CONTENT_DISPOSITION,
                        &format!(
                            "form-data; name=\"{}\"; filename=\"{}\"",
                            escape_quoted(name),
                            escape_quoted(&filename)
                        ),
                    );
                    if let Some(mime) = &self.mime_type {
                        write_header(out, headers::CONTENT_TYPE, mime);
                    }
                    out.put_slice(CRLF.as_bytes());
                    out.put_slice(payload);
                }
            }
        }
    }
}

fn write_separator(boundary: &str, first: &mut bool, out: &mut BytesMut) {
    let kind = if *first {
        *first = false;
        BoundaryType::Initial
    } else {
        BoundaryType::Encapsulated
    };
    out.put(BoundaryGenerator::boundary_data(kind, boundary));
}

fn write_header(out: &mut BytesMut, name: &str, value: &str) {
    out.put_slice(format!("{}: {}{}", name, value, CRLF).as_bytes());
}

// Quoted-string parameters may not contain raw quotes or line breaks.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// A multipart form: one boundary token and ordered parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFormData {
    boundary: String,
    parts: Vec<BodyPart>,
}

impl MultipartFormData {
    /// Empty form with a freshly generated boundary.
    pub fn new() -> Self {
        Self::with_boundary(BoundaryGenerator::random_boundary())
    }

    /// Empty form with a caller-supplied boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        MultipartFormData {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Form built from `parts` with a fresh boundary.
    pub fn from_parts(parts: impl IntoIterator<Item = BodyPart>) -> Self {
        let mut form = Self::new();
        form.parts.extend(parts);
        form
    }

    /// Append a part.
    pub fn append(&mut self, part: BodyPart) {
        self.parts.push(part);
    }

    /// Builder-style [`append`](Self::append).
    pub fn part(mut self, part: BodyPart) -> Self {
        self.append(part);
        self
    }

    /// The boundary token.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Parts in insertion order.
    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    /// Total number of encoded sections.
    pub fn section_count(&self) -> usize {
        self.parts.iter().map(BodyPart::section_count).sum()
    }

    /// `Content-Type` header value announcing this form's boundary.
    pub fn content_type(&self) -> String {
        format!("{}; boundary={}", media_types::MULTIPART_FORM_DATA, self.boundary)
    }

    /// Encode the body. A form without sections encodes to an empty body.
    pub fn encode(&self) -> Bytes {
        if self.section_count() == 0 {
            return Bytes::new();
        }
        let mut out = BytesMut::new();
        let mut first = true;
        for part in &self.parts {
            part.write_sections(&self.boundary, &mut first, &mut out);
        }
        out.put(BoundaryGenerator::boundary_data(BoundaryType::Final, &self.boundary));
        out.freeze()
    }
}

impl Default for MultipartFormData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_boundary_format() {
        let boundary = BoundaryGenerator::random_boundary();
        let hex = boundary.strip_prefix("boundary.").unwrap();
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_boundary_markers() {
        assert_eq!(
            BoundaryGenerator::boundary_data(BoundaryType::Initial, "b"),
            Bytes::from_static(b"--b\r\n")
        );
        assert_eq!(
            BoundaryGenerator::boundary_data(BoundaryType::Encapsulated, "b"),
            Bytes::from_static(b"\r\n--b\r\n")
        );
        assert_eq!(
            BoundaryGenerator::boundary_data(BoundaryType::Final, "b"),
            Bytes::from_static(b"\r\n--b--\r\n")
        );
    }

    #[test]
    fn test_boundaries_are_distinct() {
        let tokens: HashSet<String> = (0..10_000).map(|_| BoundaryGenerator::random_boundary()).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn test_encode_exact_bytes() {
        let form = MultipartFormData::with_boundary("XYZ")
            .part(BodyPart::parameters([("title", "Morning run")]))
            .part(
                BodyPart::data([("photo", Bytes::from_static(b"\x89PNG"))])
                    .with_mime_type("image/png")
                    .with_file_extension("png"),
            );
        let expected: &[u8] = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
Morning run\
\r\n--XYZ\r\n\
Content-Disposition: form-data; name=\"photo\"; filename=\"photo.png\"\r\n\
Content-Type: image/png\r\n\
\r\n\
\x89PNG\
\r\n--XYZ--\r\n";
        assert_eq!(form.encode().as_ref(), expected);
    }

    #[test]
    fn test_parameter_parts_never_carry_content_type() {
        let form = MultipartFormData::with_boundary("B")
            .part(BodyPart::parameters([("a", "1")]).with_mime_type("text/plain"));
        let body = form.encode();
        assert_eq!(count(&body, b"Content-Type"), 0);
    }

    #[test]
    fn test_marker_counts_for_n_sections() {
        let form = MultipartFormData::new()
            .part(BodyPart::parameters([("a", "1"), ("b", "2")]))
            .part(BodyPart::data([("file", vec![1u8, 2, 3])]))
            .part(BodyPart::parameters([("c", "3")]));
        let n = form.section_count();
        assert_eq!(n, 4);

        let body = form.encode();
        let boundary = form.boundary();
        let initial = format!("--{}\r\n", boundary);
        let encapsulated = format!("\r\n--{}\r\n", boundary);
        let fin = format!("\r\n--{}--\r\n", boundary);

        assert!(body.starts_with(initial.as_bytes()));
        assert!(body.ends_with(fin.as_bytes()));
        assert_eq!(count(&body, encapsulated.as_bytes()), n - 1);
        assert_eq!(count(&body, fin.as_bytes()), 1);
        // every "--boundary" occurrence is one of the n + 1 markers
        assert_eq!(count(&body, format!("--{}", boundary).as_bytes()), n + 1);
    }

    #[test]
    fn test_section_order_is_preserved() {
        let form = MultipartFormData::with_boundary("B")
            .part(BodyPart::parameters([("z", "last-key-first-part")]))
            .part(BodyPart::parameters([("a", "first-key-second-part")]));
        let body = String::from_utf8(form.encode().to_vec()).unwrap();
        let z = body.find("last-key-first-part").unwrap();
        let a = body.find("first-key-second-part").unwrap();
        assert!(z < a);
    }

    #[test]
    fn test_entries_keep_supplied_order() {
        let form = MultipartFormData::with_boundary("B")
            .part(BodyPart::parameters([("title", "1"), ("content", "2")]))
            .part(BodyPart::data([("zeta", vec![1u8]), ("alpha", vec![2u8])]));
        let body = String::from_utf8_lossy(&form.encode()).into_owned();
        let positions: Vec<usize> = ["name=\"title\"", "name=\"content\"", "name=\"zeta\"", "name=\"alpha\""]
            .iter()
            .map(|needle| body.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_form_encodes_empty() {
        assert!(MultipartFormData::new().encode().is_empty());
    }

    #[test]
    fn test_content_type() {
        let form = MultipartFormData::with_boundary("boundary.0000000100000002");
        assert_eq!(
            form.content_type(),
            "multipart/form-data; boundary=boundary.0000000100000002"
        );
    }
}
