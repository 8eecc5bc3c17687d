//! Minimal multipart/form-data encoder for the upload endpoint.
//!
//! `ureq` does not ship multipart support, so the body is assembled by hand:
//! one file part plus any number of plain text fields, closed with the
//! terminal boundary.

use uuid::Uuid;

/// A fully encoded multipart request body.
pub(crate) struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    /// `Content-Type` header value for this body.
    pub(crate) fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encoded body bytes.
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Incrementally builds a [`MultipartBody`].
pub(crate) struct MultipartBuilder {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBuilder {
    pub(crate) fn new() -> Self {
        Self::with_boundary(format!("unbias-studio-{}", Uuid::new_v4().simple()))
    }

    fn with_boundary(boundary: String) -> Self {
        Self {
            boundary,
            bytes: Vec::new(),
        }
    }

    /// Append a plain text field.
    pub(crate) fn text_field(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.bytes.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Append a file part with an explicit content type.
    pub(crate) fn file_field(
        mut self,
        name: &str,
        file_name: &str,
        content_type: &str,
        contents: &[u8],
    ) -> Self {
        self.open_part();
        self.bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        self.bytes
            .extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        self.bytes.extend_from_slice(contents);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Close the body with the terminal boundary.
    pub(crate) fn finish(mut self) -> MultipartBody {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        MultipartBody {
            boundary: self.boundary,
            bytes: self.bytes,
        }
    }

    fn open_part(&mut self) {
        self.bytes
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_file_parts() {
        let body = MultipartBuilder::with_boundary("XYZ".into())
            .text_field("cluster_count", "6")
            .file_field("file", "resumes.csv", "text/csv", b"a,b\n1,2\n")
            .finish();

        let text = String::from_utf8(body.bytes().to_vec()).unwrap();
        let expected = concat!(
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"cluster_count\"\r\n",
            "\r\n",
            "6\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"resumes.csv\"\r\n",
            "Content-Type: text/csv\r\n",
            "\r\n",
            "a,b\n1,2\n\r\n",
            "--XYZ--\r\n",
        );
        assert_eq!(text, expected);
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn generated_boundary_does_not_repeat() {
        let first = MultipartBuilder::new().finish();
        let second = MultipartBuilder::new().finish();
        assert_ne!(first.boundary, second.boundary);
    }
}
