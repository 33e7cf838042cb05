//! Request description handed to the dispatcher.
//!
//! A [`RequestSpec`] is built once per call by an endpoint method and is
//! never mutated afterwards, so the dispatcher can replay it verbatim after
//! a token refresh.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ClientError;

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A single file sent as one named part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the content, e.g. `image/jpeg`.
    pub mime_type: Option<String>,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    /// Creates an upload from raw bytes.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    /// Sets the MIME type of the part.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON-encoded body.
    Json(Value),
    /// Multipart form with a single file part under `field`.
    Multipart {
        /// Form field name (the API uses `media`).
        field: String,
        /// File content.
        upload: MediaUpload,
    },
}

impl RequestBody {
    /// Builds a fresh `reqwest` form for one attempt.
    ///
    /// Forms are single-use, so a replayed request needs a new one.
    pub(crate) fn to_form(
        field: &str,
        upload: &MediaUpload,
    ) -> Result<reqwest::multipart::Form, ClientError> {
        let mut part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone());
        if let Some(mime) = &upload.mime_type {
            part = part
                .mime_str(mime)
                .map_err(|e| ClientError::Config(format!("invalid mime type {mime}: {e}")))?;
        }
        Ok(reqwest::multipart::Form::new().part(field.to_string(), part))
    }
}

/// Immutable description of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    path: String,
    method: Method,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: Option<RequestBody>,
    requires_auth: bool,
}

impl RequestSpec {
    /// Creates a request for `path` (relative to the versioned base URL,
    /// starting with `/`).
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            requires_auth: false,
        }
    }

    /// Shorthand for a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Shorthand for a `PUT` request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Shorthand for a `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attaches a multipart body with one file part.
    #[must_use]
    pub fn with_multipart(mut self, field: impl Into<String>, upload: MediaUpload) -> Self {
        self.body = Some(RequestBody::Multipart {
            field: field.into(),
            upload,
        });
        self
    }

    /// Adds a header. Caller headers override the defaults the dispatcher
    /// sets, including `Content-Type`, `X-API-Key` and `Authorization`.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Appends query-string pairs, in order.
    #[must_use]
    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Marks the request as needing an access token. The dispatcher fails
    /// it with [`ClientError::AuthRequired`] before any network call when
    /// the session holds none.
    #[must_use]
    pub const fn require_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Request path relative to the versioned base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Query-string pairs.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Caller-supplied headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Request body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Returns `true` if the body is a multipart form.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, Some(RequestBody::Multipart { .. }))
    }

    /// Returns `true` if the request needs an access token.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}
