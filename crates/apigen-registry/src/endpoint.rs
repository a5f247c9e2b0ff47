//! Endpoints: one operation behind one (path, method) pair.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    /// Upper-case wire name, e.g. `GET`.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Lower-case name, e.g. `get`.
    pub fn lower(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }

    pub fn allows_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// A JSON-encoded record.
    Json(String),
    /// Raw file upload, passed through unparsed.
    Files,
}

/// What a response carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A JSON-encoded record.
    Json(String),
    /// Raw file download, passed through unvalidated.
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Unique across the registry; the client function name.
    pub operation: String,
    pub body: Option<Body>,
    pub response: Response,
}

impl Endpoint {
    /// An endpoint answering with the JSON record `response`.
    pub fn new(operation: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            body: None,
            response: Response::Json(response.into()),
        }
    }

    /// An endpoint answering with a raw file.
    pub fn download(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            body: None,
            response: Response::File,
        }
    }

    /// Expect the JSON record `body` in requests.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Json(body.into()));
        self
    }

    /// Expect raw file uploads in requests.
    pub fn files(mut self) -> Self {
        self.body = Some(Body::Files);
        self
    }

    pub fn body_type(&self) -> Option<&str> {
        match &self.body {
            Some(Body::Json(ty)) => Some(ty),
            _ => None,
        }
    }

    pub fn response_type(&self) -> Option<&str> {
        match &self.response {
            Response::Json(ty) => Some(ty),
            Response::File => None,
        }
    }
}
