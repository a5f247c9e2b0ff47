//! API path patterns and their typed placeholders.
//!
//! Placeholders look like `<str:sessionId>` or `<int:id>`: a primitive type
//! tag and a parameter name. They are extracted left to right together with
//! their byte span in the pattern, which emitters use to substitute each
//! placeholder with their own URL syntax.

use crate::error::RegistryError;
use crate::names::check_param;
use apigen_schema::case::{is_identifier, to_camel_case, to_snake_case};
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>]*)>").expect("placeholder regex is valid"));

/// The declared type of a path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
}

impl ParamType {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "str" => Some(Self::Str),
            "int" => Some(Self::Int),
            _ => None,
        }
    }

    /// The tag as written in patterns (also Django's converter name).
    pub fn tag(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One placeholder extracted from a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: String,
    pub ty: ParamType,
    /// Byte range of the whole `<type:name>` tag in the pattern.
    pub span: Range<usize>,
}

/// Extract placeholders in declaration order.
pub fn extract_params(pattern: &str) -> Result<Vec<PathParam>, RegistryError> {
    let malformed = |reason: String| RegistryError::MalformedPath {
        path: pattern.to_string(),
        reason,
    };

    let mut params: Vec<PathParam> = Vec::new();
    let mut last_end = 0;
    for caps in PLACEHOLDER.captures_iter(pattern) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if pattern[last_end..whole.start()].contains(['<', '>']) {
            return Err(malformed("unbalanced '<' or '>'".to_string()));
        }
        last_end = whole.end();

        let Some((tag, name)) = inner.as_str().split_once(':') else {
            return Err(malformed(format!(
                "placeholder <{}> needs the form <type:name>",
                inner.as_str()
            )));
        };
        let Some(ty) = ParamType::from_tag(tag) else {
            return Err(malformed(format!("unknown parameter type {tag:?}")));
        };
        if !is_identifier(name) {
            return Err(malformed(format!("invalid parameter name {name:?}")));
        }
        // Both targets re-case parameter names, so compare the re-cased forms.
        if params.iter().any(|p| {
            p.name == name
                || to_snake_case(&p.name) == to_snake_case(name)
                || to_camel_case(&p.name) == to_camel_case(name)
        }) {
            return Err(RegistryError::DuplicateParam {
                path: pattern.to_string(),
                param: name.to_string(),
            });
        }
        check_param(pattern, name)?;
        params.push(PathParam {
            name: name.to_string(),
            ty,
            span: whole.range(),
        });
    }
    if pattern[last_end..].contains(['<', '>']) {
        return Err(malformed("unbalanced '<' or '>'".to_string()));
    }
    Ok(params)
}

/// A path pattern and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    pub pattern: String,
    pub name: String,
    params: Vec<PathParam>,
}

impl ApiPath {
    pub fn new(pattern: impl Into<String>, name: impl Into<String>) -> Result<Self, RegistryError> {
        let pattern = pattern.into();
        let name = name.into();
        if !pattern.starts_with('/') {
            return Err(RegistryError::MalformedPath {
                path: pattern,
                reason: "must start with '/'".to_string(),
            });
        }
        if !is_identifier(&name) {
            return Err(RegistryError::InvalidIdentifier(name));
        }
        let params = extract_params(&pattern)?;
        Ok(Self {
            pattern,
            name,
            params,
        })
    }

    pub fn params(&self) -> &[PathParam] {
        &self.params
    }

    /// The pattern with parameter names erased: two paths with the same
    /// route key match the same requests.
    pub fn route_key(&self) -> String {
        self.render(|p| format!("<{}>", p.ty.tag()))
    }

    /// Rebuild the pattern, replacing every placeholder with `f(param)`.
    pub fn render(&self, mut f: impl FnMut(&PathParam) -> String) -> String {
        let mut out = String::with_capacity(self.pattern.len());
        let mut last = 0;
        for param in &self.params {
            out.push_str(&self.pattern[last..param.span.start]);
            out.push_str(&f(param));
            last = param.span.end;
        }
        out.push_str(&self.pattern[last..]);
        out
    }
}
