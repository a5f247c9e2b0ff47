//! Building and querying the endpoint registry.

use crate::endpoint::{Body, Endpoint, Method};
use crate::error::RegistryError;
use crate::names;
use crate::path::ApiPath;
use apigen_schema::case::{is_identifier, to_snake_case};
use apigen_schema::{ResolvedTypes, Schema, resolve_all};
use std::collections::HashSet;
use tracing::debug;

/// One path and the endpoints registered on it, in registration order.
#[derive(Debug, Clone)]
pub struct Route {
    pub path: ApiPath,
    pub methods: Vec<(Method, Endpoint)>,
}

/// Declarations for one path, collected by [`RegistryBuilder::register`].
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    pattern: String,
    name: String,
    methods: Vec<(Method, Endpoint)>,
}

impl RouteBuilder {
    pub fn method(&mut self, method: Method, endpoint: Endpoint) -> &mut Self {
        self.methods.push((method, endpoint));
        self
    }

    pub fn get(&mut self, endpoint: Endpoint) -> &mut Self {
        self.method(Method::Get, endpoint)
    }

    pub fn post(&mut self, endpoint: Endpoint) -> &mut Self {
        self.method(Method::Post, endpoint)
    }

    pub fn put(&mut self, endpoint: Endpoint) -> &mut Self {
        self.method(Method::Put, endpoint)
    }

    pub fn patch(&mut self, endpoint: Endpoint) -> &mut Self {
        self.method(Method::Patch, endpoint)
    }

    pub fn delete(&mut self, endpoint: Endpoint) -> &mut Self {
        self.method(Method::Delete, endpoint)
    }
}

/// Collects schema definitions and routes; [`build`](Self::build) checks
/// them all at once.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    schema: Schema,
    routes: Vec<RouteBuilder>,
}

impl RegistryBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            routes: Vec::new(),
        }
    }

    /// Declare a path; chain methods on the result.
    pub fn register(&mut self, pattern: impl Into<String>, name: impl Into<String>) -> &mut RouteBuilder {
        self.routes.push(RouteBuilder {
            pattern: pattern.into(),
            name: name.into(),
            methods: Vec::new(),
        });
        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    /// Check every declaration and freeze the registry.
    ///
    /// Fails on the first problem found; nothing is generated from a
    /// registry that does not build.
    pub fn build(self) -> Result<Registry, RegistryError> {
        self.schema.check()?;
        names::check_schema(&self.schema)?;

        let mut routes: Vec<Route> = Vec::with_capacity(self.routes.len());
        let mut route_keys = HashSet::new();
        let mut path_names = HashSet::new();
        let mut operations = HashSet::new();

        for decl in self.routes {
            let path = ApiPath::new(decl.pattern, decl.name)?;
            if decl.methods.is_empty() {
                return Err(RegistryError::NoEndpoints(path.pattern));
            }
            if !path_names.insert(to_snake_case(&path.name)) {
                return Err(RegistryError::DuplicatePathName(path.name));
            }
            names::check_path_name(&self.schema, &path.name)?;

            let key = path.route_key();
            for (method, endpoint) in &decl.methods {
                if !route_keys.insert((key.clone(), *method)) {
                    return Err(RegistryError::DuplicateRoute {
                        path: path.pattern.clone(),
                        method: *method,
                    });
                }
                if !is_identifier(&endpoint.operation) {
                    return Err(RegistryError::InvalidIdentifier(endpoint.operation.clone()));
                }
                names::check_operation(&endpoint.operation)?;
                if !operations.insert(endpoint.operation.clone()) {
                    return Err(RegistryError::DuplicateOperation(endpoint.operation.clone()));
                }
                if endpoint.body.is_some() && !method.allows_body() {
                    return Err(RegistryError::BodyNotAllowed {
                        operation: endpoint.operation.clone(),
                        method: *method,
                    });
                }
                for ty in endpoint.body_type().into_iter().chain(endpoint.response_type()) {
                    check_record(&self.schema, &endpoint.operation, ty)?;
                }
            }

            debug!(
                path = %path.pattern,
                params = path.params().len(),
                methods = decl.methods.len(),
                "registered path"
            );
            routes.push(Route {
                path,
                methods: decl.methods,
            });
        }

        let resolved: Vec<String> = {
            let roots = routes
                .iter()
                .flat_map(|r| r.methods.iter())
                .flat_map(|(_, ep)| ep.body_type().into_iter().chain(ep.response_type()));
            resolve_all(&self.schema, roots)?
                .names()
                .map(str::to_string)
                .collect()
        };
        debug!(types = resolved.len(), "resolved types");

        Ok(Registry {
            schema: self.schema,
            routes,
            resolved,
        })
    }
}

fn check_record(schema: &Schema, operation: &str, ty: &str) -> Result<(), RegistryError> {
    match schema.get(ty) {
        None => Err(RegistryError::UnknownType {
            operation: operation.to_string(),
            ty: ty.to_string(),
        }),
        Some(def) if !def.is_record() => Err(RegistryError::NotARecord {
            operation: operation.to_string(),
            ty: ty.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

/// A checked, immutable set of routes and the schema they use.
#[derive(Debug, Clone)]
pub struct Registry {
    schema: Schema,
    routes: Vec<Route>,
    resolved: Vec<String>,
}

impl Registry {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Every endpoint with its route and method, in registration order.
    pub fn endpoints(&self) -> impl Iterator<Item = (&Route, Method, &Endpoint)> {
        self.routes
            .iter()
            .flat_map(|route| route.methods.iter().map(move |(m, ep)| (route, *m, ep)))
    }

    pub fn endpoint(&self, operation: &str) -> Option<(&Route, Method, &Endpoint)> {
        self.endpoints().find(|(_, _, ep)| ep.operation == operation)
    }

    /// The sorted union of every body and response type's closure.
    pub fn resolved_types(&self) -> ResolvedTypes<'_> {
        self.resolved
            .iter()
            .filter_map(|name| self.schema.get(name))
            .collect()
    }

    /// Whether any endpoint accepts raw file uploads.
    pub fn has_uploads(&self) -> bool {
        self.endpoints()
            .any(|(_, _, ep)| matches!(ep.body, Some(Body::Files)))
    }
}
