//! OpenAPI 3.0 description emitter.

use crate::traits::{EmitError, EmitOptions, Emitter, OutputFile, Target};
use apigen_registry::{Body, Endpoint, ParamType, Registry, Response, Route};
use apigen_schema::case::to_camel_case;
use apigen_schema::{Field, Kind, Schema, TypeDef, TypeDefKind};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Emits `openapi.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiEmitter;

/// Static instance for the emitter registry.
pub static OPENAPI_EMITTER: OpenApiEmitter = OpenApiEmitter;

impl Emitter for OpenApiEmitter {
    fn name(&self) -> &'static str {
        "openapi"
    }

    fn language(&self) -> &'static str {
        "json"
    }

    fn target(&self) -> Target {
        Target::Description
    }

    fn emit(&self, registry: &Registry, options: &EmitOptions) -> Result<Vec<OutputFile>, EmitError> {
        let doc = document(registry, options);
        let mut contents = serde_json::to_string_pretty(&doc).map_err(|source| EmitError::Serialize {
            what: "openapi document",
            source,
        })?;
        contents.push('\n');
        Ok(vec![OutputFile::new("openapi.json", contents)])
    }
}

fn component_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// Schema object for a value, ignoring nullability.
fn kind_schema(schema: &Schema, kind: &Kind) -> Value {
    let mut obj = Map::new();
    match kind {
        Kind::String(rules) => {
            obj.insert("type".into(), "string".into());
            if let Some(n) = rules.min_length {
                obj.insert("minLength".into(), n.into());
            }
            if let Some(n) = rules.max_length {
                obj.insert("maxLength".into(), n.into());
            }
            if let Some(pattern) = &rules.pattern {
                obj.insert("pattern".into(), format!("^(?:{pattern})$").into());
            }
        }
        Kind::Integer(bounds) => {
            obj.insert("type".into(), "integer".into());
            obj.insert("format".into(), "int64".into());
            if let Some(n) = bounds.min {
                obj.insert("minimum".into(), n.into());
            }
            if let Some(n) = bounds.max {
                obj.insert("maximum".into(), n.into());
            }
        }
        Kind::Float(bounds) => {
            obj.insert("type".into(), "number".into());
            obj.insert("format".into(), "float".into());
            if let Some(n) = bounds.min {
                obj.insert("minimum".into(), n.into());
            }
            if let Some(n) = bounds.max {
                obj.insert("maximum".into(), n.into());
            }
        }
        Kind::Boolean => {
            obj.insert("type".into(), "boolean".into());
        }
        Kind::Array(items) => {
            obj.insert("type".into(), "array".into());
            obj.insert("items".into(), field_schema(schema, items));
        }
        Kind::Ref(name) => {
            return match schema.get(name) {
                Some(def) if def.is_record() || def.is_hoisted(schema) => component_ref(name),
                Some(TypeDef {
                    kind: TypeDefKind::Scalar(scalar),
                    ..
                }) => kind_schema(schema, &scalar.kind),
                _ => component_ref(name),
            };
        }
    }
    Value::Object(obj)
}

fn field_schema(schema: &Schema, field: &Field) -> Value {
    let inner = kind_schema(schema, &field.kind);
    if !field.nullable {
        return inner;
    }
    // Siblings of $ref are ignored in 3.0, so nullable refs go through allOf.
    match inner {
        Value::Object(mut obj) if !obj.contains_key("$ref") => {
            obj.insert("nullable".into(), true.into());
            Value::Object(obj)
        }
        reference => json!({ "nullable": true, "allOf": [reference] }),
    }
}

fn type_schema(schema: &Schema, def: &TypeDef) -> Value {
    match &def.kind {
        TypeDefKind::Record(fields) => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for (name, field) in fields {
                properties.insert(name.clone(), field_schema(schema, field));
                if !field.nullable {
                    required.push(Value::from(name.as_str()));
                }
            }
            let mut obj = Map::new();
            obj.insert("type".into(), "object".into());
            if !required.is_empty() {
                obj.insert("required".into(), Value::Array(required));
            }
            obj.insert("properties".into(), Value::Object(properties));
            Value::Object(obj)
        }
        TypeDefKind::Scalar(field) => kind_schema(schema, &field.kind),
    }
}

fn parameter(name: &str, ty: ParamType) -> Value {
    let schema = match ty {
        ParamType::Str => json!({ "type": "string" }),
        ParamType::Int => json!({ "type": "integer", "format": "int64" }),
    };
    json!({
        "name": to_camel_case(name),
        "in": "path",
        "required": true,
        "schema": schema,
    })
}

fn operation(route: &Route, endpoint: &Endpoint) -> Value {
    let mut op = Map::new();
    op.insert("operationId".into(), endpoint.operation.clone().into());
    op.insert(
        "parameters".into(),
        route
            .path
            .params()
            .iter()
            .map(|p| parameter(&p.name, p.ty))
            .collect::<Vec<_>>()
            .into(),
    );

    match &endpoint.body {
        Some(Body::Json(ty)) => {
            op.insert(
                "requestBody".into(),
                json!({
                    "required": true,
                    "content": { "application/json": { "schema": component_ref(ty) } },
                }),
            );
        }
        Some(Body::Files) => {
            op.insert(
                "requestBody".into(),
                json!({
                    "required": true,
                    "content": {
                        "multipart/form-data": {
                            "schema": {
                                "type": "object",
                                "additionalProperties": { "type": "string", "format": "binary" },
                            }
                        }
                    },
                }),
            );
        }
        None => {}
    }

    let description = format!("{} response", endpoint.operation);
    let ok = match &endpoint.response {
        Response::Json(ty) => json!({
            "description": description,
            "content": { "application/json": { "schema": component_ref(ty) } },
        }),
        Response::File => json!({
            "description": description,
            "content": {
                "application/octet-stream": { "schema": { "type": "string", "format": "binary" } }
            },
        }),
    };
    let mut responses = Map::new();
    responses.insert("200".into(), ok);
    if matches!(endpoint.body, Some(Body::Json(_))) {
        responses.insert(
            "400".into(),
            json!({
                "description": "request body failed to decode or validate",
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": { "message": { "type": "string" } },
                        }
                    }
                },
            }),
        );
    }
    op.insert("responses".into(), Value::Object(responses));
    Value::Object(op)
}

pub(crate) fn document(registry: &Registry, options: &EmitOptions) -> Value {
    let schema = registry.schema();

    let mut paths = Map::new();
    for route in registry.routes() {
        let key = route
            .path
            .render(|p| format!("{{{}}}", to_camel_case(&p.name)));
        let mut item = Map::new();
        for (method, endpoint) in &route.methods {
            item.insert(method.lower().to_string(), operation(route, endpoint));
        }
        paths.insert(key, Value::Object(item));
    }

    let mut components = Map::new();
    for def in registry.resolved_types().iter() {
        components.insert(def.name.clone(), type_schema(schema, def));
    }

    debug!(
        paths = paths.len(),
        components = components.len(),
        "generated openapi document"
    );
    json!({
        "openapi": "3.0.0",
        "info": { "title": options.title, "version": options.version },
        "paths": paths,
        "components": { "schemas": components },
    })
}
