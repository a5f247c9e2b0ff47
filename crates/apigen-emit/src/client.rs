//! TypeScript client emitter.
//!
//! Produces a single `ApiService.ts` holding an interface (or, for a hoisted
//! named scalar, a type alias) and a validator per resolved type, one async
//! stub per endpoint, and the fetch helpers the stubs call. Stubs validate
//! the request body before any network call and the decoded response before
//! returning it.
//!
//! Patterns are compiled with the `u` flag so classes and lengths work on
//! code points, as they do on the server.

use crate::literal::{quoted, regex_literal_body};
use crate::rules::{Check, NULL_MESSAGE, Plan, TypePlan};
use crate::traits::{EmitError, EmitOptions, Emitter, OutputFile, Target};
use apigen_registry::{Body, Endpoint, Method, ParamType, Registry, Response, Route};
use apigen_schema::case::{to_camel_case, to_pascal_case};
use apigen_schema::{Field, Kind, Schema, TypeDef, TypeDefKind};
use tracing::debug;

const RUNTIME_TS: &str = include_str!("../data/client_runtime.ts");
const HEADER: &str = "// Generated by apigen. Do not edit.\n\
/* eslint-disable @typescript-eslint/no-unused-vars */\n\n\
const env = await import.meta.env;\n";
const INDENT: &str = "  ";
const STREAM_TYPE: &str = "ReadableStream<Uint8Array> | null";

/// Emits the browser-side service module.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptEmitter;

/// Static instance for the emitter registry.
pub static TYPESCRIPT_EMITTER: TypeScriptEmitter = TypeScriptEmitter;

impl Emitter for TypeScriptEmitter {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn language(&self) -> &'static str {
        "typescript"
    }

    fn target(&self) -> Target {
        Target::Client
    }

    fn emit(&self, registry: &Registry, _options: &EmitOptions) -> Result<Vec<OutputFile>, EmitError> {
        Ok(vec![OutputFile::new("ApiService.ts", generate_client(registry))])
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn interface_name(type_name: &str) -> String {
    format!("I{type_name}")
}

fn validator_name(type_name: &str) -> String {
    format!("validate{}", to_pascal_case(type_name))
}

/// TypeScript type of a present value. Hoisted named scalars keep their
/// alias; unconstrained ones are spelled as their primitive.
fn ts_type(schema: &Schema, field: &Field) -> String {
    match &field.kind {
        Kind::String(_) => "string".to_string(),
        Kind::Integer(_) | Kind::Float(_) => "number".to_string(),
        Kind::Boolean => "boolean".to_string(),
        Kind::Array(items) => {
            let inner = ts_type(schema, items);
            if items.nullable {
                format!("({inner} | null)[]")
            } else {
                format!("{inner}[]")
            }
        }
        Kind::Ref(name) => match schema.get(name) {
            Some(def) if def.is_record() => interface_name(name),
            Some(def) if def.is_hoisted(schema) => name.clone(),
            Some(TypeDef {
                kind: TypeDefKind::Scalar(scalar),
                ..
            }) => ts_type(schema, scalar),
            _ => interface_name(name),
        },
    }
}

fn throw(out: &mut String, depth: usize, condition: &str, context: &str, suffix: &str) {
    line(out, depth, &format!("if ({condition}) {{"));
    line(
        out,
        depth + 1,
        &format!(
            "throw new SchemaValidationError({});",
            quoted(&format!("{context} {suffix}"))
        ),
    );
    line(out, depth, "}");
}

fn entry_name(accessor: &str) -> String {
    format!("{}Entry", to_camel_case(&accessor.replace('.', "_")))
}

fn render_checks(out: &mut String, depth: usize, context: &str, accessor: &str, plan: &Plan) {
    if plan.is_noop() {
        return;
    }
    let mut depth = depth;
    if plan.nullable {
        line(
            out,
            depth,
            &format!("if ({accessor} !== undefined && {accessor} !== null) {{"),
        );
        depth += 1;
    } else {
        throw(
            out,
            depth,
            &format!("{accessor} === undefined || {accessor} === null"),
            context,
            NULL_MESSAGE,
        );
    }

    for check in &plan.checks {
        let suffix = check.message().unwrap_or_default();
        match check {
            Check::MinLength(n) => throw(out, depth, &format!("[...{accessor}].length < {n}"), context, suffix),
            Check::MaxLength(n) => throw(out, depth, &format!("[...{accessor}].length > {n}"), context, suffix),
            Check::Pattern(pattern) => throw(
                out,
                depth,
                &format!("!/^(?:{})$/u.test({accessor})", regex_literal_body(pattern)),
                context,
                suffix,
            ),
            Check::Minimum(n) => throw(out, depth, &format!("{accessor} < {n}"), context, suffix),
            Check::Maximum(n) => throw(out, depth, &format!("{accessor} > {n}"), context, suffix),
            Check::Delegate(name) => line(out, depth, &format!("{}({accessor});", validator_name(name))),
            Check::Each(item) => {
                let entry = entry_name(accessor);
                line(out, depth, &format!("for (const {entry} of {accessor}) {{"));
                render_checks(out, depth + 1, context, &entry, item);
                line(out, depth, "}");
            }
        }
    }

    if plan.nullable {
        line(out, depth - 1, "}");
    }
}

fn generate_types(out: &mut String, registry: &Registry) {
    let schema = registry.schema();
    for def in registry.resolved_types().iter() {
        out.push('\n');
        if let TypeDefKind::Scalar(scalar) = &def.kind {
            line(out, 0, &format!("export type {} = {};", def.name, ts_type(schema, scalar)));
            continue;
        }
        if def.subfields().is_empty() {
            line(out, 0, &format!("export type {} = object;", interface_name(&def.name)));
            continue;
        }
        line(out, 0, &format!("export interface {} {{", interface_name(&def.name)));
        for (name, field) in def.subfields() {
            let mut ty = ts_type(schema, field);
            if field.nullable {
                ty.push_str(" | null");
            }
            line(out, 1, &format!("{name}: {ty};"));
        }
        line(out, 0, "}");
    }
}

fn generate_validators(out: &mut String, registry: &Registry) {
    let schema = registry.schema();
    for def in registry.resolved_types().iter() {
        let plan = TypePlan::for_def(schema, def);
        out.push('\n');
        match &def.kind {
            TypeDefKind::Record(_) => {
                line(
                    out,
                    0,
                    &format!(
                        "function {}(data: {}): void {{",
                        validator_name(&def.name),
                        interface_name(&def.name)
                    ),
                );
                throw(out, 1, "data === undefined || data === null", &def.name, NULL_MESSAGE);
                for field in &plan.fields {
                    let name = field.field.as_deref().unwrap_or_default();
                    render_checks(out, 1, &field.context, &format!("data.{name}"), &field.plan);
                }
            }
            TypeDefKind::Scalar(scalar) => {
                line(
                    out,
                    0,
                    &format!(
                        "function {}(data?: {} | null): void {{",
                        validator_name(&def.name),
                        def.name
                    ),
                );
                for field in &plan.fields {
                    render_checks(out, 1, &field.context, "data", &field.plan);
                }
            }
        }
        line(out, 0, "}");
    }
}

fn ts_param_type(ty: ParamType) -> &'static str {
    match ty {
        ParamType::Str => "string",
        ParamType::Int => "number",
    }
}

fn return_type(endpoint: &Endpoint) -> String {
    match &endpoint.response {
        Response::Json(ty) => interface_name(ty),
        Response::File => STREAM_TYPE.to_string(),
    }
}

/// The expression that performs the request.
fn call_expression(method: Method, endpoint: &Endpoint, url: &str) -> String {
    let download = matches!(endpoint.response, Response::File);
    match (method, &endpoint.body, download) {
        (Method::Get, None, false) => format!("doGet({url})"),
        (Method::Get, None, true) => format!("doGetFile({url})"),
        (Method::Delete, None, false) => format!("doDelete({url})"),
        (Method::Post, Some(Body::Json(_)), false) => format!("doPost({url}, body)"),
        (Method::Put, Some(Body::Json(_)), false) => format!("doPut({url}, body)"),
        (Method::Patch, Some(Body::Json(_)), false) => format!("doPatch({url}, body)"),
        (Method::Post, Some(Body::Files), false) => format!("doPostFiles({url}, files)"),
        (method, body, download) => {
            let payload = match body {
                Some(Body::Json(_)) => ", JSON.stringify(body)",
                Some(Body::Files) => ", toFormData(files)",
                None => "",
            };
            let read = if download { "r.body" } else { "r.json()" };
            format!(
                "doFetch({}, {url}{payload}).then((r) => {read})",
                quoted(method.as_str())
            )
        }
    }
}

fn render_stub(out: &mut String, route: &Route, method: Method, endpoint: &Endpoint) {
    let mut params: Vec<String> = route
        .path
        .params()
        .iter()
        .map(|p| format!("{}: {}", to_camel_case(&p.name), ts_param_type(p.ty)))
        .collect();
    match &endpoint.body {
        Some(Body::Json(ty)) => params.push(format!("body: {}", interface_name(ty))),
        Some(Body::Files) => params.push("files: File[]".to_string()),
        None => {}
    }
    let url = format!(
        "`{}`",
        route
            .path
            .render(|p| format!("${{encodeURIComponent({})}}", to_camel_case(&p.name)))
    );
    let ret = return_type(endpoint);

    out.push('\n');
    line(
        out,
        0,
        &format!(
            "export async function {}({}): Promise<{ret}> {{",
            endpoint.operation,
            params.join(", ")
        ),
    );
    if let Some(Body::Json(ty)) = &endpoint.body {
        line(out, 1, &format!("{}(body);", validator_name(ty)));
    }
    line(
        out,
        1,
        &format!(
            "const result = (await {}) as {ret};",
            call_expression(method, endpoint, &url)
        ),
    );
    if let Response::Json(ty) = &endpoint.response {
        line(out, 1, &format!("{}(result);", validator_name(ty)));
    }
    line(out, 1, "return result;");
    line(out, 0, "}");
}

pub(crate) fn generate_client(registry: &Registry) -> String {
    let mut out = String::from(HEADER);
    generate_types(&mut out, registry);
    generate_validators(&mut out, registry);
    for (route, method, endpoint) in registry.endpoints() {
        render_stub(&mut out, route, method, endpoint);
    }
    out.push('\n');
    out.push_str(RUNTIME_TS);

    debug!(
        types = registry.resolved_types().len(),
        stubs = registry.endpoints().count(),
        "generated client"
    );
    out
}
