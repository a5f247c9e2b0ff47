//! Django server emitter.
//!
//! Produces:
//! - `error.py` and `json_response.py`: fixed runtime support
//! - `schemas/<Type>.py`: one dataclass and its validator per resolved
//!   record, importing the records it refers to
//! - `viewmodels.py`: one validator per hoisted named scalar, and one
//!   dispatcher class per path exposing
//!   `wrap(*, get_handler=..., post_handler=...)`, which returns a Django
//!   `path(...)` entry

use crate::literal::quoted;
use crate::rules::{Check, NULL_MESSAGE, Plan, TypePlan};
use crate::traits::{EmitError, EmitOptions, Emitter, OutputFile, Target};
use apigen_registry::{Body, Endpoint, Method, ParamType, Registry, Response, Route};
use apigen_schema::case::to_snake_case;
use apigen_schema::{Field, Kind, Schema, TypeDef, TypeDefKind};
use std::collections::BTreeSet;
use tracing::debug;

const ERROR_PY: &str = include_str!("../data/django/error.py");
const JSON_RESPONSE_PY: &str = include_str!("../data/django/json_response.py");
const HEADER: &str = "# Generated by apigen. Do not edit.\n";
const INDENT: &str = "    ";

/// Emits Django dispatchers and dataclass validators.
#[derive(Debug, Clone, Copy, Default)]
pub struct DjangoEmitter;

/// Static instance for the emitter registry.
pub static DJANGO_EMITTER: DjangoEmitter = DjangoEmitter;

impl Emitter for DjangoEmitter {
    fn name(&self) -> &'static str {
        "django"
    }

    fn language(&self) -> &'static str {
        "python"
    }

    fn target(&self) -> Target {
        Target::Server
    }

    fn emit(&self, registry: &Registry, _options: &EmitOptions) -> Result<Vec<OutputFile>, EmitError> {
        let mut files = vec![
            OutputFile::new("error.py", ERROR_PY.to_string()),
            OutputFile::new("json_response.py", JSON_RESPONSE_PY.to_string()),
            OutputFile::new("schemas/__init__.py", HEADER.to_string()),
        ];
        for def in registry.resolved_types().records() {
            files.push(OutputFile::new(
                format!("schemas/{}.py", def.name),
                generate_record(registry.schema(), def),
            ));
        }
        files.push(OutputFile::new("viewmodels.py", generate_viewmodels(registry)));
        debug!(files = files.len(), "generated server modules");
        Ok(files)
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn validator_name(type_name: &str) -> String {
    format!("validate_{}", to_snake_case(type_name))
}

/// Python annotation for a field's wire value (before validation).
fn py_type(schema: &Schema, field: &Field) -> String {
    match &field.kind {
        Kind::String(_) => "str".to_string(),
        Kind::Integer(_) => "int".to_string(),
        Kind::Float(_) => "float".to_string(),
        Kind::Boolean => "bool".to_string(),
        Kind::Array(items) => format!("List[Optional[{}]]", py_type(schema, items)),
        Kind::Ref(name) => match schema.get(name).map(|def| &def.kind) {
            Some(TypeDefKind::Scalar(scalar)) => py_type(schema, scalar),
            _ => name.clone(),
        },
    }
}

fn raise(context: &str, suffix: &str) -> String {
    format!(
        "raise SchemaValidationError({})",
        quoted(&format!("{context} {suffix}"))
    )
}

fn fail_if(out: &mut String, depth: usize, condition: &str, context: &str, suffix: &str) {
    line(out, depth, &format!("if {condition}:"));
    line(out, depth + 1, &raise(context, suffix));
}

fn render_checks(out: &mut String, depth: usize, context: &str, accessor: &str, plan: &Plan) {
    if plan.is_noop() {
        return;
    }
    let mut depth = depth;
    if plan.nullable {
        line(out, depth, &format!("if {accessor} is not None:"));
        depth += 1;
    } else {
        fail_if(out, depth, &format!("{accessor} is None"), context, NULL_MESSAGE);
    }

    for check in &plan.checks {
        let suffix = check.message().unwrap_or_default();
        match check {
            Check::MinLength(n) => fail_if(out, depth, &format!("len({accessor}) < {n}"), context, suffix),
            Check::MaxLength(n) => fail_if(out, depth, &format!("len({accessor}) > {n}"), context, suffix),
            Check::Pattern(pattern) => fail_if(
                out,
                depth,
                &format!("not re.fullmatch({}, {accessor})", quoted(pattern)),
                context,
                suffix,
            ),
            Check::Minimum(n) => fail_if(out, depth, &format!("{accessor} < {n}"), context, suffix),
            Check::Maximum(n) => fail_if(out, depth, &format!("{accessor} > {n}"), context, suffix),
            Check::Delegate(name) => line(out, depth, &format!("{}({accessor})", validator_name(name))),
            Check::Each(item) => {
                let entry = format!("{}_entry", accessor.replace('.', "_"));
                line(out, depth, &format!("for {entry} in {accessor}:"));
                render_checks(out, depth + 1, context, &entry, item);
            }
        }
    }
}

/// Records a definition's fields refer to, looking through arrays.
fn referenced_records<'a>(schema: &Schema, def: &'a TypeDef) -> BTreeSet<&'a str> {
    def.subfields()
        .iter()
        .filter_map(|(_, field)| field.referenced_type())
        .filter(|name| *name != def.name && schema.get(name).is_some_and(TypeDef::is_record))
        .collect()
}

fn render_validator(out: &mut String, schema: &Schema, def: &TypeDef) {
    let plan = TypePlan::for_def(schema, def);
    match &def.kind {
        TypeDefKind::Record(_) => {
            out.push_str(&format!(
                "\n\ndef {}(data: Optional[{}]) -> None:\n",
                validator_name(&def.name),
                def.name
            ));
            fail_if(out, 1, "data is None", &def.name, NULL_MESSAGE);
            for field in &plan.fields {
                let name = field.field.as_deref().unwrap_or_default();
                render_checks(out, 1, &field.context, &format!("data.{name}"), &field.plan);
            }
        }
        TypeDefKind::Scalar(scalar) => {
            out.push_str(&format!(
                "\n\ndef {}(data: Optional[{}]) -> None:\n",
                validator_name(&def.name),
                py_type(schema, scalar)
            ));
            for field in &plan.fields {
                render_checks(out, 1, &field.context, "data", &field.plan);
            }
        }
    }
    line(out, 1, "return");
}

/// `schemas/<Type>.py` for one record.
fn generate_record(schema: &Schema, def: &TypeDef) -> String {
    let mut out = String::from(HEADER);
    out.push_str("from __future__ import annotations\n\n");
    out.push_str("import re\n");
    out.push_str("from dataclasses import dataclass\n");
    out.push_str("from typing import List, Optional\n\n");
    out.push_str("from dataclasses_json import DataClassJsonMixin\n\n");
    out.push_str("from ..error import SchemaValidationError\n");
    out.push_str("from ..json_response import Validatable\n");

    out.push_str("\n\n@dataclass(kw_only=True)\n");
    out.push_str(&format!("class {}(DataClassJsonMixin, Validatable):\n", def.name));
    for (name, field) in def.subfields() {
        line(
            &mut out,
            1,
            &format!("{name}: Optional[{}] = None", py_type(schema, field)),
        );
    }
    if !def.subfields().is_empty() {
        out.push('\n');
    }
    line(&mut out, 1, "def validate(self) -> None:");
    line(&mut out, 2, &format!("{}(self)", validator_name(&def.name)));

    render_validator(&mut out, schema, def);

    // Imported last so records can refer to each other in cycles.
    let referenced = referenced_records(schema, def);
    if !referenced.is_empty() {
        out.push_str("\n\n");
        for name in referenced {
            out.push_str(&format!(
                "from .{name} import {name}, {}  # noqa: E402\n",
                validator_name(name)
            ));
        }
    }
    out
}

fn py_param_type(ty: ParamType) -> &'static str {
    match ty {
        ParamType::Str => "str",
        ParamType::Int => "int",
    }
}

fn handler_type(route: &Route, endpoint: &Endpoint) -> String {
    let mut args = vec!["HttpRequest".to_string()];
    args.extend(route.path.params().iter().map(|p| py_param_type(p.ty).to_string()));
    match &endpoint.body {
        Some(Body::Json(ty)) => args.push(ty.clone()),
        Some(Body::Files) => args.push("MultiValueDict".to_string()),
        None => {}
    }
    let ret = match &endpoint.response {
        Response::Json(ty) => format!("{ty} | tuple[int, {ty}]"),
        Response::File => "HttpResponseBase".to_string(),
    };
    format!("Callable[[{}], {ret}]", args.join(", "))
}

fn django_route(route: &Route) -> String {
    let path = route
        .path
        .render(|p| format!("<{}:{}>", p.ty.tag(), to_snake_case(&p.name)));
    path.trim_start_matches('/').to_string()
}

fn render_route(out: &mut String, route: &Route) {
    let params: Vec<String> = route
        .path
        .params()
        .iter()
        .map(|p| to_snake_case(&p.name))
        .collect();
    let typed_params: String = route
        .path
        .params()
        .iter()
        .map(|p| format!(", {}: {}", to_snake_case(&p.name), py_param_type(p.ty)))
        .collect();
    let forwarded: String = params.iter().map(|p| format!(", {p}")).collect();

    out.push_str(&format!("\n\nclass {}:\n", to_snake_case(&route.path.name)));
    line(out, 1, &format!("path = {}", quoted(&django_route(route))));
    line(out, 1, &format!("name = {}", quoted(&route.path.name)));
    out.push('\n');

    line(out, 1, "@classmethod");
    line(out, 1, "def wrap(");
    line(out, 2, "cls,");
    line(out, 2, "*,");
    for (method, endpoint) in &route.methods {
        line(
            out,
            2,
            &format!("{}_handler: {},", method.lower(), handler_type(route, endpoint)),
        );
    }
    line(out, 1, "):");
    line(
        out,
        2,
        &format!("def dispatch(request: HttpRequest{typed_params}) -> HttpResponseBase:"),
    );
    for (method, _) in &route.methods {
        line(
            out,
            3,
            &format!("if request.method == HttpMethod.{}.value:", method.as_str()),
        );
        line(
            out,
            4,
            &format!(
                "return cls.do_{}(request, {}_handler{forwarded})",
                method.lower(),
                method.lower()
            ),
        );
    }
    line(
        out,
        3,
        "return JsonResponse(data={}, status=HTTPStatus.METHOD_NOT_ALLOWED)",
    );
    out.push('\n');
    line(out, 2, "return path(cls.path, dispatch, name=cls.name)");

    for (method, endpoint) in &route.methods {
        render_method(out, route, *method, endpoint, &typed_params, &forwarded);
    }
}

fn render_method(
    out: &mut String,
    route: &Route,
    method: Method,
    endpoint: &Endpoint,
    typed_params: &str,
    forwarded: &str,
) {
    let decorator = match endpoint.response {
        Response::Json(_) => "@json_response",
        Response::File => "@raw_response",
    };
    out.push('\n');
    line(out, 1, "@staticmethod");
    line(out, 1, decorator);
    line(
        out,
        1,
        &format!(
            "def do_{}(request: HttpRequest, handler: {}{typed_params}):",
            method.lower(),
            handler_type(route, endpoint)
        ),
    );
    match &endpoint.body {
        None => line(out, 2, &format!("return handler(request{forwarded})")),
        Some(Body::Files) => line(out, 2, &format!("return handler(request{forwarded}, request.FILES)")),
        Some(Body::Json(ty)) => {
            line(out, 2, "try:");
            line(out, 3, &format!("body = {ty}.from_dict(json.loads(request.body))"));
            line(out, 2, "except Exception:");
            line(out, 3, "logging.warning(\"request decoding failed\", exc_info=True)");
            line(
                out,
                3,
                &format!(
                    "return JsonResponse(data={{\"message\": {}}}, status=HTTPStatus.BAD_REQUEST)",
                    quoted(&format!("{ty} could not be decoded"))
                ),
            );
            line(out, 2, "try:");
            line(out, 3, "body.validate()");
            line(out, 2, "except SchemaValidationError as e:");
            line(out, 3, "logging.warning(\"request validation failed: %s\", e)");
            line(
                out,
                3,
                "return JsonResponse(data={\"message\": str(e)}, status=HTTPStatus.BAD_REQUEST)",
            );
            line(out, 2, &format!("return handler(request{forwarded}, body)"));
        }
    }
}

fn generate_viewmodels(registry: &Registry) -> String {
    let schema = registry.schema();
    let mut imported: BTreeSet<&str> = BTreeSet::new();
    for (_, _, endpoint) in registry.endpoints() {
        imported.extend(endpoint.body_type());
        imported.extend(endpoint.response_type());
    }
    let resolved = registry.resolved_types();
    let scalars: Vec<&TypeDef> = resolved.iter().filter(|def| !def.is_record()).collect();

    let mut out = String::from(HEADER);
    out.push_str("import json\n");
    out.push_str("import logging\n");
    if !scalars.is_empty() {
        out.push_str("import re\n");
    }
    out.push_str("from enum import Enum\n");
    out.push_str("from http import HTTPStatus\n");
    if scalars.is_empty() {
        out.push_str("from typing import Callable\n\n");
    } else {
        out.push_str("from typing import Callable, Optional\n\n");
    }
    out.push_str("from django.http import HttpRequest, HttpResponseBase, JsonResponse\n");
    out.push_str("from django.urls import path\n");
    if registry.has_uploads() {
        out.push_str("from django.utils.datastructures import MultiValueDict\n");
    }
    out.push('\n');
    out.push_str("from .error import SchemaValidationError\n");
    out.push_str("from .json_response import json_response, raw_response\n");
    for name in &imported {
        out.push_str(&format!("from .schemas.{name} import {name}\n"));
    }

    out.push_str("\n\nclass HttpMethod(Enum):\n");
    for method in Method::ALL {
        line(&mut out, 1, &format!("{0} = \"{0}\"", method.as_str()));
    }

    for def in &scalars {
        render_validator(&mut out, schema, def);
    }

    for route in registry.routes() {
        render_route(&mut out, route);
    }

    debug!(routes = registry.routes().len(), "generated server dispatchers");
    out
}
