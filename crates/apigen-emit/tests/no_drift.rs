//! Server and client render the same rules with the same messages.

use apigen_emit::rules::TypePlan;
use apigen_emit::{Check, EmitOptions, OutputFile, Plan, emit_all, get_emitter, validate};
use apigen_registry::{Endpoint, Registry, RegistryBuilder};
use apigen_schema::case::{to_pascal_case, to_snake_case};
use apigen_schema::{Field, Schema};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::process::Command;

fn registry() -> Registry {
    let mut schema = Schema::new();
    schema
        .scalar(
            "IsoDateTime",
            Field::string().pattern(
                r"[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(\+[0-9]{2}:[0-9]{2}|Z)",
            ),
        )
        .record(
            "TimeSpan",
            vec![
                ("start", Field::reference("IsoDateTime")),
                ("end", Field::reference("IsoDateTime").nullable()),
            ],
        )
        .record(
            "CreateSessionRequest",
            vec![
                ("name", Field::string().min_length(1).max_length(64)),
                ("description", Field::string().max_length(512)),
                ("players", Field::integer().min(1).max(8)),
                ("rating", Field::float().min_float(0.5).max_float(5.0).nullable()),
                ("tags", Field::array(Field::string().min_length(1))),
                ("span", Field::reference("TimeSpan")),
                ("public", Field::boolean()),
            ],
        )
        .record(
            "SuccessResponse",
            vec![("success", Field::boolean()), ("message", Field::string().nullable())],
        );
    let mut builder = RegistryBuilder::new(schema);
    builder
        .register("/api/v0/sessions/create", "create_session")
        .post(Endpoint::new("createSession", "SuccessResponse").body("CreateSessionRequest"));
    builder.build().unwrap()
}

fn file<'a>(outputs: &'a [OutputFile], name: &str) -> &'a str {
    outputs
        .iter()
        .find(|f| f.path.to_str() == Some(name))
        .map(|f| f.contents.as_str())
        .unwrap()
}

/// Every Python module the server emitter writes, schemas first.
fn server_source(outputs: &[OutputFile]) -> String {
    let mut modules: Vec<&OutputFile> = outputs
        .iter()
        .filter(|f| f.path.starts_with("schemas"))
        .collect();
    modules.push(outputs.iter().find(|f| f.path.to_str() == Some("viewmodels.py")).unwrap());
    modules.iter().map(|f| f.contents.as_str()).collect()
}

fn messages(plan: &Plan, context: &str, out: &mut Vec<String>) {
    if !plan.nullable {
        out.push(format!("{context} is null"));
    }
    for check in &plan.checks {
        if let Some(suffix) = check.message() {
            out.push(format!("{context} {suffix}"));
        }
        if let Check::Each(item) = check {
            messages(item, context, out);
        }
    }
}

#[test]
fn every_message_appears_in_both_targets() {
    let registry = registry();
    let outputs: Vec<OutputFile> = emit_all(&registry, &EmitOptions::default())
        .unwrap()
        .into_iter()
        .flat_map(|(_, files)| files)
        .collect();
    let server = server_source(&outputs);
    let client = file(&outputs, "ApiService.ts");

    let mut expected = Vec::new();
    for def in registry.resolved_types().iter() {
        let plan = TypePlan::for_def(registry.schema(), def);
        if def.is_record() {
            expected.push(format!("{} is null", def.name));
        }
        for field in &plan.fields {
            messages(&field.plan, &field.context, &mut expected);
        }
    }
    assert!(expected.contains(&"TimeSpan.end has an invalid format".to_string()));
    assert!(expected.contains(&"CreateSessionRequest.rating has a value above maximum".to_string()));

    for message in &expected {
        let quoted = format!("\"{message}\"");
        assert_eq!(
            server.matches(&quoted).count(),
            client.matches(&quoted).count(),
            "{message}"
        );
        assert!(server.contains(&quoted), "server is missing {message}");
    }
}

#[test]
fn same_bounds_in_both_targets() {
    let registry = registry();
    let outputs: Vec<OutputFile> = emit_all(&registry, &EmitOptions::default())
        .unwrap()
        .into_iter()
        .flat_map(|(_, files)| files)
        .collect();
    let server = server_source(&outputs);
    let client = file(&outputs, "ApiService.ts");

    assert!(server.contains("if len(data.description) > 512:"));
    assert!(client.contains("if ([...data.description].length > 512) {"));
    assert!(server.contains("if data.players < 1:"));
    assert!(client.contains("if (data.players < 1) {"));
    assert!(server.contains("if data.rating > 5.0:"));
    assert!(client.contains("if (data.rating > 5.0) {"));

    let openapi: serde_json::Value = serde_json::from_str(file(&outputs, "openapi.json")).unwrap();
    let props = &openapi["components"]["schemas"]["CreateSessionRequest"]["properties"];
    assert_eq!(props["description"]["maxLength"], 512);
    assert_eq!(props["players"]["minimum"], 1);
    assert_eq!(props["rating"]["maximum"], 5.0);
}

#[test]
fn oversized_description_is_rejected_everywhere() {
    let registry = registry();
    let request = json!({
        "name": "friday",
        "description": "x".repeat(513),
        "players": 4,
        "tags": [],
        "span": {"start": "2024-01-01T20:00:00Z"},
        "public": true,
    });
    assert_eq!(
        validate(registry.schema(), "CreateSessionRequest", &request)
            .unwrap_err()
            .message,
        "CreateSessionRequest.description is too long"
    );

    let outputs: Vec<OutputFile> = emit_all(&registry, &EmitOptions::default())
        .unwrap()
        .into_iter()
        .flat_map(|(_, files)| files)
        .collect();

    // Server: validation answers 400 before the handler runs.
    let views = file(&outputs, "viewmodels.py");
    let validated = views.find("body.validate()").unwrap();
    let rejected = views.find("status=HTTPStatus.BAD_REQUEST)\n        return handler").unwrap();
    assert!(validated < rejected);

    // Client: the stub throws before the request is sent.
    let client = file(&outputs, "ApiService.ts");
    let stub = client.find("export async function createSession(").unwrap();
    let stub = &client[stub..];
    let checked = stub.find("validateCreateSessionRequest(body);").unwrap();
    let sent = stub.find("doPost(").unwrap();
    assert!(checked < sent);
}

#[test]
fn valid_request_passes() {
    let registry = registry();
    let request = json!({
        "name": "friday",
        "description": "é".repeat(512),
        "players": 8,
        "rating": null,
        "tags": ["casual"],
        "span": {"start": "2024-01-01T20:00:00.5+02:00", "end": null},
        "public": false,
    });
    assert_eq!(validate(registry.schema(), "CreateSessionRequest", &request), Ok(()));

    let bad_time = json!({
        "name": "friday",
        "description": "",
        "players": 2,
        "tags": [],
        "span": {"start": "2024-01-01T20:00:00Z", "end": "tomorrow"},
        "public": false,
    });
    assert_eq!(
        validate(registry.schema(), "CreateSessionRequest", &bad_time)
            .unwrap_err()
            .message,
        "TimeSpan.end has an invalid format"
    );
}

/// Values on either side of every rule in the registry above.
fn boundary_cases() -> Vec<(&'static str, Value)> {
    let request = json!({
        "name": "friday",
        "description": "",
        "players": 4,
        "tags": ["casual"],
        "span": {"start": "2024-01-01T20:00:00Z"},
        "public": true,
    });
    let with = |key: &str, value: Value| {
        let mut request = request.clone();
        request[key] = value;
        request
    };
    let without = |key: &str| {
        let mut request = request.clone();
        request.as_object_mut().unwrap().remove(key);
        request
    };
    let span = |start: &str| with("span", json!({"start": start}));

    vec![
        ("CreateSessionRequest", request.clone()),
        ("CreateSessionRequest", Value::Null),
        ("CreateSessionRequest", with("name", json!(""))),
        ("CreateSessionRequest", with("name", json!("😀".repeat(64)))),
        ("CreateSessionRequest", with("name", json!("😀".repeat(65)))),
        ("CreateSessionRequest", with("description", json!("é".repeat(512)))),
        ("CreateSessionRequest", with("description", json!("x".repeat(513)))),
        ("CreateSessionRequest", with("players", json!(0))),
        ("CreateSessionRequest", with("players", json!(8))),
        ("CreateSessionRequest", with("players", json!(9))),
        ("CreateSessionRequest", with("rating", json!(0.4))),
        ("CreateSessionRequest", with("rating", json!(5.0))),
        ("CreateSessionRequest", with("rating", json!(5.5))),
        ("CreateSessionRequest", with("rating", Value::Null)),
        ("CreateSessionRequest", with("tags", json!([]))),
        ("CreateSessionRequest", with("tags", json!(["ok", ""]))),
        ("CreateSessionRequest", with("tags", json!(["ok", null]))),
        ("CreateSessionRequest", without("name")),
        ("CreateSessionRequest", without("span")),
        ("CreateSessionRequest", without("public")),
        ("CreateSessionRequest", span("2024-01-01T20:00:00.125+02:00")),
        ("CreateSessionRequest", span("٢٠٢٤-01-01T20:00:00Z")),
        ("CreateSessionRequest", span("2024-01-01T20:00:0𝟘Z")),
        ("CreateSessionRequest", span("2024-01-01T20:00:00Z\n")),
        ("CreateSessionRequest", span("2024-01-01 20:00:00Z")),
        ("TimeSpan", json!({"start": "2024-01-01T20:00:00Z", "end": null})),
        ("TimeSpan", json!({"start": "2024-01-01T20:00:00Z", "end": "soon"})),
        ("TimeSpan", json!({"end": "2024-01-01T20:00:00Z"})),
        ("SuccessResponse", json!({"success": false})),
        ("SuccessResponse", json!({"success": true, "message": null})),
        ("SuccessResponse", json!({"message": "done"})),
    ]
}

fn verdicts(registry: &Registry, cases: &[(&str, Value)]) -> Vec<String> {
    cases
        .iter()
        .map(|(ty, value)| match validate(registry.schema(), ty, value) {
            Ok(()) => "ok".to_string(),
            Err(violation) => violation.message,
        })
        .collect()
}

fn available(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .output()
        .is_ok_and(|out| out.status.success())
}

fn run(program: &str, args: &[&Path]) -> Vec<String> {
    let out = Command::new(program).args(args).output().unwrap();
    assert!(
        out.status.success(),
        "{program} failed:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap()
}

fn write_outputs(root: &Path, files: &[OutputFile]) {
    for file in files {
        let path = root.join(&file.path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, &file.contents).unwrap();
    }
}

const PYTHON_RUNNER: &str = r#"import importlib
import json
import sys

sys.path.insert(0, sys.argv[1])
from gen.error import SchemaValidationError


class Value:
    def __init__(self, fields):
        self.__dict__.update(fields)

    def __getattr__(self, name):
        return None


results = []
with open(sys.argv[2], encoding="utf-8") as f:
    cases = json.load(f)
for type_name, validator, text in cases:
    module = importlib.import_module("gen.schemas." + type_name)
    try:
        getattr(module, validator)(json.loads(text, object_hook=Value))
        results.append("ok")
    except SchemaValidationError as e:
        results.append(str(e))
print(json.dumps(results))
"#;

const NODE_RUNNER: &str = r#"
const fs = require("fs");
const results = [];
for (const [validator, text] of JSON.parse(fs.readFileSync(process.argv[2], "utf8"))) {
  try {
    eval(validator)(JSON.parse(text));
    results.push("ok");
  } catch (e) {
    if (!(e instanceof SchemaValidationError)) throw e;
    results.push(e.message);
  }
}
console.log(JSON.stringify(results));
"#;

/// The validator functions of `ApiService.ts`, with their signatures
/// stripped to plain JavaScript.
fn client_validators(client: &str) -> String {
    let mut out = String::from("class SchemaValidationError extends Error {}\n");
    let mut inside = false;
    for line in client.lines() {
        if let Some(rest) = line.strip_prefix("function validate") {
            let name = &rest[..rest.find('(').unwrap()];
            out.push_str(&format!("function validate{name}(data) {{\n"));
            inside = true;
        } else if inside {
            out.push_str(line);
            out.push('\n');
            inside = line != "}";
        }
    }
    out
}

#[test]
fn boundary_values_get_the_same_verdict() {
    let registry = registry();
    let cases = boundary_cases();
    let expected = verdicts(&registry, &cases);

    // The table must exercise failures of every rule kind, not only passes.
    for verdict in [
        "ok",
        "CreateSessionRequest is null",
        "CreateSessionRequest.name is too short",
        "CreateSessionRequest.name is too long",
        "CreateSessionRequest.players has a value below minimum",
        "CreateSessionRequest.rating has a value above maximum",
        "CreateSessionRequest.tags is null",
        "TimeSpan.start has an invalid format",
        "TimeSpan.start is null",
    ] {
        assert!(expected.iter().any(|v| v == verdict), "no case yields {verdict}");
    }
    assert_eq!(expected[3], "ok", "64 astral characters fit in 64");
    assert_eq!(expected[21], "TimeSpan.start has an invalid format");

    let dir = tempfile::tempdir().unwrap();
    let options = EmitOptions::default();

    if available("python3", &["-c", "import sys; sys.exit(sys.version_info < (3, 10))"]) {
        let root = dir.path().join("python");
        let server = get_emitter("django").unwrap().emit(&registry, &options).unwrap();
        write_outputs(&root.join("gen"), &server);
        fs::write(root.join("gen/__init__.py"), "").unwrap();
        fs::create_dir_all(root.join("django")).unwrap();
        fs::write(root.join("django/__init__.py"), "").unwrap();
        fs::write(
            root.join("django/http.py"),
            "class HttpRequest: ...\nclass HttpResponseBase: ...\nclass JsonResponse(HttpResponseBase): ...\n",
        )
        .unwrap();
        fs::write(root.join("dataclasses_json.py"), "class DataClassJsonMixin: ...\n").unwrap();
        fs::write(root.join("run.py"), PYTHON_RUNNER).unwrap();

        let table: Vec<Value> = cases
            .iter()
            .map(|(ty, value)| {
                json!([ty, format!("validate_{}", to_snake_case(ty)), value.to_string()])
            })
            .collect();
        fs::write(root.join("cases.json"), Value::from(table).to_string()).unwrap();

        let actual = run("python3", &[&root.join("run.py"), &root, &root.join("cases.json")]);
        assert_eq!(actual, expected, "server validators disagree");
    } else {
        eprintln!("python3 >= 3.10 not found; server validators not executed");
    }

    if available("node", &["--version"]) {
        let root = dir.path().join("node");
        fs::create_dir_all(&root).unwrap();
        let client = get_emitter("typescript").unwrap().emit(&registry, &options).unwrap();
        let script = client_validators(&client[0].contents) + NODE_RUNNER;
        fs::write(root.join("run.cjs"), script).unwrap();

        let table: Vec<Value> = cases
            .iter()
            .map(|(ty, value)| json!([format!("validate{}", to_pascal_case(ty)), value.to_string()]))
            .collect();
        fs::write(root.join("cases.json"), Value::from(table).to_string()).unwrap();

        let actual = run("node", &[&root.join("run.cjs"), &root.join("cases.json")]);
        assert_eq!(actual, expected, "client validators disagree");
    } else {
        eprintln!("node not found; client validators not executed");
    }
}

#[test]
fn client_patterns_match_code_points() {
    let registry = registry();
    let client = get_emitter("typescript")
        .unwrap()
        .emit(&registry, &EmitOptions::default())
        .unwrap();
    let contents = &client[0].contents;
    assert!(contents.contains(r"(\+[0-9]{2}:[0-9]{2}|Z))$/u.test(data.start)"));
    assert!(!contents.contains(")$/.test("));
}
