//! Names the generated modules already bind.
//!
//! Every identifier in the registry lands in Python and TypeScript source:
//! type names become classes, interfaces and aliases, fields become
//! dataclass attributes, path names become dispatcher classes, parameters
//! become arguments on both sides and operations become exported functions.
//! None of them may be a keyword of either language or shadow a name the
//! generated code uses itself.

use crate::error::RegistryError;
use apigen_schema::case::{to_camel_case, to_pascal_case, to_snake_case};
use apigen_schema::{Schema, TypeDefKind};
use std::collections::HashMap;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Reserved in strict-mode module code, plus names that cannot be bound there.
const TS_RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
    "with", "yield", "NaN", "Infinity",
];

/// Predefined type names a type alias cannot take.
const TS_TYPE_NAMES: &[&str] = &[
    "any", "bigint", "boolean", "never", "number", "object", "string", "symbol", "type", "unknown",
];

/// Module-level names and builtins used by `schemas/*.py` and `viewmodels.py`.
const SERVER_GLOBALS: &[&str] = &[
    "annotations", "re", "dataclass", "List", "Optional", "DataClassJsonMixin",
    "SchemaValidationError", "Validatable", "json", "logging", "Enum", "HTTPStatus", "Callable",
    "HttpRequest", "HttpResponseBase", "JsonResponse", "path", "MultiValueDict", "json_response",
    "raw_response", "HttpMethod", "str", "int", "float", "bool", "tuple", "len", "Exception",
];

/// Arguments and locals of generated dispatchers.
const SERVER_LOCALS: &[&str] = &[
    "request", "handler", "body", "cls", "e", "get_handler", "post_handler", "put_handler",
    "patch_handler", "delete_handler",
];

/// Attributes every generated dataclass already has.
const RECORD_MEMBERS: &[&str] = &[
    "validate", "to_dict", "from_dict", "to_json", "from_json", "schema", "dataclass_json_config",
];

/// Runtime helpers and globals `ApiService.ts` refers to.
const CLIENT_GLOBALS: &[&str] = &[
    "env", "getCookie", "getCsrfHeader", "doFetch", "doGet", "doGetFile", "doDelete", "doPost",
    "doPut", "doPatch", "toFormData", "doPostFiles", "SchemaValidationError",
    "encodeURIComponent", "decodeURIComponent", "JSON", "fetch", "Headers", "FormData",
    "document", "File", "ReadableStream", "Uint8Array", "Promise", "Error", "Response",
    "BodyInit",
];

/// Arguments and locals of generated client stubs.
const CLIENT_LOCALS: &[&str] = &["body", "files", "result"];

const PYTHON_KEYWORD: &str = "a Python keyword";
const TS_KEYWORD: &str = "a TypeScript reserved word";
const SERVER_NAME: &str = "a name the generated server code uses";
const CLIENT_NAME: &str = "a name the generated client code uses";
const VALIDATOR_NAME: &str = "a generated validator name";

fn clash(name: &str, lists: &[(&[&str], &'static str)]) -> Option<&'static str> {
    lists
        .iter()
        .find(|(list, _)| list.contains(&name))
        .map(|(_, reason)| *reason)
}

/// `validate_tag` in Python.
fn is_server_validator(name: &str) -> bool {
    name.starts_with("validate_")
}

/// `validateTag` in TypeScript.
fn is_client_validator(name: &str) -> bool {
    name.strip_prefix("validate")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

fn reserved(name: &str, clashes_with: &'static str) -> RegistryError {
    RegistryError::ReservedName {
        name: name.to_string(),
        clashes_with,
    }
}

/// Type and field names.
pub(crate) fn check_schema(schema: &Schema) -> Result<(), RegistryError> {
    // Validator names in each target, and module file names on
    // case-insensitive filesystems.
    let mut generated: [HashMap<String, &str>; 3] = Default::default();

    for def in schema.definitions() {
        let name = def.name.as_str();
        if let Some(reason) = clash(name, &[(PYTHON_KEYWORDS, PYTHON_KEYWORD), (SERVER_GLOBALS, SERVER_NAME)]) {
            return Err(reserved(name, reason));
        }
        if is_server_validator(name) {
            return Err(reserved(name, VALIDATOR_NAME));
        }
        let keys = [to_snake_case(name), to_pascal_case(name), name.to_lowercase()];
        for (seen, key) in generated.iter_mut().zip(keys) {
            if let Some(first) = seen.insert(key, name) {
                return Err(RegistryError::NameCollision {
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }

        match &def.kind {
            TypeDefKind::Scalar(_) => {
                // Exported as a type alias next to the `I<Record>` interfaces.
                if let Some(reason) = clash(
                    name,
                    &[
                        (TS_RESERVED, TS_KEYWORD),
                        (TS_TYPE_NAMES, TS_KEYWORD),
                        (CLIENT_GLOBALS, CLIENT_NAME),
                    ],
                ) {
                    return Err(reserved(name, reason));
                }
                if let Some(record) = name.strip_prefix('I') {
                    if schema.get(record).is_some_and(|d| d.is_record()) {
                        return Err(RegistryError::NameCollision {
                            first: record.to_string(),
                            second: name.to_string(),
                        });
                    }
                }
            }
            TypeDefKind::Record(fields) => {
                for (field, _) in fields {
                    let reason = clash(field, &[(PYTHON_KEYWORDS, PYTHON_KEYWORD), (RECORD_MEMBERS, SERVER_NAME)])
                        .or_else(|| field.starts_with("__").then_some(SERVER_NAME));
                    if let Some(reason) = reason {
                        return Err(reserved(&format!("{name}.{field}"), reason));
                    }
                }
            }
        }
    }
    Ok(())
}

/// A path's display name, which becomes its dispatcher class.
pub(crate) fn check_path_name(schema: &Schema, name: &str) -> Result<(), RegistryError> {
    let class = to_snake_case(name);
    if let Some(reason) = clash(&class, &[(PYTHON_KEYWORDS, PYTHON_KEYWORD), (SERVER_GLOBALS, SERVER_NAME)]) {
        return Err(reserved(name, reason));
    }
    if is_server_validator(&class) {
        return Err(reserved(name, VALIDATOR_NAME));
    }
    if schema.get(&class).is_some() {
        return Err(reserved(name, "a declared type"));
    }
    Ok(())
}

/// A path parameter, as a Python argument and as a TypeScript argument.
pub(crate) fn check_param(pattern: &str, param: &str) -> Result<(), RegistryError> {
    let server = to_snake_case(param);
    let client = to_camel_case(param);
    let reason = clash(
        &server,
        &[
            (PYTHON_KEYWORDS, PYTHON_KEYWORD),
            (SERVER_GLOBALS, SERVER_NAME),
            (SERVER_LOCALS, SERVER_NAME),
        ],
    )
    .or_else(|| {
        clash(
            &client,
            &[
                (TS_RESERVED, TS_KEYWORD),
                (CLIENT_GLOBALS, CLIENT_NAME),
                (CLIENT_LOCALS, CLIENT_NAME),
            ],
        )
    })
    .or_else(|| is_client_validator(&client).then_some(VALIDATOR_NAME));
    match reason {
        Some(clashes_with) => Err(RegistryError::ReservedParam {
            path: pattern.to_string(),
            param: param.to_string(),
            clashes_with,
        }),
        None => Ok(()),
    }
}

/// An operation name, which becomes an exported client function.
pub(crate) fn check_operation(operation: &str) -> Result<(), RegistryError> {
    if let Some(reason) = clash(operation, &[(TS_RESERVED, TS_KEYWORD), (CLIENT_GLOBALS, CLIENT_NAME)]) {
        return Err(reserved(operation, reason));
    }
    if is_client_validator(operation) {
        return Err(reserved(operation, VALIDATOR_NAME));
    }
    Ok(())
}
