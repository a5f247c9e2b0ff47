//! Snapshots of everything generated for the Haunted API.
//!
//! Run `cargo insta review` to update snapshots after intentional changes.

use apigen::api::haunted_registry;
use apigen_emit::{EmitOptions, OutputFile, get_emitter};

fn emit(emitter: &str) -> Vec<OutputFile> {
    let registry = haunted_registry().unwrap();
    get_emitter(emitter)
        .unwrap()
        .emit(&registry, &EmitOptions::default())
        .unwrap()
}

fn take(files: Vec<OutputFile>, path: &str) -> String {
    files
        .into_iter()
        .find(|f| f.path.to_str() == Some(path))
        .map(|f| f.contents)
        .unwrap()
}

#[test]
fn api_service() {
    let output = take(emit("typescript"), "ApiService.ts");
    insta::assert_snapshot!(output);
}

#[test]
fn viewmodels() {
    let output = take(emit("django"), "viewmodels.py");
    insta::assert_snapshot!(output);
}

#[test]
fn schemas() {
    let mut modules = 0;
    for file in emit("django") {
        let Ok(module) = file.path.strip_prefix("schemas") else {
            continue;
        };
        let name = module.file_stem().unwrap().to_string_lossy().into_owned();
        if name == "__init__" {
            continue;
        }
        insta::assert_snapshot!(format!("schemas_{name}"), file.contents);
        modules += 1;
    }
    assert_eq!(modules, 28);
}

#[test]
fn openapi() {
    let output = take(emit("openapi"), "openapi.json");
    insta::assert_snapshot!(output);
}
