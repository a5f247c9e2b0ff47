//! Validation plans shared by the server and client emitters.
//!
//! Each field is lowered once into a [`Plan`]; both emitters render that same
//! plan in their own language, so their constraint sets cannot drift apart.
//! [`validate`] interprets a plan directly against JSON and is the reference
//! for what both renderings accept.
//!
//! Absent and `null` are treated alike: a non-nullable field reports
//! `<Type.field> is null`, a nullable one skips its remaining checks.

use apigen_schema::{Field, Kind, Schema, TypeDef, TypeDefKind};
use serde_json::Value;
use std::fmt;

/// A numeric bound, kept in its declared kind for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            Number::Float(n) => write!(f, "{n:?}"),
        }
    }
}

/// One rule applied to a present value.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    MinLength(usize),
    MaxLength(usize),
    /// Whole-string match.
    Pattern(String),
    Minimum(Number),
    Maximum(Number),
    /// Run the named record's validator.
    Delegate(String),
    /// Apply a plan to every element.
    Each(Box<Plan>),
}

impl Check {
    /// Message suffix reported when the rule fails. `None` for rules whose
    /// failures are reported by the delegate or element plan.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Check::MinLength(_) => Some("is too short"),
            Check::MaxLength(_) => Some("is too long"),
            Check::Pattern(_) => Some("has an invalid format"),
            Check::Minimum(_) => Some("has a value below minimum"),
            Check::Maximum(_) => Some("has a value above maximum"),
            Check::Delegate(_) | Check::Each(_) => None,
        }
    }
}

pub const NULL_MESSAGE: &str = "is null";

/// Everything to check for one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Null skips `checks` instead of failing.
    pub nullable: bool,
    pub checks: Vec<Check>,
}

impl Plan {
    pub fn for_field(schema: &Schema, field: &Field) -> Self {
        Self {
            nullable: field.nullable,
            checks: checks_for(schema, &field.kind),
        }
    }

    /// True when a nullable value has nothing left to check once present.
    pub fn is_noop(&self) -> bool {
        self.nullable && self.checks.is_empty()
    }
}

fn checks_for(schema: &Schema, kind: &Kind) -> Vec<Check> {
    let mut checks = Vec::new();
    match kind {
        Kind::String(rules) => {
            checks.extend(rules.min_length.map(Check::MinLength));
            checks.extend(rules.max_length.map(Check::MaxLength));
            checks.extend(rules.pattern.clone().map(Check::Pattern));
        }
        Kind::Integer(bounds) => {
            checks.extend(bounds.min.map(|n| Check::Minimum(Number::Int(n))));
            checks.extend(bounds.max.map(|n| Check::Maximum(Number::Int(n))));
        }
        Kind::Float(bounds) => {
            checks.extend(bounds.min.map(|n| Check::Minimum(Number::Float(n))));
            checks.extend(bounds.max.map(|n| Check::Maximum(Number::Float(n))));
        }
        Kind::Boolean => {}
        Kind::Array(items) => {
            let item = Plan::for_field(schema, items);
            if !item.is_noop() {
                checks.push(Check::Each(Box::new(item)));
            }
        }
        // Named scalars are inlined so failures name the field, not the alias.
        Kind::Ref(name) => match schema.get(name).map(|def| &def.kind) {
            Some(TypeDefKind::Record(_)) => checks.push(Check::Delegate(name.clone())),
            Some(TypeDefKind::Scalar(field)) => checks = checks_for(schema, &field.kind),
            None => {}
        },
    }
    checks
}

/// The plan of every field of a record, or the single plan of a named
/// scalar, each with the context its messages are reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct TypePlan {
    pub name: String,
    pub fields: Vec<FieldPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    /// Record field name; `None` for a named scalar's own value.
    pub field: Option<String>,
    /// `Type.field`, or `Type` for a named scalar.
    pub context: String,
    pub plan: Plan,
}

impl TypePlan {
    pub fn for_def(schema: &Schema, def: &TypeDef) -> Self {
        let fields = match &def.kind {
            TypeDefKind::Record(fields) => fields
                .iter()
                .map(|(name, field)| FieldPlan {
                    field: Some(name.clone()),
                    context: format!("{}.{}", def.name, name),
                    plan: Plan::for_field(schema, field),
                })
                .collect(),
            TypeDefKind::Scalar(field) => vec![FieldPlan {
                field: None,
                context: def.name.clone(),
                plan: Plan::for_field(schema, field),
            }],
        };
        Self {
            name: def.name.clone(),
            fields,
        }
    }
}

/// A failed check, carrying the same message generated code raises.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Violation {
    pub message: String,
}

fn violation(context: &str, suffix: &str) -> Violation {
    Violation {
        message: format!("{context} {suffix}"),
    }
}

/// Validate a JSON value against a named definition.
///
/// Assumes the value is well typed: a string where the schema says string,
/// and so on. Type mismatches are not rules of their own.
pub fn validate(schema: &Schema, type_name: &str, value: &Value) -> Result<(), Violation> {
    let Some(def) = schema.get(type_name) else {
        return Err(violation(type_name, "is not a known type"));
    };
    let plan = TypePlan::for_def(schema, def);
    match &def.kind {
        TypeDefKind::Record(_) => {
            if value.is_null() {
                return Err(violation(&def.name, NULL_MESSAGE));
            }
            for field in &plan.fields {
                let member = field.field.as_deref().and_then(|name| value.get(name));
                check_value(schema, &field.context, &field.plan, member)?;
            }
            Ok(())
        }
        TypeDefKind::Scalar(_) => match plan.fields.first() {
            Some(field) => check_value(schema, &field.context, &field.plan, Some(value)),
            None => Ok(()),
        },
    }
}

/// Apply one plan. `None` means the value is absent.
pub fn check_value(
    schema: &Schema,
    context: &str,
    plan: &Plan,
    value: Option<&Value>,
) -> Result<(), Violation> {
    let value = match value {
        None | Some(Value::Null) if plan.nullable => return Ok(()),
        None | Some(Value::Null) => return Err(violation(context, NULL_MESSAGE)),
        Some(value) => value,
    };

    for check in &plan.checks {
        let failed = match check {
            Check::MinLength(n) => value.as_str().is_some_and(|s| s.chars().count() < *n),
            Check::MaxLength(n) => value.as_str().is_some_and(|s| s.chars().count() > *n),
            Check::Pattern(pattern) => match value.as_str() {
                Some(s) => !regex::Regex::new(&format!("^(?:{pattern})$"))
                    .map(|re| re.is_match(s))
                    .unwrap_or(false),
                None => false,
            },
            Check::Minimum(bound) => value.as_f64().is_some_and(|n| n < bound.as_f64()),
            Check::Maximum(bound) => value.as_f64().is_some_and(|n| n > bound.as_f64()),
            Check::Delegate(name) => {
                validate(schema, name, value)?;
                false
            }
            Check::Each(item) => {
                for element in value.as_array().into_iter().flatten() {
                    check_value(schema, context, item, Some(element))?;
                }
                false
            }
        };
        if failed {
            if let Some(suffix) = check.message() {
                return Err(violation(context, suffix));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .scalar("TagName", Field::string().min_length(1))
            .record(
                "Tag",
                vec![("id", Field::integer()), ("name", Field::reference("TagName"))],
            )
            .record(
                "CreateSessionRequest",
                vec![
                    ("description", Field::string().max_length(512)),
                    ("tags", Field::array(Field::integer())),
                    ("labels", Field::array(Field::reference("Tag"))),
                    ("score", Field::float().min(0).max_float(1.5).nullable()),
                ],
            );
        schema
    }

    #[test]
    fn plans_inline_named_scalars() {
        let schema = schema();
        let tag = TypePlan::for_def(&schema, schema.get("Tag").unwrap());
        assert_eq!(tag.fields[1].context, "Tag.name");
        assert_eq!(tag.fields[1].plan.checks, [Check::MinLength(1)]);
    }

    #[test]
    fn plans_delegate_records_inside_arrays() {
        let schema = schema();
        let plan = TypePlan::for_def(&schema, schema.get("CreateSessionRequest").unwrap());
        let labels = &plan.fields[2].plan;
        assert_eq!(
            labels.checks,
            [Check::Each(Box::new(Plan {
                nullable: false,
                checks: vec![Check::Delegate("Tag".into())],
            }))]
        );
    }

    #[test]
    fn accepts_valid_value() {
        let schema = schema();
        let value = json!({
            "description": "friday night",
            "tags": [1, 2],
            "labels": [{"id": 1, "name": "speedrun"}],
            "score": null,
        });
        assert_eq!(validate(&schema, "CreateSessionRequest", &value), Ok(()));
    }

    #[test]
    fn length_counts_code_points() {
        let schema = schema();
        let fits = json!({"description": "é".repeat(512), "tags": [], "labels": []});
        assert!(validate(&schema, "CreateSessionRequest", &fits).is_ok());

        let over = json!({"description": "x".repeat(513), "tags": [], "labels": []});
        assert_eq!(
            validate(&schema, "CreateSessionRequest", &over).unwrap_err().message,
            "CreateSessionRequest.description is too long"
        );
    }

    #[test]
    fn null_and_absent_are_the_same() {
        let schema = schema();
        let absent = json!({"tags": [], "labels": []});
        let null = json!({"description": null, "tags": [], "labels": []});
        for value in [absent, null] {
            assert_eq!(
                validate(&schema, "CreateSessionRequest", &value).unwrap_err().message,
                "CreateSessionRequest.description is null"
            );
        }
    }

    #[test]
    fn nullable_skips_other_checks() {
        let schema = schema();
        let value = json!({"description": "", "tags": [], "labels": [], "score": 2.0});
        assert_eq!(
            validate(&schema, "CreateSessionRequest", &value).unwrap_err().message,
            "CreateSessionRequest.score has a value above maximum"
        );
        let value = json!({"description": "", "tags": [], "labels": []});
        assert!(validate(&schema, "CreateSessionRequest", &value).is_ok());
    }

    #[test]
    fn array_elements_are_checked() {
        let schema = schema();
        let value = json!({"description": "", "tags": [1, null], "labels": []});
        assert_eq!(
            validate(&schema, "CreateSessionRequest", &value).unwrap_err().message,
            "CreateSessionRequest.tags is null"
        );

        let value = json!({"description": "", "tags": [], "labels": [{"id": 1, "name": ""}]});
        assert_eq!(
            validate(&schema, "CreateSessionRequest", &value).unwrap_err().message,
            "Tag.name is too short"
        );
    }

    #[test]
    fn scalars_validate_standalone() {
        let schema = schema();
        assert!(validate(&schema, "TagName", &json!("a")).is_ok());
        assert_eq!(
            validate(&schema, "TagName", &json!("")).unwrap_err().message,
            "TagName is too short"
        );
        assert_eq!(
            validate(&schema, "TagName", &Value::Null).unwrap_err().message,
            "TagName is null"
        );
    }

    #[test]
    fn unconstrained_nullable_elements_need_no_loop() {
        let schema = schema();
        let plan = Plan::for_field(&schema, &Field::array(Field::string().nullable()).nullable());
        assert!(plan.is_noop());
    }

    #[test]
    fn number_rendering() {
        assert_eq!(Number::Int(0).to_string(), "0");
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
    }
}
