//! Named type definitions.

use crate::case::is_identifier;
use crate::field::{Field, Kind};
use crate::pattern::check_portable;
use std::collections::HashSet;

/// Largest integer a JavaScript number holds exactly.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Errors found while checking a schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("type {0} is defined more than once")]
    DuplicateType(String),
    #[error("{owner} references unknown type {target}")]
    UnknownType { owner: String, target: String },
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("{owner}.{field} is declared twice")]
    DuplicateField { owner: String, field: String },
    #[error("named scalar {0} must alias a string, integer, float or boolean")]
    ScalarNotPrimitive(String),
    #[error("{context}: {reason}")]
    InvalidConstraint { context: String, reason: String },
}

/// A named definition: a record or a named scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeDefKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// Ordered fields. Order is kept for output stability only.
    Record(Vec<(String, Field)>),
    /// A constrained primitive with its own identity (e.g. an ISO timestamp).
    Scalar(Field),
}

impl TypeDef {
    pub fn is_record(&self) -> bool {
        matches!(self.kind, TypeDefKind::Record(_))
    }

    /// Record fields in declaration order; empty for scalars.
    pub fn subfields(&self) -> &[(String, Field)] {
        match &self.kind {
            TypeDefKind::Record(fields) => fields,
            TypeDefKind::Scalar(_) => &[],
        }
    }

    /// Whether this definition gets its own validator in generated code.
    /// Unconstrained scalars are inlined at every use instead.
    pub fn is_hoisted(&self, schema: &Schema) -> bool {
        match &self.kind {
            TypeDefKind::Record(_) => true,
            TypeDefKind::Scalar(field) => field.has_constraints(schema),
        }
    }
}

/// The table of named definitions, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    definitions: Vec<TypeDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, def: TypeDef) -> &mut Self {
        self.definitions.push(def);
        self
    }

    pub fn record<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (S, Field)>,
    ) -> &mut Self {
        self.add(TypeDef {
            name: name.into(),
            kind: TypeDefKind::Record(
                fields
                    .into_iter()
                    .map(|(name, field)| (name.into(), field))
                    .collect(),
            ),
        })
    }

    pub fn scalar(&mut self, name: impl Into<String>, field: Field) -> &mut Self {
        self.add(TypeDef {
            name: name.into(),
            kind: TypeDefKind::Scalar(field),
        })
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.definitions.iter().find(|def| def.name == name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &TypeDef> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check names, references and constraints. Returns the first problem.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for def in &self.definitions {
            if !is_identifier(&def.name) {
                return Err(SchemaError::InvalidIdentifier(def.name.clone()));
            }
            if !seen.insert(def.name.as_str()) {
                return Err(SchemaError::DuplicateType(def.name.clone()));
            }
        }

        for def in &self.definitions {
            match &def.kind {
                TypeDefKind::Scalar(field) => {
                    if matches!(field.kind, Kind::Array(_) | Kind::Ref(_)) {
                        return Err(SchemaError::ScalarNotPrimitive(def.name.clone()));
                    }
                    self.check_field(&def.name, &def.name, field)?;
                }
                TypeDefKind::Record(fields) => {
                    let mut names = HashSet::new();
                    for (name, field) in fields {
                        if !is_identifier(name) {
                            return Err(SchemaError::InvalidIdentifier(format!(
                                "{}.{}",
                                def.name, name
                            )));
                        }
                        if !names.insert(name.as_str()) {
                            return Err(SchemaError::DuplicateField {
                                owner: def.name.clone(),
                                field: name.clone(),
                            });
                        }
                        self.check_field(&def.name, &format!("{}.{}", def.name, name), field)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_field(&self, owner: &str, context: &str, field: &Field) -> Result<(), SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidConstraint {
            context: context.to_string(),
            reason,
        };
        match &field.kind {
            Kind::String(rules) => {
                if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
                    if min > max {
                        return Err(invalid(format!("min length {min} exceeds max length {max}")));
                    }
                }
                if let Some(pattern) = &rules.pattern {
                    if pattern.contains('\n') {
                        return Err(invalid("pattern spans multiple lines".to_string()));
                    }
                    check_portable(pattern).map_err(invalid)?;
                    regex::Regex::new(&format!("^(?:{pattern})$"))
                        .map_err(|e| invalid(format!("invalid pattern: {e}")))?;
                }
            }
            Kind::Integer(bounds) => {
                for value in [bounds.min, bounds.max].into_iter().flatten() {
                    if !(-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
                        return Err(invalid(format!(
                            "bound {value} is outside the exactly representable range"
                        )));
                    }
                }
                if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                    if min > max {
                        return Err(invalid(format!("minimum {min} exceeds maximum {max}")));
                    }
                }
            }
            Kind::Float(bounds) => {
                for value in [bounds.min, bounds.max].into_iter().flatten() {
                    if !value.is_finite() {
                        return Err(invalid(format!("bound {value} is not finite")));
                    }
                }
                if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                    if min > max {
                        return Err(invalid(format!("minimum {min} exceeds maximum {max}")));
                    }
                }
            }
            Kind::Boolean => {}
            Kind::Array(items) => self.check_field(owner, context, items)?,
            Kind::Ref(target) => {
                if self.get(target).is_none() {
                    return Err(SchemaError::UnknownType {
                        owner: owner.to_string(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
