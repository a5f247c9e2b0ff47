//! The field type algebra.
//!
//! A [`Field`] is a closed sum over scalar kinds, arrays, and references to
//! named definitions in a [`Schema`](crate::Schema). Records never embed
//! each other directly; they refer to one another by name, which lets them
//! nest and recurse without shared ownership.

use crate::schema::{Schema, TypeDefKind};

/// Length and pattern constraints on a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Must match the whole value.
    pub pattern: Option<String>,
}

impl StringRules {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none() && self.max_length.is_none() && self.pattern.is_none()
    }
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// The shape of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    String(StringRules),
    Integer(Bounds<i64>),
    Float(Bounds<f64>),
    Boolean,
    Array(Box<Field>),
    /// A named record or scalar declared in the schema.
    Ref(String),
}

/// A node in the schema type algebra.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub nullable: bool,
    pub kind: Kind,
}

impl Field {
    pub fn new(kind: Kind) -> Self {
        Self {
            nullable: false,
            kind,
        }
    }

    pub fn string() -> Self {
        Self::new(Kind::String(StringRules::default()))
    }

    pub fn integer() -> Self {
        Self::new(Kind::Integer(Bounds::default()))
    }

    pub fn float() -> Self {
        Self::new(Kind::Float(Bounds::default()))
    }

    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    pub fn array(items: Field) -> Self {
        Self::new(Kind::Array(Box::new(items)))
    }

    /// A field typed by a named definition (record or named scalar).
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(Kind::Ref(name.into()))
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Ignored unless this is a string field.
    pub fn min_length(mut self, n: usize) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.min_length = Some(n);
        }
        self
    }

    /// Ignored unless this is a string field.
    pub fn max_length(mut self, n: usize) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.max_length = Some(n);
        }
        self
    }

    /// Ignored unless this is a string field.
    pub fn pattern(mut self, regex: impl Into<String>) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.pattern = Some(regex.into());
        }
        self
    }

    /// Lower bound for integer and float fields.
    pub fn min(mut self, value: i64) -> Self {
        match &mut self.kind {
            Kind::Integer(bounds) => bounds.min = Some(value),
            Kind::Float(bounds) => bounds.min = Some(value as f64),
            _ => {}
        }
        self
    }

    /// Upper bound for integer and float fields.
    pub fn max(mut self, value: i64) -> Self {
        match &mut self.kind {
            Kind::Integer(bounds) => bounds.max = Some(value),
            Kind::Float(bounds) => bounds.max = Some(value as f64),
            _ => {}
        }
        self
    }

    /// Fractional lower bound; ignored unless this is a float field.
    pub fn min_float(mut self, value: f64) -> Self {
        if let Kind::Float(bounds) = &mut self.kind {
            bounds.min = Some(value);
        }
        self
    }

    /// Fractional upper bound; ignored unless this is a float field.
    pub fn max_float(mut self, value: f64) -> Self {
        if let Kind::Float(bounds) = &mut self.kind {
            bounds.max = Some(value);
        }
        self
    }

    /// True for built-in scalars and arrays of them: nothing here has a
    /// user-defined identity.
    pub fn is_pure_primitive(&self) -> bool {
        match &self.kind {
            Kind::String(_) | Kind::Integer(_) | Kind::Float(_) | Kind::Boolean => true,
            Kind::Array(items) => items.is_pure_primitive(),
            Kind::Ref(_) => false,
        }
    }

    /// Whether validating this field takes more than a null check.
    ///
    /// References to records always count: validating a record means running
    /// its own field-by-field checks. Unknown references count as
    /// unconstrained; [`Schema::check`] reports them separately.
    pub fn has_constraints(&self, schema: &Schema) -> bool {
        match &self.kind {
            Kind::String(rules) => !rules.is_empty(),
            Kind::Integer(bounds) => !bounds.is_empty(),
            Kind::Float(bounds) => !bounds.is_empty(),
            Kind::Boolean => false,
            Kind::Array(items) => items.has_constraints(schema),
            Kind::Ref(name) => match schema.get(name).map(|def| &def.kind) {
                Some(TypeDefKind::Record(_)) => true,
                Some(TypeDefKind::Scalar(field)) => field.has_constraints(schema),
                None => false,
            },
        }
    }

    /// The named definition this field points at, looking through arrays.
    pub fn referenced_type(&self) -> Option<&str> {
        match &self.kind {
            Kind::Array(items) => items.referenced_type(),
            Kind::Ref(name) => Some(name),
            _ => None,
        }
    }
}
