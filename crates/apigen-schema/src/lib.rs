//! Schema model for API code generation.
//!
//! A [`Schema`] holds named records and named scalars built from the
//! [`Field`] algebra. [`resolve_all`] computes the sorted set of definitions
//! an API surface depends on; every emitter walks that same set.
//!
//! ```
//! use apigen_schema::{Field, Schema, resolve_all};
//!
//! let mut schema = Schema::new();
//! schema
//!     .record("Tag", vec![("id", Field::integer()), ("name", Field::string().min_length(1))])
//!     .record("TagsResponse", vec![("tags", Field::array(Field::reference("Tag")))]);
//! schema.check().unwrap();
//!
//! let resolved = resolve_all(&schema, ["TagsResponse"]).unwrap();
//! assert_eq!(resolved.names().collect::<Vec<_>>(), ["Tag", "TagsResponse"]);
//! ```

pub mod case;
pub mod field;
pub mod pattern;
pub mod resolve;
pub mod schema;

pub use field::{Bounds, Field, Kind, StringRules};
pub use resolve::{ResolvedTypes, resolve, resolve_all};
pub use schema::{MAX_SAFE_INTEGER, Schema, SchemaError, TypeDef, TypeDefKind};
