//! Dependency closure over named definitions.
//!
//! Starting from a root record, follow every field (looking through arrays)
//! to the definitions it names, breadth first, visiting each name once.
//! Unconstrained named scalars are inlined by the emitters and are not part
//! of the closure.

use crate::schema::{Schema, SchemaError, TypeDef};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// All definitions an API surface needs, sorted by name.
///
/// Built once per run and handed to every emitter, so each definition is
/// emitted exactly once and in the same order everywhere.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTypes<'a> {
    types: BTreeMap<&'a str, &'a TypeDef>,
}

impl<'a> ResolvedTypes<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a TypeDef> + '_ {
        self.types.values().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a TypeDef> + '_ {
        self.iter().filter(|def| def.is_record())
    }

    pub fn scalars(&self) -> impl Iterator<Item = &'a TypeDef> + '_ {
        self.iter().filter(|def| !def.is_record())
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.types.keys().copied()
    }

    pub fn get(&self, name: &str) -> Option<&'a TypeDef> {
        self.types.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Union in the closure of another root.
    pub fn extend(&mut self, schema: &'a Schema, root: &str) -> Result<(), SchemaError> {
        for name in resolve(schema, root)? {
            if let Some(def) = schema.get(name) {
                self.types.insert(name, def);
            }
        }
        Ok(())
    }
}

impl<'a> FromIterator<&'a TypeDef> for ResolvedTypes<'a> {
    fn from_iter<I: IntoIterator<Item = &'a TypeDef>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().map(|def| (def.name.as_str(), def)).collect(),
        }
    }
}

/// The set of definition names reachable from `root`, `root` included.
pub fn resolve<'a>(schema: &'a Schema, root: &str) -> Result<BTreeSet<&'a str>, SchemaError> {
    let root = schema.get(root).ok_or_else(|| SchemaError::UnknownType {
        owner: "<root>".to_string(),
        target: root.to_string(),
    })?;

    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::from([root]);
    while let Some(def) = queue.pop_front() {
        if !visited.insert(def.name.as_str()) {
            continue;
        }
        for (_, field) in def.subfields() {
            let Some(target) = field.referenced_type() else {
                continue;
            };
            if visited.contains(target) {
                continue;
            }
            let target_def = schema.get(target).ok_or_else(|| SchemaError::UnknownType {
                owner: def.name.clone(),
                target: target.to_string(),
            })?;
            if target_def.is_hoisted(schema) {
                queue.push_back(target_def);
            }
        }
    }
    Ok(visited)
}

/// Union of the closures of several roots.
pub fn resolve_all<'a, 'r>(
    schema: &'a Schema,
    roots: impl IntoIterator<Item = &'r str>,
) -> Result<ResolvedTypes<'a>, SchemaError> {
    let mut resolved = ResolvedTypes::default();
    for root in roots {
        resolved.extend(schema, root)?;
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .scalar("IsoDateTime", Field::string().pattern("[0-9]+"))
            .scalar("Note", Field::string())
            .record(
                "TimeSpan",
                vec![
                    ("start", Field::reference("IsoDateTime")),
                    ("end", Field::reference("IsoDateTime")),
                ],
            )
            .record("Tag", vec![("id", Field::integer()), ("note", Field::reference("Note"))])
            .record(
                "Session",
                vec![
                    ("tags", Field::array(Field::reference("Tag"))),
                    ("time", Field::reference("TimeSpan").nullable()),
                ],
            )
            .record("SessionsResponse", vec![("sessions", Field::array(Field::reference("Session")))])
            .record("TagsResponse", vec![("tags", Field::array(Field::reference("Tag")))])
            .record("Node", vec![("children", Field::array(Field::reference("Node")))])
            .record("Ping", vec![("pong", Field::reference("Pong").nullable())])
            .record("Pong", vec![("ping", Field::reference("Ping").nullable())]);
        schema
    }

    #[test]
    fn closure_follows_arrays_and_skips_plain_scalars() {
        let schema = schema();
        let names: Vec<_> = resolve(&schema, "SessionsResponse").unwrap().into_iter().collect();
        assert_eq!(
            names,
            ["IsoDateTime", "Session", "SessionsResponse", "Tag", "TimeSpan"]
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let schema = schema();
        assert_eq!(
            resolve(&schema, "Session").unwrap(),
            resolve(&schema, "Session").unwrap()
        );
    }

    #[test]
    fn recursive_records_terminate() {
        let schema = schema();
        assert_eq!(resolve(&schema, "Node").unwrap().len(), 1);
        let mutual: Vec<_> = resolve(&schema, "Ping").unwrap().into_iter().collect();
        assert_eq!(mutual, ["Ping", "Pong"]);
    }

    #[test]
    fn shared_types_appear_once_in_union() {
        let schema = schema();
        let forward = resolve_all(&schema, ["SessionsResponse", "TagsResponse"]).unwrap();
        let backward = resolve_all(&schema, ["TagsResponse", "SessionsResponse", "TagsResponse"]).unwrap();

        let names: Vec<_> = forward.names().collect();
        assert_eq!(names, backward.names().collect::<Vec<_>>());
        assert_eq!(names.iter().filter(|n| **n == "Tag").count(), 1);
        assert_eq!(forward.records().count(), 5);
        assert_eq!(forward.scalars().map(|d| d.name.as_str()).collect::<Vec<_>>(), ["IsoDateTime"]);
    }

    #[test]
    fn unknown_root_is_an_error() {
        let schema = schema();
        assert!(matches!(
            resolve(&schema, "Nope"),
            Err(SchemaError::UnknownType { target, .. }) if target == "Nope"
        ));
    }
}
