//! Lookup of the built-in emitters.

use crate::traits::{Emitter, Target};

/// Every compiled-in emitter, in generation order.
pub fn emitters() -> Vec<&'static dyn Emitter> {
    let mut all: Vec<&'static dyn Emitter> = Vec::new();

    #[cfg(feature = "emitter-django")]
    all.push(&crate::server::DJANGO_EMITTER);

    #[cfg(feature = "emitter-typescript")]
    all.push(&crate::client::TYPESCRIPT_EMITTER);

    #[cfg(feature = "emitter-openapi")]
    all.push(&crate::openapi::OPENAPI_EMITTER);

    all
}

/// Get an emitter by name.
pub fn get_emitter(name: &str) -> Option<&'static dyn Emitter> {
    emitters().into_iter().find(|e| e.name() == name)
}

/// Get all emitters writing for a target.
pub fn emitters_for_target(target: Target) -> Vec<&'static dyn Emitter> {
    emitters()
        .into_iter()
        .filter(|e| e.target() == target)
        .collect()
}

pub fn emitter_names() -> Vec<&'static str> {
    emitters().iter().map(|e| e.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_lookup() {
        let names = emitter_names();
        assert!(!names.is_empty() || cfg!(not(feature = "default")));
        for name in names {
            assert_eq!(get_emitter(name).map(|e| e.name()), Some(name));
        }
        assert!(get_emitter("cobol").is_none());
    }

    #[cfg(feature = "default")]
    #[test]
    fn one_emitter_per_target() {
        for target in [Target::Server, Target::Client, Target::Description] {
            assert_eq!(emitters_for_target(target).len(), 1, "{}", target.as_str());
        }
    }
}
