//! Identifier generation.
//!
//! The rewriter only needs "a new unique string on every call". The default
//! [`UuidV7Generator`] produces time-ordered UUIDv7 values, so rows inserted
//! later sort after rows inserted earlier.

use uuid::Uuid;

/// Source of fresh identifiers.
///
/// Implementations must be safe to call concurrently and must never return
/// the same value twice.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier.
    fn generate(&self) -> String;
}

/// Default generator: hyphenated lowercase UUIDv7 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> String {
        Uuid::now_v7().hyphenated().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generates_version_7_uuids() {
        let id = UuidV7Generator.generate();
        let parsed = Uuid::parse_str(&id).expect("valid uuid");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
        // Third group starts with the version nibble.
        assert!(id.split('-').nth(2).expect("third group").starts_with('7'));
    }

    #[test]
    fn generated_ids_are_unique_and_ordered() {
        let ids: Vec<String> = (0..1_000).map(|_| UuidV7Generator.generate()).collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn closures_are_generators() {
        let fixed = || "fixed".to_string();
        assert_eq!(fixed.generate(), "fixed");
    }
}
