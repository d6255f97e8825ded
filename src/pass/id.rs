use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-unique pass identifier.
///
/// Generated once when a pass is constructed and never changed afterwards.
/// Serializes as a hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassId(Uuid);

impl PassId {
    /// Allocate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_ids_are_distinct_and_non_empty() {
        let ids: HashSet<PassId> = (0..1000).map(|_| PassId::generate()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| !id.to_string().is_empty()));
    }

    #[test]
    fn parses_uppercase_ids_from_scene_files() {
        let id: PassId =
            serde_json::from_str("\"6F9619FF-8B86-D011-B42D-00C04FC964FF\"")
                .unwrap();
        assert_eq!(id.to_string(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
    }
}
