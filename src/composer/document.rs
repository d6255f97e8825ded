use serde::{Deserialize, Serialize};

use crate::pass::PassRecord;

/// Header written in front of a pipeline's pass records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Format version.
    pub version: u32,
    /// What wrote the document.
    pub generator: String,
}

impl DocumentMetadata {
    /// Format version this crate writes.
    pub const VERSION: u32 = 1;

    /// Metadata for a document written now.
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: Self::VERSION,
            generator: format!("postfx {}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Warn when the document comes from a newer format. Loading still
    /// proceeds; unknown fields end up in the pass params.
    pub(crate) fn check_version(&self) {
        if self.version > Self::VERSION {
            log::warn!(
                "pipeline document version {} is newer than supported version {} ({})",
                self.version,
                Self::VERSION,
                self.generator
            );
        }
    }
}

/// A whole pass chain in persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    /// Format header.
    pub metadata: DocumentMetadata,
    /// Pass records in execution order.
    pub passes: Vec<PassRecord>,
}
