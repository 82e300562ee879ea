//! Deterministic blank node label allocation

use crate::BlankId;

/// Allocates blank node labels `<prefix>0`, `<prefix>1`, ... in call order
///
/// A namer is an explicit per-run value: each conversion creates its own, so
/// labels are deterministic for a given input and never shared across runs.
#[derive(Clone, Debug)]
pub struct BlankNodeNamer {
    prefix: String,
    counter: u64,
}

impl BlankNodeNamer {
    /// Create a namer with the given label prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Allocate the next label
    pub fn next_id(&mut self) -> BlankId {
        let id = BlankId::new(format!("{}{}", self.prefix, self.counter));
        self.counter += 1;
        id
    }

    /// Number of labels allocated so far
    pub fn issued(&self) -> u64 {
        self.counter
    }
}

impl Default for BlankNodeNamer {
    fn default() -> Self {
        Self::new("t")
    }
}
