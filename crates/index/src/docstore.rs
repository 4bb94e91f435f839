use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A unit of retrievable text with its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
}

/// Id to text mapping for every indexed chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Docstore {
    entries: HashMap<String, String>,
}

impl Docstore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chunk; returns false (and keeps the old text) if the id is taken.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) -> bool {
        match self.entries.entry(id.into()) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(slot) => {
                slot.insert(text.into());
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
