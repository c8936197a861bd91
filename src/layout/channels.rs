//! Incremental channel index/name bookkeeping.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::LayoutError;

/// Mapping from zero-based channel index to optional channel name,
/// built incrementally while scanning filenames.
///
/// Names are authoritative: once a name is paired with an index, seeing the
/// same name with a different index is a fatal conflict. Filenames that
/// carry only a name get the next unused index assigned on first sighting
/// and reuse it afterwards.
#[derive(Debug, Default, Clone)]
pub struct ChannelMap {
    by_index: BTreeMap<u32, Option<String>>,
    by_name: HashMap<String, u32>,
    next_auto: u32,
}

impl ChannelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one filename's channel information and return the channel
    /// index the file's planes belong to (`None` when the filename carries
    /// no channel information at all).
    pub fn observe(
        &mut self,
        index: Option<u32>,
        name: Option<&str>,
    ) -> Result<Option<u32>, LayoutError> {
        match (index, name) {
            (Some(index), Some(name)) => {
                if let Some(&existing) = self.by_name.get(name) {
                    if existing != index {
                        return Err(LayoutError::ChannelConflict {
                            name: name.to_string(),
                            first: existing,
                            second: index,
                        });
                    }
                }
                self.by_index.insert(index, Some(name.to_string()));
                self.by_name.insert(name.to_string(), index);
                Ok(Some(index))
            }
            (Some(index), None) => {
                // Index-only sightings must not clobber a name learned earlier
                self.by_index.entry(index).or_insert(None);
                Ok(Some(index))
            }
            (None, Some(name)) => {
                if let Some(&existing) = self.by_name.get(name) {
                    return Ok(Some(existing));
                }
                while self.by_index.contains_key(&self.next_auto) {
                    self.next_auto += 1;
                }
                let index = self.next_auto;
                self.next_auto += 1;
                self.by_index.insert(index, Some(name.to_string()));
                self.by_name.insert(name.to_string(), index);
                Ok(Some(index))
            }
            (None, None) => Ok(None),
        }
    }

    /// Number of distinct channel indices seen.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Name assigned to `index`, if any.
    pub fn name_of(&self, index: u32) -> Option<&str> {
        self.by_index.get(&index).and_then(|n| n.as_deref())
    }

    /// Index assigned to `name`, if any.
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// (index, name) pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<&str>)> {
        self.by_index.iter().map(|(&i, n)| (i, n.as_deref()))
    }
}

impl fmt::Display for ChannelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (pos, (index, name)) in self.iter().enumerate() {
            if pos > 0 {
                write!(f, ", ")?;
            }
            match name {
                Some(name) => write!(f, "{index}: {name:?}")?,
                None => write!(f, "{index}: None")?,
            }
        }
        write!(f, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================
