//! Interface index table built from a link dump.

use crate::messages::link::LinkRecord;

/// Maps kernel interface indexes to names and MTUs.
///
/// Indexes are small and dense, so storage is a flat vector grown in
/// blocks of 32 slots. The first record for an index wins; later
/// records for the same index are ignored.
#[derive(Debug, Default)]
pub struct IfMap {
    entries: Vec<Option<Entry>>,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    mtu: u32,
}

const GROW_QUANTUM: usize = 32;

impl IfMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interface. Non-positive indexes and repeated indexes
    /// are ignored.
    pub fn insert(&mut self, link: &LinkRecord) {
        if link.index <= 0 {
            return;
        }
        let idx = link.index as usize;
        if idx >= self.entries.len() {
            let want = (idx + 1).next_multiple_of(GROW_QUANTUM);
            self.entries.resize(want, None);
        }
        let slot = &mut self.entries[idx];
        if slot.is_none() {
            *slot = Some(Entry {
                name: link.name.clone(),
                mtu: link.mtu,
            });
        }
    }

    /// Look up an interface name by index.
    pub fn name(&self, index: u32) -> Option<&str> {
        self.entries
            .get(index as usize)?
            .as_ref()
            .map(|e| e.name.as_str())
    }

    /// Look up an interface MTU by index; 0 when unknown.
    pub fn mtu(&self, index: u32) -> u32 {
        self.entries
            .get(index as usize)
            .and_then(|e| e.as_ref())
            .map(|e| e.mtu)
            .unwrap_or(0)
    }
}
