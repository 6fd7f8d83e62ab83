//! Cursor state over an ordered id sequence.

use std::collections::HashMap;
use std::hash::Hash;

/// Ordered primary keys of the current result set plus the selected key.
///
/// Position lookups go through a key-to-index map, so each navigation step
/// is constant time once the sequence is loaded.
#[derive(Debug, Clone)]
pub struct CursorState<K> {
    ids: Option<Vec<K>>,
    positions: HashMap<K, usize>,
    current: Option<K>,
}

impl<K> Default for CursorState<K> {
    fn default() -> Self {
        Self {
            ids: None,
            positions: HashMap::new(),
            current: None,
        }
    }
}

impl<K: Clone + Eq + Hash> CursorState<K> {
    /// Creates a cursor with no sequence and no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a sequence has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.ids.is_some()
    }

    /// Replaces the sequence. The selection is kept.
    ///
    /// If a key occurs twice, its first position wins.
    pub fn load(&mut self, ids: Vec<K>) {
        self.positions.clear();
        for (index, id) in ids.iter().enumerate() {
            self.positions.entry(id.clone()).or_insert(index);
        }
        self.ids = Some(ids);
    }

    /// Drops the sequence. The selection is kept.
    pub fn clear(&mut self) {
        self.ids = None;
        self.positions.clear();
    }

    /// Returns the loaded sequence.
    pub fn ids(&self) -> Option<&[K]> {
        self.ids.as_deref()
    }

    /// Returns the selected key.
    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    /// Moves the selection; the key need not be in the sequence.
    pub fn select(&mut self, id: Option<K>) {
        self.current = id;
    }

    /// Returns the position of `id` in the sequence.
    pub fn position_of(&self, id: &K) -> Option<usize> {
        self.positions.get(id).copied()
    }

    fn current_position(&self) -> Option<usize> {
        self.current.as_ref().and_then(|id| self.position_of(id))
    }

    /// Returns the key after the selection without moving.
    pub fn peek_next(&self) -> Option<&K> {
        let ids = self.ids.as_ref()?;
        let position = self.current_position()?;
        ids.get(position + 1)
    }

    /// Returns the key before the selection without moving.
    pub fn peek_previous(&self) -> Option<&K> {
        let ids = self.ids.as_ref()?;
        let position = self.current_position()?;
        position.checked_sub(1).and_then(|p| ids.get(p))
    }

    /// Moves to the next key and returns it; at the end nothing changes.
    pub fn advance(&mut self) -> Option<K> {
        let next = self.peek_next()?.clone();
        self.current = Some(next.clone());
        Some(next)
    }

    /// Moves to the previous key and returns it; at the start nothing changes.
    pub fn retreat(&mut self) -> Option<K> {
        let previous = self.peek_previous()?.clone();
        self.current = Some(previous.clone());
        Some(previous)
    }
}
