use super::types::{ItemKey, MediaItem};
use crate::error::{PickerError, Result};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Where `add` places a batch of new items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    #[default]
    End,
    Start,
    Index(usize),
}

/// Outcome of a successful `remove`
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub item: MediaItem,
    pub index: usize,
    pub was_selected: bool,
}

/// Ordered, uniquely keyed set of media items with selection tracking
#[derive(Debug, Clone, Default)]
pub struct ItemCollection {
    items: Vec<MediaItem>,
    selected: Option<ItemKey>,
    max_items: Option<usize>,
}

impl ItemCollection {
    /// Create an empty collection with an optional item limit
    pub fn new(max_items: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            max_items,
        }
    }

    /// Create a collection seeded with items, enforcing the same rules as `add`
    pub fn with_items(items: Vec<MediaItem>, max_items: Option<usize>) -> Result<Self> {
        let mut collection = Self::new(max_items);
        if !items.is_empty() {
            collection.add(items, InsertPosition::End)?;
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// Number of items that can still be added, `None` when unbounded
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.max_items
            .map(|max| max.saturating_sub(self.items.len()))
    }

    pub fn is_full(&self) -> bool {
        self.remaining_capacity() == Some(0)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.items.iter()
    }

    pub fn keys(&self) -> Vec<ItemKey> {
        self.items.iter().map(MediaItem::key).collect()
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        self.index_of(key).is_some()
    }

    pub fn index_of(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    pub fn get(&self, key: ItemKey) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn get_index(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    /// Insert a batch of items; the whole batch is rejected on any violation
    pub fn add(&mut self, items: Vec<MediaItem>, position: InsertPosition) -> Result<Vec<ItemKey>> {
        if let Some(limit) = self.max_items {
            if self.items.len() + items.len() > limit {
                warn!(
                    "Rejecting {} items: collection holds {} of {}",
                    items.len(),
                    self.items.len(),
                    limit
                );
                return Err(PickerError::Capacity {
                    limit,
                    current: self.items.len(),
                    requested: items.len(),
                });
            }
        }

        let mut seen: HashSet<ItemKey> = self.items.iter().map(MediaItem::key).collect();
        for item in &items {
            if !seen.insert(item.key()) {
                return Err(PickerError::DuplicateKey(item.key()));
            }
        }

        let index = match position {
            InsertPosition::End => self.items.len(),
            InsertPosition::Start => 0,
            InsertPosition::Index(index) if index <= self.items.len() => index,
            InsertPosition::Index(index) => {
                return Err(PickerError::InvalidIndex {
                    index,
                    len: self.items.len(),
                })
            }
        };

        let keys: Vec<ItemKey> = items.iter().map(MediaItem::key).collect();
        let tail = self.items.split_off(index);
        self.items.extend(items);
        self.items.extend(tail);
        debug!("Added {} items at index {}", keys.len(), index);

        Ok(keys)
    }

    /// Remove an item, clearing the selection if it pointed at it
    pub fn remove(&mut self, key: ItemKey) -> Result<Removal> {
        let index = self.index_of(key).ok_or(PickerError::UnknownItem(key))?;
        let item = self.items.remove(index);

        let was_selected = self.selected == Some(key);
        if was_selected {
            self.selected = None;
        }

        debug!("Removed item {} from index {}", key, index);
        Ok(Removal {
            item,
            index,
            was_selected,
        })
    }

    /// Move the item at `from` so that it ends up at `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(PickerError::InvalidIndex { index, len });
            }
        }

        if from == to {
            return Ok(());
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);
        trace!("Moved item from {} to {}", from, to);
        Ok(())
    }

    /// Edit an item in place; position and key are preserved
    pub fn update<F>(&mut self, key: ItemKey, mutator: F) -> Result<&MediaItem>
    where
        F: FnOnce(&mut MediaItem),
    {
        let index = self.index_of(key).ok_or(PickerError::UnknownItem(key))?;
        let item = &mut self.items[index];
        mutator(item);

        if item.key() != key {
            // Identity is not editable; restore it
            item.key = key;
        }

        Ok(&self.items[index])
    }

    pub fn select(&mut self, key: ItemKey) -> Result<()> {
        if !self.contains(key) {
            return Err(PickerError::UnknownItem(key));
        }
        self.selected = Some(key);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_key(&self) -> Option<ItemKey> {
        self.selected
    }

    pub fn selected(&self) -> Option<&MediaItem> {
        self.selected.and_then(|key| self.get(key))
    }

    /// Drop a selection that no longer refers to a held item.
    /// Returns true when something was cleared.
    pub fn prune_selection(&mut self) -> bool {
        match self.selected {
            Some(key) if !self.contains(key) => {
                self.selected = None;
                true
            }
            _ => false,
        }
    }

    /// Item to show after removing the one at `removed_index`: the item that
    /// slid into its slot, else the one before it.
    pub fn neighbor_after_removal(&self, removed_index: usize) -> Option<ItemKey> {
        self.items
            .get(removed_index)
            .or_else(|| {
                removed_index
                    .checked_sub(1)
                    .and_then(|index| self.items.get(index))
            })
            .map(MediaItem::key)
    }

    /// Items in their current order, for handing back to the host
    pub fn to_vec(&self) -> Vec<MediaItem> {
        self.items.clone()
    }
}
