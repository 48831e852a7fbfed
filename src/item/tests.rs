use super::*;
use crate::error::PickerError;
use std::collections::HashSet;

fn library_item(name: &str) -> MediaItem {
    MediaItem::from_library(ImageSource::new(name))
}

fn collection_of(count: usize, max: Option<usize>) -> ItemCollection {
    let items = (0..count)
        .map(|i| library_item(&format!("photo-{}", i)))
        .collect();
    ItemCollection::with_items(items, max).unwrap()
}

fn assert_invariants(collection: &ItemCollection) {
    let keys: HashSet<ItemKey> = collection.keys().into_iter().collect();
    assert_eq!(keys.len(), collection.len(), "duplicate keys in collection");

    if let Some(selected) = collection.selected_key() {
        assert!(collection.contains(selected), "selection points at a missing item");
    }

    if let Some(max) = collection.max_items() {
        assert!(collection.len() <= max);
    }
}

#[test]
fn test_add_appends_in_order() {
    let mut collection = ItemCollection::new(None);
    let first = library_item("a");
    let second = library_item("b");
    let keys = collection
        .add(vec![first.clone(), second.clone()], InsertPosition::End)
        .unwrap();

    assert_eq!(keys, vec![first.key(), second.key()]);
    assert_eq!(collection.index_of(first.key()), Some(0));
    assert_eq!(collection.index_of(second.key()), Some(1));
    assert_invariants(&collection);
}

#[test]
fn test_add_at_start_and_index() {
    let mut collection = collection_of(2, None);
    let head = library_item("head");
    let middle = library_item("middle");

    collection
        .add(vec![head.clone()], InsertPosition::Start)
        .unwrap();
    collection
        .add(vec![middle.clone()], InsertPosition::Index(2))
        .unwrap();

    assert_eq!(collection.index_of(head.key()), Some(0));
    assert_eq!(collection.index_of(middle.key()), Some(2));
    assert_eq!(collection.len(), 4);

    let result = collection.add(vec![library_item("far")], InsertPosition::Index(9));
    assert!(matches!(
        result,
        Err(PickerError::InvalidIndex { index: 9, len: 4 })
    ));
    assert_eq!(collection.len(), 4);
}

#[test]
fn test_capacity_rejects_without_truncating() {
    let mut collection = collection_of(3, Some(3));
    let before = collection.keys();

    let result = collection.add(vec![library_item("x")], InsertPosition::End);

    match result {
        Err(PickerError::Capacity {
            limit,
            current,
            requested,
        }) => {
            assert_eq!(limit, 3);
            assert_eq!(current, 3);
            assert_eq!(requested, 1);
        }
        other => panic!("Expected capacity error, got {:?}", other),
    }
    assert_eq!(collection.keys(), before);
    assert!(collection.is_full());
}

#[test]
fn test_capacity_rejects_whole_batch() {
    let mut collection = collection_of(1, Some(3));
    let result = collection.add(
        vec![library_item("a"), library_item("b"), library_item("c")],
        InsertPosition::End,
    );
    assert!(result.is_err());
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.remaining_capacity(), Some(2));
}

#[test]
fn test_seeding_over_limit_fails() {
    let items = vec![library_item("a"), library_item("b")];
    assert!(ItemCollection::with_items(items, Some(1)).is_err());
}

#[test]
fn test_duplicate_keys_rejected() {
    let mut collection = ItemCollection::new(None);
    let item = library_item("a");
    collection.add(vec![item.clone()], InsertPosition::End).unwrap();

    let result = collection.add(vec![item.clone()], InsertPosition::End);
    assert!(matches!(result, Err(PickerError::DuplicateKey(key)) if key == item.key()));

    let twin = library_item("b");
    let result = collection.add(vec![twin.clone(), twin], InsertPosition::End);
    assert!(matches!(result, Err(PickerError::DuplicateKey(_))));
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_remove_clears_selection() {
    let mut collection = collection_of(3, None);
    let key = collection.get_index(1).unwrap().key();
    collection.select(key).unwrap();

    let removal = collection.remove(key).unwrap();
    assert_eq!(removal.index, 1);
    assert!(removal.was_selected);
    assert_eq!(collection.selected_key(), None);
    assert_invariants(&collection);

    assert!(matches!(
        collection.remove(key),
        Err(PickerError::UnknownItem(_))
    ));
}

#[test]
fn test_move_and_inverse_restore_order() {
    let mut collection = collection_of(5, None);
    let original = collection.keys();

    for (from, to) in [(0, 4), (4, 0), (1, 3), (2, 2), (3, 1)] {
        collection.move_item(from, to).unwrap();
        assert_invariants(&collection);
        collection.move_item(to, from).unwrap();
        assert_eq!(collection.keys(), original);
    }
}

#[test]
fn test_move_semantics() {
    let mut collection = collection_of(4, None);
    let keys = collection.keys();

    collection.move_item(0, 2).unwrap();
    assert_eq!(collection.keys(), vec![keys[1], keys[2], keys[0], keys[3]]);

    let result = collection.move_item(0, 4);
    assert!(matches!(
        result,
        Err(PickerError::InvalidIndex { index: 4, len: 4 })
    ));
    assert_eq!(collection.keys(), vec![keys[1], keys[2], keys[0], keys[3]]);
}

#[test]
fn test_update_preserves_position_and_key() {
    let mut collection = collection_of(3, None);
    let key = collection.get_index(1).unwrap().key();
    let crop = CropRect::new(0.1, 0.1, 0.5, 0.5).unwrap();

    let updated = collection
        .update(key, |item| {
            item.crop = Some(crop);
            item.orientation = ExifOrientation::Right;
        })
        .unwrap();
    assert_eq!(updated.key(), key);
    assert_eq!(updated.crop, Some(crop));

    assert_eq!(collection.index_of(key), Some(1));
    assert_eq!(collection.get(key).unwrap().orientation, ExifOrientation::Right);

    let missing = ItemKey::new();
    assert!(collection.update(missing, |_| {}).is_err());
}

#[test]
fn test_select_unknown_key_is_rejected() {
    let mut collection = collection_of(2, None);
    let first = collection.get_index(0).unwrap().key();
    collection.select(first).unwrap();

    assert!(collection.select(ItemKey::new()).is_err());
    assert_eq!(collection.selected_key(), Some(first));
}

#[test]
fn test_neighbor_after_removal_rule() {
    let mut collection = collection_of(3, None);
    let keys = collection.keys();

    // Middle: the next item slides into place
    let removal = collection.remove(keys[1]).unwrap();
    assert_eq!(collection.neighbor_after_removal(removal.index), Some(keys[2]));

    // Last: fall back to the previous item
    let removal = collection.remove(keys[2]).unwrap();
    assert_eq!(collection.neighbor_after_removal(removal.index), Some(keys[0]));

    // Only item: no neighbor
    let removal = collection.remove(keys[0]).unwrap();
    assert_eq!(collection.neighbor_after_removal(removal.index), None);
    assert!(collection.is_empty());
}

#[test]
fn test_mixed_operation_sequence_keeps_invariants() {
    let mut collection = ItemCollection::new(Some(6));

    for round in 0..20usize {
        match round % 4 {
            0 | 1 => {
                let _ = collection.add(
                    vec![library_item(&format!("r{}", round))],
                    InsertPosition::Index(collection.len() / 2),
                );
            }
            2 if !collection.is_empty() => {
                let from = round % collection.len();
                let to = (round * 7) % collection.len();
                collection.move_item(from, to).unwrap();
            }
            _ if collection.len() > 1 => {
                let key = collection.get_index(round % collection.len()).unwrap().key();
                collection.select(key).unwrap();
                collection.remove(key).unwrap();
            }
            _ => {}
        }
        assert_invariants(&collection);
    }
}

#[test]
fn test_crop_rect_validation() {
    assert!(CropRect::new(0.0, 0.0, 1.0, 1.0).is_some());
    assert!(CropRect::new(0.5, 0.5, 0.6, 0.2).is_none());
    assert!(CropRect::new(-0.1, 0.0, 0.5, 0.5).is_none());
    assert!(CropRect::new(0.2, 0.2, 0.0, 0.5).is_none());
    assert_eq!(CropRect::full().width, 1.0);
}

#[test]
fn test_exif_orientation_values() {
    for value in 1..=8u8 {
        let orientation = ExifOrientation::from_exif_value(value).unwrap();
        assert_eq!(orientation.exif_value(), value);
    }
    assert!(ExifOrientation::from_exif_value(0).is_none());
    assert!(ExifOrientation::LeftMirrored.is_mirrored());
    assert!(!ExifOrientation::Left.is_mirrored());
}
