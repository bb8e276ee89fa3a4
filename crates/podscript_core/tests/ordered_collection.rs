use podscript_core::{Entity, OrderedCollection, Replica};

fn build(count: usize) -> (OrderedCollection<Replica>, Vec<String>) {
    let mut collection = OrderedCollection::new();
    let mut ids = Vec::new();
    for index in 0..count {
        let replica = Replica::new(format!("line {index}"), None);
        ids.push(replica.id().to_string());
        assert!(collection.add(replica));
    }
    (collection, ids)
}

#[test]
fn add_preserves_insertion_order() {
    let (collection, ids) = build(3);
    assert_eq!(collection.ids(), ids.as_slice());
    assert_eq!(collection.len(), 3);
    assert!(!collection.is_empty());
    assert_eq!(collection.get(1).unwrap().text(), "line 1");
}

#[test]
fn add_rejects_duplicate_ids() {
    let (mut collection, ids) = build(1);
    let duplicate = collection.find_by_id(&ids[0]).cloned().unwrap();
    assert!(!collection.add(duplicate));
    assert_eq!(collection.len(), 1);
}

#[test]
fn move_places_item_at_target_index_for_every_valid_pair() {
    let len = 5;
    for from in 0..len {
        for to in 0..len {
            let (mut collection, ids) = build(len);
            assert!(collection.move_to(&ids[from], to));
            assert_eq!(collection.len(), len);
            assert_eq!(collection.index_of(&ids[from]), Some(to));

            let mut expected = ids.clone();
            let moved = expected.remove(from);
            expected.insert(to, moved);
            assert_eq!(collection.ids(), expected.as_slice());
        }
    }
}

#[test]
fn invalid_move_leaves_collection_unchanged() {
    let (mut collection, ids) = build(3);

    assert!(!collection.move_to(&ids[0], 3));
    assert!(!collection.move_to(&ids[0], usize::MAX));
    assert!(!collection.move_to("missing", 0));
    assert_eq!(collection.ids(), ids.as_slice());
}

#[test]
fn move_on_empty_collection_fails() {
    let mut collection: OrderedCollection<Replica> = OrderedCollection::new();
    assert!(!collection.move_to("anything", 0));
}

#[test]
fn remove_is_stable_and_reports_not_found() {
    let (mut collection, ids) = build(4);

    let (index, removed) = collection.remove(&ids[2]).unwrap();
    assert_eq!(index, 2);
    assert_eq!(removed.id(), ids[2]);
    assert_eq!(
        collection.ids(),
        &[ids[0].clone(), ids[1].clone(), ids[3].clone()]
    );
    assert!(collection.remove("missing").is_none());
    assert!(collection.find_by_id(&ids[2]).is_none());
}

#[test]
fn get_all_returns_a_detached_copy() {
    let (mut collection, ids) = build(2);
    let mut copy = collection.get_all();
    copy[0].set_text("changed");
    copy.clear();

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.find_by_id(&ids[0]).unwrap().text(), "line 0");

    collection.clear();
    assert!(collection.is_empty());
    assert_eq!(collection.iter().count(), 0);
}
