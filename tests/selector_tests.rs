//! Working-set selection behavior against the in-memory store.

mod common;

use beici_engine::engine::selector::build_working_set;
use beici_engine::srs::MILLIS_PER_DAY;

use common::{due_word, word, MemoryItemStore, FIXED_NOW};

#[tokio::test]
async fn test_small_deck_yields_smaller_set() {
    let store = MemoryItemStore::with_items(vec![
        word("w1", "deck1", "apple", "a round fruit"),
        word("w2", "deck1", "river", "a natural stream of water"),
    ])
    .await;

    let set = build_working_set(&store, "deck1", 10, FIXED_NOW)
        .await
        .unwrap();
    assert_eq!(set.len(), 2);
}

#[tokio::test]
async fn test_due_items_come_first_most_overdue_leading() {
    let mut items = vec![
        due_word("due-late", "deck1", 2, FIXED_NOW - MILLIS_PER_DAY),
        due_word("due-early", "deck1", 1, FIXED_NOW - 5 * MILLIS_PER_DAY),
        due_word("due-mid", "deck1", 3, FIXED_NOW - 3 * MILLIS_PER_DAY),
    ];
    for n in 0..9 {
        items.push(word(
            &format!("new-{n}"),
            "deck1",
            &format!("word{n}"),
            &format!("meaning {n}"),
        ));
    }
    let store = MemoryItemStore::with_items(items).await;

    let set = build_working_set(&store, "deck1", 10, FIXED_NOW)
        .await
        .unwrap();
    assert_eq!(set.len(), 10);
    assert_eq!(set[0].id(), "due-early");
    assert_eq!(set[1].id(), "due-mid");
    assert_eq!(set[2].id(), "due-late");
}

#[tokio::test]
async fn test_working_set_has_no_duplicate_ids() {
    let mut items = vec![
        due_word("d1", "deck1", 1, FIXED_NOW - MILLIS_PER_DAY),
        due_word("d2", "deck1", 1, FIXED_NOW - 2 * MILLIS_PER_DAY),
        due_word("d3", "deck1", 1, FIXED_NOW - 3 * MILLIS_PER_DAY),
    ];
    for n in 0..12 {
        items.push(word(
            &format!("n{n}"),
            "deck1",
            &format!("word{n}"),
            &format!("meaning {n}"),
        ));
    }
    let store = MemoryItemStore::with_items(items).await;

    let set = build_working_set(&store, "deck1", 10, FIXED_NOW)
        .await
        .unwrap();
    assert_eq!(set.len(), 10);

    let ids: std::collections::HashSet<&str> = set.iter().map(|item| item.id()).collect();
    assert_eq!(ids.len(), set.len());
    assert!(ids.contains("d1") && ids.contains("d2") && ids.contains("d3"));
}

#[tokio::test]
async fn test_items_not_yet_due_are_not_selected_as_due() {
    let store = MemoryItemStore::with_items(vec![
        // Scheduled well into the future: eligible only as random fill.
        due_word("future", "deck1", 4, FIXED_NOW + 10 * MILLIS_PER_DAY),
        due_word("overdue", "deck1", 1, FIXED_NOW - MILLIS_PER_DAY),
        word("fresh", "deck1", "bridge", "a structure spanning a gap"),
    ])
    .await;

    let set = build_working_set(&store, "deck1", 3, FIXED_NOW)
        .await
        .unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set[0].id(), "overdue");
}

#[tokio::test]
async fn test_other_decks_never_contribute() {
    let store = MemoryItemStore::with_items(vec![
        word("w1", "deck1", "apple", "a round fruit"),
        word("x1", "deck2", "pomme", "une pomme"),
        word("x2", "deck2", "fleuve", "un fleuve"),
    ])
    .await;

    let set = build_working_set(&store, "deck1", 10, FIXED_NOW)
        .await
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].id(), "w1");
}

#[tokio::test]
async fn test_empty_deck_yields_empty_set() {
    let store = MemoryItemStore::new();
    let set = build_working_set(&store, "deck1", 10, FIXED_NOW)
        .await
        .unwrap();
    assert!(set.is_empty());
}

#[tokio::test]
async fn test_due_overflow_is_capped_at_target() {
    let mut items = Vec::new();
    for n in 0..8 {
        items.push(due_word(
            &format!("d{n}"),
            "deck1",
            1,
            FIXED_NOW - (n + 1) * MILLIS_PER_DAY,
        ));
    }
    let store = MemoryItemStore::with_items(items).await;

    let set = build_working_set(&store, "deck1", 5, FIXED_NOW)
        .await
        .unwrap();
    assert_eq!(set.len(), 5);
    // Most overdue first.
    assert_eq!(set[0].id(), "d7");
}
