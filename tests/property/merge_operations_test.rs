//! Property-based tests for collection operations: import merge, reorder,
//! and add-then-search.
//!
//! URLs are drawn from a small pool so batches collide with each other and
//! with the existing collection.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use linkvault::database::Database;
use linkvault::managers::bookmark_manager::{BookmarkCollection, BookmarkCollectionTrait};
use linkvault::types::bookmark::{Bookmark, BookmarkSource};
use proptest::prelude::*;

fn pool_url(n: u8) -> String {
    format!("https://site{}.example.com", n)
}

fn collection_with(existing: &BTreeSet<u8>) -> BookmarkCollection {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let mut coll = BookmarkCollection::new(Arc::new(db));
    for n in existing {
        coll.add(Bookmark::new(&pool_url(*n), &format!("Existing {}", n), BookmarkSource::Manual))
            .expect("pool URLs are unique");
    }
    coll
}

// **Property 1: Merge accounting and URL uniqueness**
//
// *For any* existing collection and import batch, merge SHALL report
// `imported + duplicates == total`, grow the collection by `imported`, keep
// URLs unique, and leave every batch URL present.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn merge_counts_and_keeps_urls_unique(
        existing in prop::collection::btree_set(0u8..20, 0..10),
        batch in prop::collection::vec(0u8..20, 0..15),
    ) {
        let mut coll = collection_with(&existing);
        let before = coll.all().len();

        let candidates: Vec<Bookmark> = batch
            .iter()
            .map(|n| Bookmark::new(&pool_url(*n), "Imported", BookmarkSource::ImportedJson))
            .collect();
        let summary = coll.merge(candidates).unwrap();

        prop_assert_eq!(summary.total, batch.len());
        prop_assert_eq!(summary.imported + summary.duplicates, summary.total);
        prop_assert_eq!(coll.all().len(), before + summary.imported);

        let fresh: BTreeSet<u8> = batch.iter().copied().filter(|n| !existing.contains(n)).collect();
        prop_assert_eq!(summary.imported, fresh.len());

        let urls: HashSet<&str> = coll.all().iter().map(|b| b.url.as_str()).collect();
        prop_assert_eq!(urls.len(), coll.all().len(), "URLs must stay unique");
        for n in &batch {
            prop_assert!(urls.contains(pool_url(*n).as_str()));
        }

        let ids: HashSet<&str> = coll.all().iter().map(|b| b.id.as_str()).collect();
        prop_assert_eq!(ids.len(), coll.all().len(), "ids must stay unique");
    }
}

// **Property 2: Merge prepends new records in batch order**
//
// *For any* batch, the first `imported` entries after merge SHALL be the
// new URLs in the order they first appear in the batch.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn merge_prepends_in_batch_order(
        existing in prop::collection::btree_set(0u8..20, 0..10),
        batch in prop::collection::vec(0u8..20, 0..15),
    ) {
        let mut coll = collection_with(&existing);
        let candidates: Vec<Bookmark> = batch
            .iter()
            .map(|n| Bookmark::new(&pool_url(*n), "Imported", BookmarkSource::ImportedCsv))
            .collect();
        let summary = coll.merge(candidates).unwrap();

        let mut seen = HashSet::new();
        let expected: Vec<String> = batch
            .iter()
            .filter(|n| !existing.contains(*n) && seen.insert(**n))
            .map(|n| pool_url(*n))
            .collect();
        let head: Vec<String> = coll.all()[..summary.imported].iter().map(|b| b.url.clone()).collect();
        prop_assert_eq!(head, expected);
    }
}

// **Property 3: Reorder is a permutation**
//
// *For any* collection and pair of positions, reorder SHALL keep the same
// set of ids and place the dragged bookmark at the target's former index.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn reorder_moves_only_the_dragged_bookmark(
        size in 2u8..12,
        from_seed in any::<prop::sample::Index>(),
        to_seed in any::<prop::sample::Index>(),
    ) {
        let existing: BTreeSet<u8> = (0..size).collect();
        let mut coll = collection_with(&existing);
        let ids: Vec<String> = coll.all().iter().map(|b| b.id.clone()).collect();

        let from = from_seed.index(ids.len());
        let to = to_seed.index(ids.len());
        coll.reorder(&ids[from], &ids[to]).unwrap();

        let after: Vec<String> = coll.all().iter().map(|b| b.id.clone()).collect();
        let mut expected = ids.clone();
        if from != to {
            let dragged = expected.remove(from);
            expected.insert(to, dragged);
        }
        prop_assert_eq!(&after, &expected);

        let before_set: BTreeSet<&String> = ids.iter().collect();
        let after_set: BTreeSet<&String> = after.iter().collect();
        prop_assert_eq!(before_set, after_set);
    }
}

// **Property 4: Add then search**
//
// *For any* URL and title, adding a bookmark then searching by its title
// SHALL return that bookmark.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn add_then_search_returns_bookmark(
        host in "[a-z][a-z0-9]{2,12}",
        title in "[a-zA-Z][a-zA-Z0-9 ]{1,30}",
    ) {
        let mut coll = collection_with(&BTreeSet::new());
        let url = format!("https://{}.com", host);
        let saved = coll.add(Bookmark::new(&url, &title, BookmarkSource::Manual)).unwrap();

        let results = coll.search(&title.to_uppercase());
        prop_assert!(results.iter().any(|b| b.id == saved.id));
    }
}
