//! Working-set selection: due-for-review items first, random new items to
//! fill the remainder.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::models::StudyItem;
use crate::store::ItemStore;

/// Builds the session working set for a deck.
///
/// Due items come first, ordered most-overdue-first by the store. The
/// remainder is filled from `2 x remaining` random candidates (over-fetched to
/// survive de-duplication against the due set). A deck smaller than
/// `target_count` simply yields a smaller set.
pub async fn build_working_set<S: ItemStore>(
    store: &S,
    deck_id: &str,
    target_count: u32,
    now: i64,
) -> Result<Vec<StudyItem>, EngineError> {
    let target = target_count as usize;
    let mut working_set = store.find_due_items(deck_id, now, target_count).await?;
    working_set.truncate(target);

    if working_set.len() < target {
        let remaining = target - working_set.len();
        let due_ids: HashSet<String> = working_set
            .iter()
            .map(|item| item.id().to_string())
            .collect();
        let exclude: Vec<String> = due_ids.iter().cloned().collect();

        let candidates = store
            .find_random_items(deck_id, &exclude, (remaining * 2) as u32)
            .await?;

        let mut seen = due_ids;
        let mut filled = 0usize;
        for candidate in candidates {
            if filled == remaining {
                break;
            }
            if !seen.insert(candidate.id().to_string()) {
                continue;
            }
            working_set.push(candidate);
            filled += 1;
        }
    }

    working_set.truncate(target);
    Ok(working_set)
}
