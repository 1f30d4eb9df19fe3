//! Multiple-choice answer set generation.
//!
//! Distractors come from the same deck first (same semantic domain, harder to
//! guess by category), then from other decks, then from a builtin pool of
//! common words, so the option count holds even for tiny datasets.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::error::EngineError;
use crate::models::{ChoiceOption, StudyItem};
use crate::store::ItemStore;

/// Options per generated set: one correct answer plus three distractors.
pub const CHOICE_COUNT: usize = 4;

/// Last-resort distractor entries: (word, translation, phonetic, part of speech).
const FALLBACK_POOL: &[(&str, &str, &str, &str)] = &[
    ("time", "a measurable period", "/taɪm/", "n."),
    ("people", "human beings in general", "/ˈpiː.pəl/", "n."),
    ("water", "a clear liquid essential to life", "/ˈwɔː.tər/", "n."),
    ("world", "the earth and everything on it", "/wɜːld/", "n."),
    ("school", "a place for teaching and learning", "/skuːl/", "n."),
    ("family", "a group of related people", "/ˈfæm.əl.i/", "n."),
    ("music", "organized sound and rhythm", "/ˈmjuː.zɪk/", "n."),
    ("garden", "ground for growing plants", "/ˈɡɑː.dən/", "n."),
    ("window", "an opening that lets in light", "/ˈwɪn.dəʊ/", "n."),
    ("travel", "to go from one place to another", "/ˈtræv.əl/", "v."),
    ("answer", "a response to a question", "/ˈɑːn.sər/", "n."),
    ("bright", "giving out much light", "/braɪt/", "adj."),
    ("quiet", "making little noise", "/ˈkwaɪ.ət/", "adj."),
    ("borrow", "to take with intent to return", "/ˈbɒr.əʊ/", "v."),
    ("weather", "the state of the atmosphere", "/ˈweð.ər/", "n."),
    ("village", "a small group of houses", "/ˈvɪl.ɪdʒ/", "n."),
];

fn option_from_item(item: &StudyItem) -> ChoiceOption {
    let (phonetic, part_of_speech) = match item {
        StudyItem::Word {
            phonetic,
            part_of_speech,
            ..
        } => (phonetic.clone(), part_of_speech.clone()),
        _ => (None, None),
    };
    ChoiceOption {
        text: item.answer_text().to_string(),
        phonetic,
        part_of_speech,
        correct: false,
    }
}

/// Builds the choice set for `item`: exactly `count` shuffled options with one
/// correct entry and no distractor text equal to the correct answer.
pub async fn build_choices<S: ItemStore>(
    store: &S,
    item: &StudyItem,
    count: usize,
) -> Result<Vec<ChoiceOption>, EngineError> {
    if let StudyItem::Question {
        answer, options, ..
    } = item
    {
        return Ok(question_choices(answer, options, count));
    }

    let correct_text = item.answer_text();
    let needed = count.saturating_sub(1);

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(correct_text.to_string());

    let mut distractors: Vec<ChoiceOption> = Vec::with_capacity(needed);
    let exclude = [item.id().to_string()];

    // Tier 1: same deck. Over-fetch to survive duplicate-text filtering.
    let same_deck = store
        .find_random_items(item.deck_id(), &exclude, (needed * 2) as u32)
        .await?;
    collect_distractors(&mut distractors, &mut seen, &same_deck, needed);

    // Tier 2: any other deck.
    if distractors.len() < needed {
        let shortfall = needed - distractors.len();
        let other_decks = store
            .find_random_items_other_decks(item.deck_id(), (shortfall * 2) as u32)
            .await?;
        collect_distractors(&mut distractors, &mut seen, &other_decks, needed);
    }

    // Tier 3: builtin pool.
    if distractors.len() < needed {
        let mut rng = rand::rng();
        let mut pool: Vec<&(&str, &str, &str, &str)> = FALLBACK_POOL.iter().collect();
        pool.shuffle(&mut rng);
        for (_, translation, phonetic, part_of_speech) in pool {
            if distractors.len() == needed {
                break;
            }
            if !seen.insert((*translation).to_string()) {
                continue;
            }
            distractors.push(ChoiceOption {
                text: (*translation).to_string(),
                phonetic: Some((*phonetic).to_string()),
                part_of_speech: Some((*part_of_speech).to_string()),
                correct: false,
            });
        }
    }

    let mut options = distractors;
    options.push(ChoiceOption {
        text: correct_text.to_string(),
        phonetic: match item {
            StudyItem::Word { phonetic, .. } => phonetic.clone(),
            _ => None,
        },
        part_of_speech: match item {
            StudyItem::Word { part_of_speech, .. } => part_of_speech.clone(),
            _ => None,
        },
        correct: true,
    });

    let mut rng = rand::rng();
    options.shuffle(&mut rng);
    Ok(options)
}

fn collect_distractors(
    distractors: &mut Vec<ChoiceOption>,
    seen: &mut HashSet<String>,
    candidates: &[StudyItem],
    needed: usize,
) {
    for candidate in candidates {
        if distractors.len() == needed {
            return;
        }
        let option = option_from_item(candidate);
        if option.text.is_empty() || !seen.insert(option.text.clone()) {
            continue;
        }
        distractors.push(option);
    }
}

/// Question items carry their own options; the answer key marks the correct
/// one. Authored sets short of `count` are padded from the builtin pool.
fn question_choices(answer: &str, authored: &[String], count: usize) -> Vec<ChoiceOption> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut options: Vec<ChoiceOption> = Vec::with_capacity(count);
    let mut has_correct = false;

    for text in authored {
        if options.len() == count || text.is_empty() || !seen.insert(text.clone()) {
            continue;
        }
        let correct = text == answer;
        has_correct |= correct;
        options.push(ChoiceOption {
            text: text.clone(),
            phonetic: None,
            part_of_speech: None,
            correct,
        });
    }

    if !has_correct {
        if options.len() == count {
            options.pop();
        }
        seen.insert(answer.to_string());
        options.push(ChoiceOption {
            text: answer.to_string(),
            phonetic: None,
            part_of_speech: None,
            correct: true,
        });
    }

    let mut rng = rand::rng();
    if options.len() < count {
        let mut pool: Vec<&(&str, &str, &str, &str)> = FALLBACK_POOL.iter().collect();
        pool.shuffle(&mut rng);
        for (_, translation, _, _) in pool {
            if options.len() == count {
                break;
            }
            if !seen.insert((*translation).to_string()) {
                continue;
            }
            options.push(ChoiceOption {
                text: (*translation).to_string(),
                phonetic: None,
                part_of_speech: None,
                correct: false,
            });
        }
    }

    options.shuffle(&mut rng);
    options
}
