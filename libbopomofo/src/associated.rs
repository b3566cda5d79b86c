//! Associated phrase lookup after a commit.

use crate::config::Preferences;
use crate::input_state::InputState;
use libbopomofo_core::{CandidateList, LanguageModel};

/// The `AssociatedPhrases` state to show after committing `committed`, or
/// `None` when the preference is off or nothing follows the text.
///
/// The whole committed text is tried first, then its last character.
pub fn associated_phrases_state(
    lm: &dyn LanguageModel,
    committed: &str,
    prefs: &Preferences,
) -> Option<InputState> {
    if !prefs.associated_phrases_enabled || committed.is_empty() {
        return None;
    }
    let mut key = committed.to_string();
    let mut candidates = lm.associated_candidates(&key);
    if candidates.is_empty() {
        let last = committed.chars().last()?;
        if last.len_utf8() == committed.len() {
            return None;
        }
        key = last.to_string();
        candidates = lm.associated_candidates(&key);
    }
    if candidates.is_empty() {
        return None;
    }
    tracing::trace!(key = %key, count = candidates.len(), "associated phrases");
    Some(InputState::AssociatedPhrases {
        key,
        candidates: CandidateList::from_candidates(candidates, prefs.page_size()),
    })
}
