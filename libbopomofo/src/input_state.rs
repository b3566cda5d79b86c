//! States handed to the presentation layer.
//!
//! A new value is produced for every key event; nothing here points back
//! into the key handler.

use libbopomofo_core::CandidateList;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InputState {
    /// Nothing being composed.
    #[default]
    Empty,
    /// Cleared by a cancel; the host should not restore anything from the
    /// previous state.
    EmptyIgnoringPreviousState,
    /// Text to insert into the document.
    Committing { text: String },
    /// Composing, no candidate list shown. Indices count characters.
    Inputting {
        composing_buffer: String,
        cursor_index: usize,
    },
    /// A span is selected for learning as a user phrase.
    Marking {
        composing_buffer: String,
        cursor_index: usize,
        mark_start: usize,
        mark_end: usize,
        marked_text: String,
        /// Joined reading key of the marked span.
        reading: String,
        /// Whether Enter would accept the span.
        acceptable: bool,
    },
    /// Candidate list for the readings starting at `location`.
    ChoosingCandidate {
        composing_buffer: String,
        cursor_index: usize,
        location: usize,
        candidates: CandidateList,
    },
    /// Suggestions following the just committed `key`.
    AssociatedPhrases {
        key: String,
        candidates: CandidateList,
    },
}

impl InputState {
    /// Composing text shown inline, empty for states without one.
    pub fn composing_buffer(&self) -> &str {
        match self {
            InputState::Inputting { composing_buffer, .. }
            | InputState::Marking { composing_buffer, .. }
            | InputState::ChoosingCandidate { composing_buffer, .. } => composing_buffer,
            _ => "",
        }
    }

    pub fn cursor_index(&self) -> Option<usize> {
        match self {
            InputState::Inputting { cursor_index, .. }
            | InputState::Marking { cursor_index, .. }
            | InputState::ChoosingCandidate { cursor_index, .. } => Some(*cursor_index),
            _ => None,
        }
    }

    pub fn candidates(&self) -> Option<&CandidateList> {
        match self {
            InputState::ChoosingCandidate { candidates, .. }
            | InputState::AssociatedPhrases { candidates, .. } => Some(candidates),
            _ => None,
        }
    }

    /// Candidate texts, empty when no list is shown.
    pub fn candidate_texts(&self) -> Vec<&str> {
        self.candidates().map(CandidateList::texts).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, InputState::Empty | InputState::EmptyIgnoringPreviousState)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputState::Empty => "Empty",
            InputState::EmptyIgnoringPreviousState => "EmptyIgnoringPreviousState",
            InputState::Committing { .. } => "Committing",
            InputState::Inputting { .. } => "Inputting",
            InputState::Marking { .. } => "Marking",
            InputState::ChoosingCandidate { .. } => "ChoosingCandidate",
            InputState::AssociatedPhrases { .. } => "AssociatedPhrases",
        }
    }
}

impl std::fmt::Display for InputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputState::Committing { text } => write!(f, "Committing({text:?})"),
            InputState::Inputting { composing_buffer, cursor_index } => {
                write!(f, "Inputting({composing_buffer:?}, cursor {cursor_index})")
            }
            InputState::Marking { marked_text, acceptable, .. } => {
                write!(f, "Marking({marked_text:?}, acceptable: {acceptable})")
            }
            InputState::ChoosingCandidate { composing_buffer, candidates, .. } => {
                write!(f, "ChoosingCandidate({composing_buffer:?}, {:?})", candidates.texts())
            }
            InputState::AssociatedPhrases { key, candidates } => {
                write!(f, "AssociatedPhrases({key:?}, {:?})", candidates.texts())
            }
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libbopomofo_core::Candidate;

    #[test]
    fn accessors_follow_variant() {
        let list = CandidateList::from_candidates(vec![Candidate::new("你", -3.0)], 9);
        let state = InputState::ChoosingCandidate {
            composing_buffer: "你".into(),
            cursor_index: 1,
            location: 0,
            candidates: list,
        };
        assert_eq!(state.composing_buffer(), "你");
        assert_eq!(state.candidate_texts(), vec!["你"]);
        assert!(InputState::Committing { text: "x".into() }.candidates().is_none());
        assert!(InputState::EmptyIgnoringPreviousState.is_empty());
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(InputState::Committing { text: "喵".into() }).unwrap();
        assert_eq!(json["state"], "committing");
        assert_eq!(json["text"], "喵");
    }
}
