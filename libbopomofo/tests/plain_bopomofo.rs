//! Plain Bopomofo mode: every completed syllable is resolved on the spot.

mod common;

use common::{states, Session};
use libbopomofo::{InputState, KeyEvent, KeyHandlerResult, Preferences};

fn plain() -> Session {
    Session::new(Preferences::plain())
}

#[test]
fn backtick_opens_symbol_menu() {
    let mut s = plain();
    let result = s.type_keys("`");
    assert!(result.is_handled());
    assert!(matches!(s.state, InputState::ChoosingCandidate { .. }));
    assert!(s.state.candidate_texts().contains(&"，"));
}

#[test]
fn shifted_angle_brackets_give_fullwidth_marks() {
    let mut s = plain();
    s.type_keys("<");
    assert!(matches!(s.state, InputState::ChoosingCandidate { .. }));
    assert_eq!(s.state.composing_buffer(), "，");

    let mut s = plain();
    s.type_keys(">");
    assert_eq!(s.state.composing_buffer(), "。");
}

#[test]
fn shifted_letter_still_composes() {
    let mut s = plain();
    s.key(KeyEvent::from_char('s').with_shift());
    assert_eq!(
        s.state,
        InputState::Inputting {
            composing_buffer: "ㄋ".into(),
            cursor_index: 1,
        }
    );
}

#[test]
fn partial_syllable_is_shown() {
    let mut s = plain();
    s.type_keys("su");
    assert_eq!(s.state.composing_buffer(), "ㄋㄧ");
    assert_eq!(s.state.cursor_index(), Some(2));
}

#[test]
fn homophones_open_candidate_list() {
    let mut s = plain();
    s.type_keys("su3");
    let InputState::ChoosingCandidate { composing_buffer, candidates, location, .. } = &s.state else {
        panic!("expected candidates, got {}", s.state);
    };
    assert_eq!(composing_buffer, "你");
    assert_eq!(*location, 0);
    let texts = candidates.texts();
    assert_eq!(texts[0], "你");
    for text in ["妳", "擬", "旎"] {
        assert_eq!(texts.iter().filter(|t| **t == text).count(), 1, "{text} listed once");
    }
}

#[test]
fn cancel_from_candidates_ignores_previous_state() {
    for cancel in [KeyEvent::escape(), KeyEvent::backspace(), KeyEvent::delete()] {
        let mut s = plain();
        s.type_keys("su3");
        let result = s.key(cancel);
        assert_eq!(states(&result), vec![InputState::EmptyIgnoringPreviousState]);
        assert!(s.handler.buffer().is_empty());
    }
}

#[test]
fn selection_key_commits_candidate() {
    let mut s = plain();
    s.type_keys("su3");
    let result = s.type_keys("2");
    assert_eq!(
        states(&result),
        vec![InputState::Committing { text: "妳".into() }, InputState::Empty]
    );
}

#[test]
fn next_syllable_takes_highlighted_candidate() {
    let mut s = plain();
    s.type_keys("su3");
    let result = s.type_keys("c");
    let published = states(&result);
    assert_eq!(published[0], InputState::Committing { text: "你".into() });
    assert_eq!(published.last().map(InputState::composing_buffer), Some("ㄏ"));
}

#[test]
fn single_match_commits_without_candidates() {
    let mut s = plain();
    let result = s.type_keys("aul ");
    assert_eq!(
        states(&result),
        vec![InputState::Committing { text: "喵".into() }, InputState::Empty]
    );
}

#[test]
fn associated_phrases_follow_commit_when_enabled() {
    let mut s = Session::new(Preferences {
        associated_phrases_enabled: true,
        ..Preferences::plain()
    });
    let result = s.type_keys("aul ");
    let published = states(&result);
    assert_eq!(published[0], InputState::Committing { text: "喵".into() });
    assert!(matches!(published[1], InputState::AssociatedPhrases { .. }));
    assert!(published[1].candidate_texts().contains(&"嗚"));

    // choosing one commits it; nothing follows 嗚
    let result = s.type_keys("1");
    assert_eq!(
        states(&result),
        vec![InputState::Committing { text: "嗚".into() }, InputState::Empty]
    );
}

#[test]
fn other_key_dismisses_associated_phrases() {
    let mut s = Session::new(Preferences {
        associated_phrases_enabled: true,
        ..Preferences::plain()
    });
    s.type_keys("aul ");
    let result = s.type_keys("s");
    let published = states(&result);
    assert_eq!(published[0], InputState::EmptyIgnoringPreviousState);
    assert_eq!(published[1].composing_buffer(), "ㄋ");

    s.type_keys("{esc}");
    s.type_keys("aul ");
    // space means nothing to an empty buffer, so it goes back to the host
    let result = s.type_keys(" ");
    assert_eq!(result, KeyHandlerResult::Unhandled(vec![InputState::EmptyIgnoringPreviousState]));
}

#[test]
fn delete_dismisses_associated_phrases() {
    let mut s = Session::new(Preferences {
        associated_phrases_enabled: true,
        ..Preferences::plain()
    });
    s.type_keys("aul ");
    assert!(matches!(s.state, InputState::AssociatedPhrases { .. }));
    let result = s.key(KeyEvent::delete());
    assert_eq!(result, KeyHandlerResult::Handled(vec![InputState::EmptyIgnoringPreviousState]));

    s.type_keys("aul ");
    let result = s.key(KeyEvent::backspace());
    assert_eq!(result, KeyHandlerResult::Handled(vec![InputState::EmptyIgnoringPreviousState]));
}

#[test]
fn command_shortcut_closes_associated_phrases() {
    let mut s = Session::new(Preferences {
        associated_phrases_enabled: true,
        ..Preferences::plain()
    });
    s.type_keys("aul ");
    let result = s.key(KeyEvent::from_char('c').with_command());
    assert_eq!(result, KeyHandlerResult::Unhandled(vec![InputState::EmptyIgnoringPreviousState]));

    // with nothing on screen the shortcut passes through untouched
    let result = s.key(KeyEvent::from_char('c').with_command());
    assert_eq!(result, KeyHandlerResult::Unhandled(vec![]));
}

#[test]
fn half_width_punctuation_commits_literal() {
    let mut s = Session::new(Preferences {
        half_width_punctuation_enabled: true,
        ..Preferences::plain()
    });
    let result = s.type_keys("<");
    assert_eq!(
        states(&result),
        vec![InputState::Committing { text: ",".into() }, InputState::Empty]
    );
}

#[test]
fn ctrl_punctuation_table() {
    let mut s = plain();
    let result = s.key(KeyEvent::from_char(',').with_ctrl());
    assert_eq!(
        states(&result),
        vec![InputState::Committing { text: "，".into() }, InputState::Empty]
    );
}
