//! Key handler: one key event plus the current input state in, the next
//! states out.
//!
//! The handler owns the composing buffer and the syllable composer. The
//! states it returns are plain values; the caller hands the last one back
//! with the next key event.

use crate::associated::associated_phrases_state;
use crate::buffer::ComposingBuffer;
use crate::composer::{ComposerResult, SyllableComposer};
use crate::config::Preferences;
use crate::error::KeyHandlerError;
use crate::input_state::InputState;
use crate::key_event::KeyEvent;
use crate::layout::KeyboardLayout;
use crate::punctuation::{self, PunctuationMatch, PunctuationOverlay};
use crate::syllable::Component;
use libbopomofo_core::{
    join_readings, Candidate, CandidateList, GridOptions, LanguageModel, PhraseGrid, Pin, Walk,
};
use std::ops::Range;
use std::rc::Rc;

/// Shortest span that can be learned from a mark.
pub const MIN_MARKED_READINGS: usize = 2;

/// Outcome of one key event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyHandlerResult {
    /// The key was consumed. States to publish in order; the last one is the
    /// state to pass back with the next key.
    Handled(Vec<InputState>),
    /// The key is invalid here. Nothing changed; the host should beep.
    Rejected(KeyHandlerError),
    /// The key belongs to the host application. Usually empty; holds the
    /// cancel state when a suggestion list was dismissed on the way.
    Unhandled(Vec<InputState>),
}

impl KeyHandlerResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, KeyHandlerResult::Handled(_))
    }

    pub fn states(&self) -> &[InputState] {
        match self {
            KeyHandlerResult::Handled(states) | KeyHandlerResult::Unhandled(states) => states,
            KeyHandlerResult::Rejected(_) => &[],
        }
    }

    /// The resting state after this key, if the key produced one.
    pub fn last_state(&self) -> Option<&InputState> {
        self.states().last()
    }
}

fn handled(state: InputState) -> KeyHandlerResult {
    KeyHandlerResult::Handled(vec![state])
}

fn unhandled() -> KeyHandlerResult {
    KeyHandlerResult::Unhandled(Vec::new())
}

struct Checkpoint {
    composer: SyllableComposer,
    buffer: ComposingBuffer,
    walk: Walk,
}

pub struct KeyHandler {
    model: Rc<dyn LanguageModel>,
    composer: SyllableComposer,
    buffer: ComposingBuffer,
    grid_options: GridOptions,
    walk: Walk,
}

impl std::fmt::Debug for KeyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandler")
            .field("composer", &self.composer)
            .field("buffer", &self.buffer)
            .field("grid_options", &self.grid_options)
            .field("walk", &self.walk)
            .finish_non_exhaustive()
    }
}

impl KeyHandler {
    pub fn new(model: Rc<dyn LanguageModel>, layout: KeyboardLayout) -> Self {
        Self {
            model,
            composer: SyllableComposer::new(layout),
            buffer: ComposingBuffer::new(),
            grid_options: GridOptions::default(),
            walk: Walk::default(),
        }
    }

    pub fn with_grid_options(mut self, options: GridOptions) -> Self {
        self.grid_options = options;
        self
    }

    pub fn model(&self) -> &dyn LanguageModel {
        self.model.as_ref()
    }

    pub fn layout(&self) -> KeyboardLayout {
        self.composer.layout()
    }

    pub fn buffer(&self) -> &ComposingBuffer {
        &self.buffer
    }

    pub fn walk(&self) -> &Walk {
        &self.walk
    }

    /// Drop the buffer and the partial syllable.
    pub fn reset(&mut self) {
        self.composer.clear();
        self.buffer.clear();
        self.walk = Walk::default();
    }

    /// Handle one key event against the state last published.
    pub fn handle(&mut self, input: &KeyEvent, state: &InputState, prefs: &Preferences) -> KeyHandlerResult {
        if let Err(err) = input.validate() {
            tracing::warn!(error = %err, "malformed key event");
            return KeyHandlerResult::Rejected(err);
        }

        let checkpoint = self.checkpoint();
        let result = self.dispatch(input, state, prefs);
        match &result {
            KeyHandlerResult::Rejected(err) => {
                self.restore(checkpoint);
                tracing::debug!(key = ?input.text, key_code = input.key_code, state = state.name(), error = %err, "key rejected");
            }
            KeyHandlerResult::Handled(states) => {
                let to: Vec<&str> = states.iter().map(InputState::name).collect();
                tracing::trace!(key = ?input.text, from = state.name(), ?to, "key handled");
            }
            KeyHandlerResult::Unhandled(_) => {
                tracing::trace!(key = ?input.text, key_code = input.key_code, "key passed through");
            }
        }
        result
    }

    /// Callback form of `handle`. `on_state` receives every published state
    /// in order and `on_error` fires for rejected keys. Returns whether the
    /// key was consumed.
    pub fn handle_with_callbacks<S, E>(
        &mut self,
        input: &KeyEvent,
        state: &InputState,
        prefs: &Preferences,
        mut on_state: S,
        mut on_error: E,
    ) -> bool
    where
        S: FnMut(InputState),
        E: FnMut(KeyHandlerError),
    {
        match self.handle(input, state, prefs) {
            KeyHandlerResult::Handled(states) => {
                states.into_iter().for_each(&mut on_state);
                true
            }
            KeyHandlerResult::Rejected(err) => {
                on_error(err);
                true
            }
            KeyHandlerResult::Unhandled(states) => {
                states.into_iter().for_each(&mut on_state);
                false
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            composer: self.composer.clone(),
            buffer: self.buffer.clone(),
            walk: self.walk.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.composer = checkpoint.composer;
        self.buffer = checkpoint.buffer;
        self.walk = checkpoint.walk;
    }

    fn dispatch(&mut self, input: &KeyEvent, state: &InputState, prefs: &Preferences) -> KeyHandlerResult {
        if input.modifiers.command {
            // the host keeps the shortcut, but an open list still goes away
            if matches!(state, InputState::AssociatedPhrases { .. }) {
                self.reset();
                return KeyHandlerResult::Unhandled(vec![InputState::EmptyIgnoringPreviousState]);
            }
            return unhandled();
        }
        match state {
            InputState::Empty | InputState::EmptyIgnoringPreviousState | InputState::Committing { .. } => {
                self.reset();
                self.handle_composing(input, prefs)
            }
            InputState::Inputting { .. } => {
                self.buffer.clear_marker();
                self.handle_composing(input, prefs)
            }
            InputState::Marking { .. } => self.handle_marking(input, prefs),
            InputState::ChoosingCandidate {
                location, candidates, ..
            } => self.handle_choosing(input, *location, candidates, prefs),
            InputState::AssociatedPhrases { key, candidates } => {
                self.handle_associated(input, key, candidates, prefs)
            }
        }
    }

    // ========== Composing ==========

    fn handle_composing(&mut self, input: &KeyEvent, prefs: &Preferences) -> KeyHandlerResult {
        let ch = input.input_char().filter(|_| !input.modifiers.ctrl);

        if let Some(c) = ch.filter(|&c| self.is_composer_key(c)) {
            match self.composer.apply(c) {
                ComposerResult::Composing => return handled(self.inputting_state()),
                ComposerResult::Completed(reading) => return self.insert_reading(reading, prefs),
                ComposerResult::Ignored if self.is_tone_key(c) => {
                    return KeyHandlerResult::Rejected(KeyHandlerError::IncompleteSyllable);
                }
                // not part of this syllable; the key is looked at like any other
                ComposerResult::Ignored => {}
            }
        }

        if !self.composer.is_empty() {
            return self.handle_with_partial_syllable(input, prefs);
        }

        if input.is_space() || input.is_enter() {
            if self.buffer.is_empty() {
                return unhandled();
            }
            return KeyHandlerResult::Handled(self.commit(prefs));
        }

        if input.is_esc() {
            if self.buffer.is_empty() {
                return unhandled();
            }
            self.reset();
            return handled(InputState::EmptyIgnoringPreviousState);
        }

        if input.is_backspace() || input.is_delete() {
            if self.buffer.is_empty() {
                return unhandled();
            }
            let deleted = if input.is_delete() {
                self.buffer.delete_after()
            } else {
                self.buffer.delete_before()
            };
            if !deleted {
                return KeyHandlerResult::Rejected(KeyHandlerError::CursorAtBoundary);
            }
            if self.buffer.is_empty() {
                self.reset();
                return handled(InputState::EmptyIgnoringPreviousState);
            }
            self.rewalk();
            return handled(self.inputting_state());
        }

        if input.is_open_candidates() && !input.modifiers.shift {
            if self.buffer.is_empty() {
                return unhandled();
            }
            let location = self.location_at_cursor();
            return handled(self.choosing_state(location, prefs));
        }

        if input.is_cursor_backward() || input.is_cursor_forward() || input.is_home() || input.is_end() {
            if self.buffer.is_empty() {
                return unhandled();
            }
            return self.move_cursor(input);
        }

        if let Some(c) = input.input_char() {
            if let Some(m) = punctuation::lookup(c, &input.modifiers, prefs.half_width_punctuation_enabled) {
                return self.insert_punctuation(m, prefs);
            }
        }

        if self.buffer.is_empty() {
            unhandled()
        } else {
            KeyHandlerResult::Rejected(KeyHandlerError::UnexpectedKey(input.text.clone()))
        }
    }

    /// Whether a key goes to the composer. A key that can only be a tone
    /// counts once something has been composed.
    fn is_composer_key(&self, c: char) -> bool {
        let components = self.composer.layout().components(c);
        let tone_only = components.iter().all(|component| matches!(component, Component::Tone(_)));
        !components.is_empty() && (!self.composer.is_empty() || !tone_only)
    }

    fn is_tone_key(&self, c: char) -> bool {
        self.composer
            .layout()
            .components(c)
            .iter()
            .any(|component| matches!(component, Component::Tone(_)))
    }

    fn handle_with_partial_syllable(&mut self, input: &KeyEvent, prefs: &Preferences) -> KeyHandlerResult {
        if input.is_space() || input.is_enter() {
            return match self.composer.finish() {
                Some(reading) => self.insert_reading(reading, prefs),
                None => KeyHandlerResult::Rejected(KeyHandlerError::IncompleteSyllable),
            };
        }
        if input.is_esc() {
            self.composer.clear();
        } else if input.is_backspace() {
            self.composer.backspace();
        } else {
            return KeyHandlerResult::Rejected(KeyHandlerError::ComposingInProgress);
        }
        if self.composer.is_empty() && self.buffer.is_empty() {
            handled(InputState::EmptyIgnoringPreviousState)
        } else {
            handled(self.inputting_state())
        }
    }

    fn move_cursor(&mut self, input: &KeyEvent) -> KeyHandlerResult {
        if input.modifiers.shift && (input.is_cursor_backward() || input.is_cursor_forward()) {
            let moved = if input.is_cursor_backward() {
                self.buffer.mark_backward()
            } else {
                self.buffer.mark_forward()
            };
            if !moved {
                return KeyHandlerResult::Rejected(KeyHandlerError::CursorAtBoundary);
            }
            return handled(self.marking_or_inputting_state());
        }

        let moved = if input.is_cursor_backward() {
            self.buffer.move_left()
        } else if input.is_cursor_forward() {
            self.buffer.move_right()
        } else if input.is_home() {
            self.buffer.move_to_start()
        } else {
            self.buffer.move_to_end()
        };
        if moved {
            handled(self.inputting_state())
        } else {
            KeyHandlerResult::Rejected(KeyHandlerError::CursorAtBoundary)
        }
    }

    fn insert_reading(&mut self, reading: String, prefs: &Preferences) -> KeyHandlerResult {
        if !self.overlay().has_unigrams(&reading) {
            return KeyHandlerResult::Rejected(KeyHandlerError::UnknownReading(reading));
        }
        self.buffer.insert_reading(reading);
        self.rewalk();

        if prefs.is_plain() {
            return self.resolve_plain(prefs);
        }
        let mut states = self.commit_overflow(prefs);
        states.push(self.inputting_state());
        KeyHandlerResult::Handled(states)
    }

    fn insert_punctuation(&mut self, m: PunctuationMatch, prefs: &Preferences) -> KeyHandlerResult {
        match m {
            PunctuationMatch::Literal { reading } => self.insert_reading(reading, prefs),
            PunctuationMatch::Candidates { reading } => {
                self.buffer.insert_reading(reading);
                self.rewalk();
                let mut states = if prefs.is_plain() {
                    Vec::new()
                } else {
                    self.commit_overflow(prefs)
                };
                let location = self.buffer.cursor().saturating_sub(1);
                states.push(self.choosing_state(location, prefs));
                KeyHandlerResult::Handled(states)
            }
        }
    }

    /// Plain mode resolves the reading just typed: a lone candidate commits,
    /// several open the candidate list.
    fn resolve_plain(&mut self, prefs: &Preferences) -> KeyHandlerResult {
        let location = self.buffer.cursor().saturating_sub(1);
        let candidates = self.grid().candidates_at(location);
        if candidates.len() == 1 {
            return KeyHandlerResult::Handled(self.commit(prefs));
        }
        handled(self.choosing_state(location, prefs))
    }

    /// Commit leading phrases while the buffer is over the configured size.
    fn commit_overflow(&mut self, prefs: &Preferences) -> Vec<InputState> {
        let limit = prefs.composing_buffer_size.max(1);
        let mut text = String::new();
        while self.buffer.len() > limit {
            let Some(step) = self.walk.steps().first().cloned() else {
                break;
            };
            text.push_str(&step.value);
            self.buffer.drain_front(step.len);
            self.rewalk();
        }
        if text.is_empty() {
            return Vec::new();
        }
        tracing::debug!(text = %text, "buffer full, committed leading phrases");
        vec![InputState::Committing { text }]
    }

    /// Commit the whole buffer, followed by associated phrases if any.
    fn commit(&mut self, prefs: &Preferences) -> Vec<InputState> {
        let text = self.walk.text();
        self.reset();
        let next = associated_phrases_state(self.model.as_ref(), &text, prefs).unwrap_or(InputState::Empty);
        vec![InputState::Committing { text }, next]
    }

    // ========== Candidates ==========

    fn handle_choosing(
        &mut self,
        input: &KeyEvent,
        location: usize,
        candidates: &CandidateList,
        prefs: &Preferences,
    ) -> KeyHandlerResult {
        if input.is_esc() || input.is_backspace() || input.is_delete() {
            self.reset();
            return handled(InputState::EmptyIgnoringPreviousState);
        }

        let mut list = candidates.clone();
        let ch = input.input_char().filter(|_| !input.modifiers.ctrl);

        if let Some(index) = ch.and_then(|c| prefs.selection_key_index(c)) {
            return match list.select_by_index(index).cloned() {
                Some(candidate) => self.choose_candidate(location, &candidate, prefs),
                None => KeyHandlerResult::Rejected(KeyHandlerError::CandidateOutOfRange(index)),
            };
        }

        if input.is_enter() {
            return match list.selected_candidate().cloned() {
                Some(candidate) => self.choose_candidate(location, &candidate, prefs),
                None => KeyHandlerResult::Rejected(KeyHandlerError::CandidateOutOfRange(0)),
            };
        }

        if input.is_space() || input.is_page_down() || input.is_page_up() {
            if input.is_page_up() {
                list.page_up_wrapping();
            } else {
                list.page_down_wrapping();
            }
            return handled(self.with_candidates(location, list));
        }

        if let Some(moved) = navigate(&mut list, input) {
            return if moved {
                handled(self.with_candidates(location, list))
            } else {
                KeyHandlerResult::Rejected(KeyHandlerError::CursorAtBoundary)
            };
        }

        if prefs.is_plain() {
            if let Some(c) = input.input_char() {
                let starts_input = (!input.modifiers.ctrl && self.composer.is_valid_key(c))
                    || punctuation::lookup(c, &input.modifiers, prefs.half_width_punctuation_enabled)
                        .is_some();
                if starts_input {
                    return self.choose_and_continue(input, location, &list, prefs);
                }
            }
        }

        KeyHandlerResult::Rejected(KeyHandlerError::UnexpectedKey(input.text.clone()))
    }

    /// Plain mode: take the highlighted candidate, then treat the key as the
    /// start of the next input.
    fn choose_and_continue(
        &mut self,
        input: &KeyEvent,
        location: usize,
        list: &CandidateList,
        prefs: &Preferences,
    ) -> KeyHandlerResult {
        let Some(candidate) = list.selected_candidate().cloned() else {
            return KeyHandlerResult::Rejected(KeyHandlerError::CandidateOutOfRange(0));
        };
        let mut states = match self.choose_candidate(location, &candidate, prefs) {
            KeyHandlerResult::Handled(states) => states,
            other => return other,
        };
        match self.handle(input, &InputState::Empty, prefs) {
            KeyHandlerResult::Handled(next) => states.extend(next),
            // the commit stands even if the key itself goes nowhere
            KeyHandlerResult::Rejected(_) | KeyHandlerResult::Unhandled(_) => {}
        }
        KeyHandlerResult::Handled(states)
    }

    fn choose_candidate(&mut self, location: usize, candidate: &Candidate, prefs: &Preferences) -> KeyHandlerResult {
        let span = candidate.span.max(1);
        self.buffer.pin(Pin::new(location, span, candidate.text.as_str()));
        self.rewalk();
        tracing::debug!(location, span, text = %candidate.text, "candidate chosen");

        if prefs.is_plain() {
            return KeyHandlerResult::Handled(self.commit(prefs));
        }
        let mut states = self.commit_overflow(prefs);
        states.push(self.inputting_state());
        KeyHandlerResult::Handled(states)
    }

    fn with_candidates(&self, location: usize, candidates: CandidateList) -> InputState {
        let (composing_buffer, cursor_index) = self.composing_text();
        InputState::ChoosingCandidate {
            composing_buffer,
            cursor_index,
            location,
            candidates,
        }
    }

    fn choosing_state(&self, location: usize, prefs: &Preferences) -> InputState {
        let candidates = CandidateList::from_candidates(self.grid().candidates_at(location), prefs.page_size());
        self.with_candidates(location, candidates)
    }

    /// Start of the walked phrase under the cursor; the last phrase when the
    /// cursor is at the end.
    fn location_at_cursor(&self) -> usize {
        let position = self.buffer.cursor().min(self.buffer.len().saturating_sub(1));
        self.walk
            .step_covering(position)
            .map_or(position, |step| step.start)
    }

    // ========== Associated phrases ==========

    fn handle_associated(
        &mut self,
        input: &KeyEvent,
        key: &str,
        candidates: &CandidateList,
        prefs: &Preferences,
    ) -> KeyHandlerResult {
        if input.is_esc() || input.is_backspace() || input.is_delete() {
            self.reset();
            return handled(InputState::EmptyIgnoringPreviousState);
        }

        let mut list = candidates.clone();
        let ch = input.input_char().filter(|_| !input.modifiers.ctrl);
        let chosen = match ch.and_then(|c| prefs.selection_key_index(c)) {
            Some(index) => match list.select_by_index(index).cloned() {
                Some(candidate) => Some(candidate),
                None => return KeyHandlerResult::Rejected(KeyHandlerError::CandidateOutOfRange(index)),
            },
            None if input.is_enter() => list.selected_candidate().cloned(),
            None => None,
        };
        if let Some(candidate) = chosen {
            self.reset();
            let next = associated_phrases_state(self.model.as_ref(), &candidate.text, prefs)
                .unwrap_or(InputState::Empty);
            return KeyHandlerResult::Handled(vec![InputState::Committing { text: candidate.text }, next]);
        }

        if input.is_page_down() || input.is_page_up() {
            if input.is_page_up() {
                list.page_up_wrapping();
            } else {
                list.page_down_wrapping();
            }
            return handled(associated_with(key, list));
        }

        if let Some(moved) = navigate(&mut list, input) {
            return if moved {
                handled(associated_with(key, list))
            } else {
                KeyHandlerResult::Rejected(KeyHandlerError::CursorAtBoundary)
            };
        }

        // anything else dismisses the list and starts over
        let cancel = InputState::EmptyIgnoringPreviousState;
        match self.handle(input, &InputState::Empty, prefs) {
            KeyHandlerResult::Handled(states) => {
                KeyHandlerResult::Handled(std::iter::once(cancel).chain(states).collect())
            }
            KeyHandlerResult::Unhandled(states) => {
                KeyHandlerResult::Unhandled(std::iter::once(cancel).chain(states).collect())
            }
            rejected @ KeyHandlerResult::Rejected(_) => rejected,
        }
    }

    // ========== Marking ==========

    fn handle_marking(&mut self, input: &KeyEvent, prefs: &Preferences) -> KeyHandlerResult {
        if input.modifiers.shift && (input.is_cursor_backward() || input.is_cursor_forward()) {
            // moving past either edge leaves the mark as it is
            if input.is_cursor_backward() {
                self.buffer.mark_backward();
            } else {
                self.buffer.mark_forward();
            }
            return handled(self.marking_or_inputting_state());
        }

        if input.is_enter() {
            return self.learn_marked_phrase();
        }

        if input.is_esc() {
            self.buffer.clear_marker();
            return handled(self.inputting_state());
        }

        self.buffer.clear_marker();
        self.handle_composing(input, prefs)
    }

    fn learn_marked_phrase(&mut self) -> KeyHandlerResult {
        let Some(range) = self.buffer.mark_range() else {
            return KeyHandlerResult::Rejected(KeyHandlerError::InvalidMark("nothing marked".into()));
        };
        let (text, reading) = self.marked_phrase(&range);
        if let Err(reason) = self.validate_mark(&range, &text, &reading) {
            return KeyHandlerResult::Rejected(KeyHandlerError::InvalidMark(reason));
        }
        if let Err(err) = self.model.add_user_phrase(&reading, &text) {
            tracing::warn!(reading = %reading, text = %text, error = %err, "cannot learn phrase");
            return KeyHandlerResult::Rejected(KeyHandlerError::UserPhrase(err.to_string()));
        }
        tracing::debug!(reading = %reading, text = %text, "learned marked phrase");
        self.buffer.clear_marker();
        self.rewalk();
        handled(self.inputting_state())
    }

    /// Display text and joined reading for a marked reading range.
    fn marked_phrase(&self, range: &Range<usize>) -> (String, String) {
        let text = self.walk.text();
        let start = self.walk.display_index(range.start);
        let end = self.walk.display_index(range.end);
        let marked: String = text.chars().skip(start).take(end.saturating_sub(start)).collect();
        let reading = join_readings(&self.buffer.readings()[range.clone()]);
        (marked, reading)
    }

    fn validate_mark(&self, range: &Range<usize>, text: &str, reading: &str) -> Result<(), String> {
        let len = range.len();
        if len < MIN_MARKED_READINGS {
            return Err(format!("at least {MIN_MARKED_READINGS} syllables are needed"));
        }
        if len > self.grid_options.max_span_length {
            return Err(format!("at most {} syllables can be learned", self.grid_options.max_span_length));
        }
        if self.buffer.readings()[range.clone()]
            .iter()
            .any(|r| punctuation::is_punctuation_reading(r))
        {
            return Err("punctuation cannot be learned".into());
        }
        if text.chars().count() != len {
            return Err("marked text does not match its syllables".into());
        }
        if self.model.has_user_phrase(reading, text) {
            return Err(format!("{text} is already a user phrase"));
        }
        Ok(())
    }

    fn marking_or_inputting_state(&mut self) -> InputState {
        let Some(range) = self.buffer.mark_range() else {
            self.buffer.clear_marker();
            return self.inputting_state();
        };
        let (composing_buffer, _) = self.composing_text();
        let (marked_text, reading) = self.marked_phrase(&range);
        let acceptable = self.validate_mark(&range, &marked_text, &reading).is_ok();
        let marker = self.buffer.marker().unwrap_or(range.start);
        InputState::Marking {
            composing_buffer,
            cursor_index: self.walk.display_index(marker),
            mark_start: self.walk.display_index(range.start),
            mark_end: self.walk.display_index(range.end),
            marked_text,
            reading,
            acceptable,
        }
    }

    // ========== Helpers ==========

    fn overlay(&self) -> PunctuationOverlay<'_> {
        PunctuationOverlay::new(self.model.as_ref())
    }

    fn grid(&self) -> PhraseGrid {
        PhraseGrid::build(self.buffer.readings(), &self.overlay(), self.grid_options)
    }

    fn rewalk(&mut self) {
        self.walk = self.grid().walk(self.buffer.pins());
    }

    fn inputting_state(&self) -> InputState {
        let (composing_buffer, cursor_index) = self.composing_text();
        InputState::Inputting {
            composing_buffer,
            cursor_index,
        }
    }

    /// The walked text with the partial syllable spliced in at the cursor,
    /// and the cursor in characters.
    fn composing_text(&self) -> (String, usize) {
        let text = self.walk.text();
        let cursor = self.walk.display_index(self.buffer.cursor());
        let partial = self.composer.composed();
        if partial.is_empty() {
            return (text, cursor);
        }
        let at = text.char_indices().nth(cursor).map_or(text.len(), |(i, _)| i);
        let mut out = String::with_capacity(text.len() + partial.len());
        out.push_str(&text[..at]);
        out.push_str(&partial);
        out.push_str(&text[at..]);
        (out, cursor + partial.chars().count())
    }
}

/// Arrow keys and Home/End on a candidate list. `None` for other keys,
/// otherwise whether the highlight moved.
fn navigate(list: &mut CandidateList, input: &KeyEvent) -> Option<bool> {
    if input.is_up() || input.is_left() {
        Some(list.select_previous())
    } else if input.is_down() || input.is_right() {
        Some(list.select_next())
    } else if input.is_home() {
        Some(list.select_global(0))
    } else if input.is_end() {
        Some(list.select_global(list.len().saturating_sub(1)))
    } else {
        None
    }
}

fn associated_with(key: &str, candidates: CandidateList) -> InputState {
    InputState::AssociatedPhrases {
        key: key.to_string(),
        candidates,
    }
}
