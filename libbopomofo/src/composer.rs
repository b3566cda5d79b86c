//! Syllable composer: turns key presses into one Bopomofo reading.

use crate::layout::KeyboardLayout;
use crate::syllable::{Component, Slot, Syllable, Tone};

/// Outcome of feeding one key to the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerResult {
    /// The key filled or replaced a slot; the syllable is still open.
    Composing,
    /// A tone key finished the syllable. Carries the rendered reading; the
    /// composer is empty again.
    Completed(String),
    /// Not a phonetic key here, or it would make an invalid syllable.
    /// Nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllableComposer {
    layout: KeyboardLayout,
    syllable: Syllable,
    // most recently filled slot last
    fill_order: Vec<Slot>,
    // ambiguous layouts only: keys accepted so far
    keys: Vec<char>,
}

impl SyllableComposer {
    pub fn new(layout: KeyboardLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> KeyboardLayout {
        self.layout
    }

    pub fn is_valid_key(&self, key: char) -> bool {
        self.layout.is_phonetic_key(key)
    }

    pub fn apply(&mut self, key: char) -> ComposerResult {
        if self.layout.is_ambiguous() {
            return self.apply_sequence(key);
        }
        let Some(&component) = self.layout.components(key).first() else {
            return ComposerResult::Ignored;
        };

        if let Component::Tone(tone) = component {
            return self.complete(tone).map_or(ComposerResult::Ignored, ComposerResult::Completed);
        }

        let next = self.syllable.with(component);
        if !next.is_valid_prefix() {
            tracing::trace!(key = %key, composed = %next.composed(), "invalid syllable, key ignored");
            return ComposerResult::Ignored;
        }
        let slot = component.slot();
        self.fill_order.retain(|s| *s != slot);
        self.fill_order.push(slot);
        self.syllable = next;
        ComposerResult::Composing
    }

    /// Re-read the whole key sequence with `key` appended. Earlier keys may
    /// change meaning, as with Hsu `g` read as ㄍ, then ㄐ once ㄧ follows.
    fn apply_sequence(&mut self, key: char) -> ComposerResult {
        let mut keys = self.keys.clone();
        keys.push(key);
        let Some(next) = resolve(self.layout, &keys, false) else {
            tracing::trace!(key = %key, keys = ?keys, "no reading for key sequence, key ignored");
            return ComposerResult::Ignored;
        };
        if next.tone.is_some() {
            self.clear();
            return ComposerResult::Completed(next.composed());
        }
        self.keys = keys;
        self.syllable = next;
        ComposerResult::Composing
    }

    /// Complete with tone 1 (space / enter). `None` if the syllable is not
    /// complete; the composer is left untouched then.
    pub fn finish(&mut self) -> Option<String> {
        if self.layout.is_ambiguous() {
            let syllable = resolve(self.layout, &self.keys, true)?;
            let reading = syllable.with(Component::Tone(Tone::One)).composed();
            self.clear();
            return Some(reading);
        }
        self.complete(Tone::One)
    }

    fn complete(&mut self, tone: Tone) -> Option<String> {
        if !self.syllable.is_complete() {
            return None;
        }
        let reading = self.syllable.with(Component::Tone(tone)).composed();
        self.clear();
        Some(reading)
    }

    /// Remove the most recently filled slot (or typed key, for ambiguous
    /// layouts). False when nothing is filled.
    pub fn backspace(&mut self) -> bool {
        if self.layout.is_ambiguous() {
            if self.keys.pop().is_none() {
                return false;
            }
            self.syllable = resolve(self.layout, &self.keys, false).unwrap_or_default();
            return true;
        }
        match self.fill_order.pop() {
            Some(slot) => {
                self.syllable = self.syllable.without(slot);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.syllable = Syllable::default();
        self.fill_order.clear();
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.syllable.is_empty()
    }

    /// The partial syllable as text.
    pub fn composed(&self) -> String {
        self.syllable.composed()
    }
}

/// First reading of `keys`, trying each key's components in layout order.
/// Components must fill slots in writing order; a tone may only be the last
/// key and needs a complete syllable. With `finishing` there is no tone key
/// and the result itself must be complete.
fn resolve(layout: KeyboardLayout, keys: &[char], finishing: bool) -> Option<Syllable> {
    search(layout, keys, Syllable::default(), None, finishing)
}

fn search(
    layout: KeyboardLayout,
    keys: &[char],
    syllable: Syllable,
    last: Option<Slot>,
    finishing: bool,
) -> Option<Syllable> {
    let Some((&key, rest)) = keys.split_first() else {
        return (!finishing || syllable.is_complete()).then_some(syllable);
    };
    for &component in layout.components(key) {
        let slot = component.slot();
        if last.is_some_and(|l| slot <= l) {
            continue;
        }
        if let Component::Tone(_) = component {
            if rest.is_empty() && !finishing && syllable.is_complete() {
                return Some(syllable.with(component));
            }
            continue;
        }
        let next = layout.adjust(syllable.with(component));
        if !next.is_valid_prefix() {
            continue;
        }
        if let Some(found) = search(layout, rest, next, Some(slot), finishing) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(c: &mut SyllableComposer, keys: &str) -> Vec<ComposerResult> {
        keys.chars().map(|k| c.apply(k)).collect()
    }

    #[test]
    fn tone_key_completes() {
        let mut c = SyllableComposer::new(KeyboardLayout::Standard);
        let results = feed(&mut c, "su3");
        assert_eq!(results[0], ComposerResult::Composing);
        assert_eq!(results[2], ComposerResult::Completed("ㄋㄧˇ".into()));
        assert!(c.is_empty());
    }

    #[test]
    fn same_category_replaces() {
        let mut c = SyllableComposer::new(KeyboardLayout::Standard);
        feed(&mut c, "sa");
        assert_eq!(c.composed(), "ㄇ");
        feed(&mut c, "u");
        assert_eq!(c.composed(), "ㄇㄧ");
    }

    #[test]
    fn tone_without_vowel_is_ignored() {
        let mut c = SyllableComposer::new(KeyboardLayout::Standard);
        assert_eq!(c.apply('3'), ComposerResult::Ignored);
        c.apply('1');
        assert_eq!(c.apply('3'), ComposerResult::Ignored);
        assert_eq!(c.composed(), "ㄅ");
    }

    #[test]
    fn invalid_combination_is_ignored_without_mutation() {
        let mut c = SyllableComposer::new(KeyboardLayout::Standard);
        c.apply('r'); // ㄐ
        assert_eq!(c.apply('8'), ComposerResult::Ignored); // ㄐㄚ
        assert_eq!(c.composed(), "ㄐ");
        assert_eq!(c.apply('u'), ComposerResult::Composing);
        assert_eq!(c.composed(), "ㄐㄧ");
    }

    #[test]
    fn backspace_removes_last_filled_slot() {
        let mut c = SyllableComposer::new(KeyboardLayout::Standard);
        feed(&mut c, "lau"); // vowel, initial, medial
        assert_eq!(c.composed(), "ㄇㄧㄠ");
        assert!(c.backspace());
        assert_eq!(c.composed(), "ㄇㄠ");
        assert!(c.backspace());
        assert_eq!(c.composed(), "ㄠ");
        assert!(c.backspace());
        assert!(!c.backspace());
    }

    #[test]
    fn finish_uses_first_tone() {
        let mut c = SyllableComposer::new(KeyboardLayout::Standard);
        feed(&mut c, "aul");
        assert_eq!(c.finish(), Some("ㄇㄧㄠ".into()));
        c.apply('1');
        assert_eq!(c.finish(), None);
        assert_eq!(c.composed(), "ㄅ");
    }

    #[test]
    fn eten_layout() {
        let mut c = SyllableComposer::new(KeyboardLayout::Eten);
        let results = feed(&mut c, "ne3");
        assert_eq!(results[2], ComposerResult::Completed("ㄋㄧˇ".into()));
    }

    #[test]
    fn ibm_layout() {
        let mut c = SyllableComposer::new(KeyboardLayout::Ibm);
        assert_eq!(feed(&mut c, "7a,")[2], ComposerResult::Completed("ㄋㄧˇ".into()));
        assert_eq!(feed(&mut c, "-;,")[2], ComposerResult::Completed("ㄏㄠˇ".into()));
    }

    #[test]
    fn hsu_tone_keys_double_as_initials() {
        let mut c = SyllableComposer::new(KeyboardLayout::Hsu);
        assert_eq!(feed(&mut c, "nef")[2], ComposerResult::Completed("ㄋㄧˇ".into()));
        assert_eq!(feed(&mut c, "hwf")[2], ComposerResult::Completed("ㄏㄠˇ".into()));
        // d right after n: ㄉ cannot follow, so n is read as ㄣ and d as a tone
        assert_eq!(feed(&mut c, "nd")[1], ComposerResult::Completed("ㄣˊ".into()));
        assert!(c.is_empty());
    }

    #[test]
    fn hsu_reinterprets_earlier_keys() {
        let mut c = SyllableComposer::new(KeyboardLayout::Hsu);
        c.apply('g');
        assert_eq!(c.composed(), "ㄍ");
        c.apply('e');
        assert_eq!(c.composed(), "ㄐㄧ");
        assert!(c.backspace());
        assert_eq!(c.composed(), "ㄍ");
        assert_eq!(c.finish(), Some("ㄜ".into()));

        // a lone ㄥ is ㄦ
        assert_eq!(feed(&mut c, "lj")[1], ComposerResult::Completed("ㄦˋ".into()));
        c.apply('l');
        assert_eq!(c.finish(), Some("ㄦ".into()));

        // ㄐ without ㄧ or ㄩ is ㄓ
        feed(&mut c, "jy");
        assert_eq!(c.composed(), "ㄓㄚ");
    }

    #[test]
    fn eten26_layout() {
        let mut c = SyllableComposer::new(KeyboardLayout::Eten26);
        assert_eq!(feed(&mut c, "nej")[2], ComposerResult::Completed("ㄋㄧˇ".into()));
        assert_eq!(feed(&mut c, "hzj")[2], ComposerResult::Completed("ㄏㄠˇ".into()));
        c.apply('v');
        assert_eq!(c.composed(), "ㄍ");
        c.apply('e');
        assert_eq!(c.composed(), "ㄑㄧ");
        assert_eq!(c.finish(), Some("ㄑㄧ".into()));
        // a tone with nothing voiced is refused
        c.apply('b');
        assert_eq!(c.apply('f'), ComposerResult::Ignored);
        assert_eq!(c.composed(), "ㄅ");
    }
}
