//! Punctuation table.
//!
//! Punctuation is inserted into the composing buffer as a pseudo reading
//! (`_punctuation_<`, `_half_punctuation_<`, `_ctrl_punctuation_,`) so it
//! takes part in the phrase grid like any syllable. `PunctuationOverlay`
//! answers those readings on top of the real language model.

use crate::key_event::Modifiers;
use libbopomofo_core::{LanguageModel, ModelError, Unigram};
use phf::phf_map;

pub const FULL_WIDTH_PREFIX: &str = "_punctuation_";
pub const HALF_WIDTH_PREFIX: &str = "_half_punctuation_";
pub const CTRL_PREFIX: &str = "_ctrl_punctuation_";

const SYMBOL_MENU: &[&str] = &[
    "，", "、", "。", "．", "？", "！", "；", "：", "‧", "‥", "﹐", "﹒", "˙", "·", "‘", "’",
    "“", "”", "〝", "〞", "‵", "′", "〃", "～", "＄", "％", "＠", "＆", "＃", "＊",
];

static FULL_WIDTH: phf::Map<char, &'static [&'static str]> = phf_map! {
    '`' => SYMBOL_MENU,
    '<' => &["，", "＜"],
    '>' => &["。", "＞"],
    '!' => &["！"],
    '@' => &["＠"],
    '#' => &["＃"],
    '$' => &["＄"],
    '%' => &["％"],
    '^' => &["︿"],
    '&' => &["＆"],
    '*' => &["＊"],
    '(' => &["（"],
    ')' => &["）"],
    '_' => &["——"],
    '+' => &["＋"],
    '=' => &["＝"],
    '{' => &["『"],
    '}' => &["』"],
    '[' => &["「"],
    ']' => &["」"],
    ':' => &["："],
    '"' => &["；"],
    '\'' => &["、"],
    '?' => &["？"],
    '|' => &["｜"],
    '\\' => &["＼"],
    '~' => &["～", "〜"],
};

static HALF_WIDTH: phf::Map<char, &'static str> = phf_map! {
    '<' => ",",
    '>' => ".",
    '!' => "!",
    '@' => "@",
    '#' => "#",
    '$' => "$",
    '%' => "%",
    '^' => "^",
    '&' => "&",
    '*' => "*",
    '(' => "(",
    ')' => ")",
    '_' => "_",
    '+' => "+",
    '=' => "=",
    '{' => "{",
    '}' => "}",
    '[' => "[",
    ']' => "]",
    ':' => ":",
    '"' => ";",
    '\'' => "'",
    '?' => "?",
    '|' => "|",
    '\\' => "\\",
    '~' => "~",
};

static CTRL: phf::Map<char, &'static [&'static str]> = phf_map! {
    ',' => &["，"],
    '.' => &["。"],
    ';' => &["；"],
    '\'' => &["、"],
    '/' => &["？"],
    '[' => &["「", "『"],
    ']' => &["」", "』"],
    '1' => &["！"],
    '-' => &["——", "－"],
};

/// How the key handler should present a punctuation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PunctuationMatch {
    /// One option: append it and keep composing.
    Literal { reading: String },
    /// Several options: open a candidate list on the new reading.
    Candidates { reading: String },
}

impl PunctuationMatch {
    pub fn reading(&self) -> &str {
        match self {
            PunctuationMatch::Literal { reading } | PunctuationMatch::Candidates { reading } => reading,
        }
    }
}

/// Look up a key. Half-width mapping wins when enabled, except for keys
/// with a symbol menu, which always offer candidates.
pub fn lookup(key: char, modifiers: &Modifiers, half_width: bool) -> Option<PunctuationMatch> {
    let (reading, options) = if modifiers.ctrl {
        (format!("{CTRL_PREFIX}{key}"), CTRL.get(&key)?.len())
    } else {
        match (half_width, HALF_WIDTH.get(&key)) {
            (true, Some(_)) => (format!("{HALF_WIDTH_PREFIX}{key}"), 1),
            _ => (format!("{FULL_WIDTH_PREFIX}{key}"), FULL_WIDTH.get(&key)?.len()),
        }
    };
    Some(if options > 1 {
        PunctuationMatch::Candidates { reading }
    } else {
        PunctuationMatch::Literal { reading }
    })
}

/// Values for a punctuation pseudo reading, or `None` for ordinary readings.
pub fn values_for_reading(reading: &str) -> Option<Vec<&'static str>> {
    let one_key = |rest: &str| {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    };
    if let Some(rest) = reading.strip_prefix(HALF_WIDTH_PREFIX) {
        return HALF_WIDTH.get(&one_key(rest)?).map(|v| vec![*v]);
    }
    if let Some(rest) = reading.strip_prefix(CTRL_PREFIX) {
        return CTRL.get(&one_key(rest)?).map(|v| v.to_vec());
    }
    if let Some(rest) = reading.strip_prefix(FULL_WIDTH_PREFIX) {
        return FULL_WIDTH.get(&one_key(rest)?).map(|v| v.to_vec());
    }
    None
}

pub fn is_punctuation_reading(reading: &str) -> bool {
    reading.starts_with('_')
}

/// Language model that resolves punctuation readings and defers the rest.
pub struct PunctuationOverlay<'a> {
    inner: &'a dyn LanguageModel,
}

impl<'a> PunctuationOverlay<'a> {
    pub fn new(inner: &'a dyn LanguageModel) -> Self {
        Self { inner }
    }
}

impl LanguageModel for PunctuationOverlay<'_> {
    fn unigrams(&self, key: &str) -> Vec<Unigram> {
        match values_for_reading(key) {
            Some(values) => values.into_iter().map(|v| Unigram::new(v, 0.0)).collect(),
            // spans mixing punctuation with syllables never match
            None if key.contains(FULL_WIDTH_PREFIX) => Vec::new(),
            None => self.inner.unigrams(key),
        }
    }

    fn associated_phrases(&self, key: &str) -> Vec<String> {
        self.inner.associated_phrases(key)
    }

    fn add_user_phrase(&self, reading: &str, value: &str) -> Result<(), ModelError> {
        self.inner.add_user_phrase(reading, value)
    }

    fn has_user_phrase(&self, reading: &str, value: &str) -> bool {
        self.inner.has_user_phrase(reading, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libbopomofo_core::{BopomofoModel, Config, Lexicon};

    const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        option: false,
        command: false,
    };

    #[test]
    fn full_width_angle_brackets_offer_candidates() {
        let m = lookup('<', &NONE, false).unwrap();
        assert_eq!(m, PunctuationMatch::Candidates { reading: "_punctuation_<".into() });
        assert_eq!(values_for_reading(m.reading()).unwrap()[0], "，");
    }

    #[test]
    fn half_width_is_literal() {
        let m = lookup('<', &NONE, true).unwrap();
        assert_eq!(m, PunctuationMatch::Literal { reading: "_half_punctuation_<".into() });
        assert_eq!(values_for_reading(m.reading()), Some(vec![","]));
    }

    #[test]
    fn backtick_menu_ignores_half_width() {
        let m = lookup('`', &NONE, true).unwrap();
        assert!(matches!(m, PunctuationMatch::Candidates { .. }));
        assert!(values_for_reading(m.reading()).unwrap().contains(&"，"));
    }

    #[test]
    fn ctrl_table_is_separate() {
        let ctrl = Modifiers { ctrl: true, ..NONE };
        let m = lookup(',', &ctrl, false).unwrap();
        assert_eq!(m, PunctuationMatch::Literal { reading: "_ctrl_punctuation_,".into() });
        assert!(lookup(',', &NONE, false).is_none());
        assert!(lookup('a', &ctrl, false).is_none());
    }

    #[test]
    fn overlay_defers_to_inner_model() {
        let model = BopomofoModel::new(Lexicon::from_text("ㄋㄧˇ 你 -3").unwrap(), Config::default());
        let overlay = PunctuationOverlay::new(&model);
        assert_eq!(overlay.unigrams("ㄋㄧˇ").len(), 1);
        assert_eq!(overlay.unigrams("_punctuation_!"), vec![Unigram::new("！", 0.0)]);
        assert!(overlay.unigrams("ㄋㄧˇ-_punctuation_!").is_empty());
        assert!(overlay.unigrams("_punctuation_ab").is_empty());
    }
}
