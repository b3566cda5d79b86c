//! Keyboard layouts: which key produces which Bopomofo component.
//!
//! Standard, ETen and IBM give every key one component. Hsu and ETen26 put
//! up to three components on a key; the composer picks among them by looking
//! at the whole key sequence.

use crate::syllable::Component::{self, Initial as I, Medial as M, Tone as T, Vowel as V};
use crate::syllable::{Initial, Medial, Syllable, Tone, Vowel};
use phf::phf_map;
use serde::{Deserialize, Serialize};

type KeyTable = phf::Map<char, &'static [Component]>;

/// Standard (Dachen) layout.
static STANDARD: KeyTable = phf_map! {
    '1' => &[I(Initial::B)], 'q' => &[I(Initial::P)], 'a' => &[I(Initial::M)], 'z' => &[I(Initial::F)],
    '2' => &[I(Initial::D)], 'w' => &[I(Initial::T)], 's' => &[I(Initial::N)], 'x' => &[I(Initial::L)],
    'e' => &[I(Initial::G)], 'd' => &[I(Initial::K)], 'c' => &[I(Initial::H)],
    'r' => &[I(Initial::J)], 'f' => &[I(Initial::Q)], 'v' => &[I(Initial::X)],
    '5' => &[I(Initial::Zh)], 't' => &[I(Initial::Ch)], 'g' => &[I(Initial::Sh)], 'b' => &[I(Initial::R)],
    'y' => &[I(Initial::Z)], 'h' => &[I(Initial::C)], 'n' => &[I(Initial::S)],
    'u' => &[M(Medial::I)], 'j' => &[M(Medial::U)], 'm' => &[M(Medial::Yu)],
    '8' => &[V(Vowel::A)], 'i' => &[V(Vowel::O)], 'k' => &[V(Vowel::E)], ',' => &[V(Vowel::Eh)],
    '9' => &[V(Vowel::Ai)], 'o' => &[V(Vowel::Ei)], 'l' => &[V(Vowel::Ao)], '.' => &[V(Vowel::Ou)],
    '0' => &[V(Vowel::An)], 'p' => &[V(Vowel::En)], ';' => &[V(Vowel::Ang)], '/' => &[V(Vowel::Eng)],
    '-' => &[V(Vowel::Er)],
    '6' => &[T(Tone::Two)], '3' => &[T(Tone::Three)], '4' => &[T(Tone::Four)], '7' => &[T(Tone::Five)],
};

/// ETen layout.
static ETEN: KeyTable = phf_map! {
    'b' => &[I(Initial::B)], 'p' => &[I(Initial::P)], 'm' => &[I(Initial::M)], 'f' => &[I(Initial::F)],
    'd' => &[I(Initial::D)], 't' => &[I(Initial::T)], 'n' => &[I(Initial::N)], 'l' => &[I(Initial::L)],
    'v' => &[I(Initial::G)], 'k' => &[I(Initial::K)], 'h' => &[I(Initial::H)],
    'g' => &[I(Initial::J)], '7' => &[I(Initial::Q)], 'c' => &[I(Initial::X)],
    ',' => &[I(Initial::Zh)], '.' => &[I(Initial::Ch)], '/' => &[I(Initial::Sh)], 'j' => &[I(Initial::R)],
    ';' => &[I(Initial::Z)], '\'' => &[I(Initial::C)], 's' => &[I(Initial::S)],
    'e' => &[M(Medial::I)], 'x' => &[M(Medial::U)], 'u' => &[M(Medial::Yu)],
    'a' => &[V(Vowel::A)], 'o' => &[V(Vowel::O)], 'r' => &[V(Vowel::E)], 'w' => &[V(Vowel::Eh)],
    'i' => &[V(Vowel::Ai)], 'q' => &[V(Vowel::Ei)], 'z' => &[V(Vowel::Ao)], 'y' => &[V(Vowel::Ou)],
    '8' => &[V(Vowel::An)], '9' => &[V(Vowel::En)], '0' => &[V(Vowel::Ang)], '-' => &[V(Vowel::Eng)],
    '=' => &[V(Vowel::Er)],
    '2' => &[T(Tone::Two)], '3' => &[T(Tone::Three)], '4' => &[T(Tone::Four)], '1' => &[T(Tone::Five)],
};

/// IBM layout: consonants on the number row and the row below, then
/// medials, vowels and tones in order.
static IBM: KeyTable = phf_map! {
    '1' => &[I(Initial::B)], '2' => &[I(Initial::P)], '3' => &[I(Initial::M)], '4' => &[I(Initial::F)],
    '5' => &[I(Initial::D)], '6' => &[I(Initial::T)], '7' => &[I(Initial::N)], '8' => &[I(Initial::L)],
    '9' => &[I(Initial::G)], '0' => &[I(Initial::K)], '-' => &[I(Initial::H)],
    'q' => &[I(Initial::J)], 'w' => &[I(Initial::Q)], 'e' => &[I(Initial::X)],
    'r' => &[I(Initial::Zh)], 't' => &[I(Initial::Ch)], 'y' => &[I(Initial::Sh)], 'u' => &[I(Initial::R)],
    'i' => &[I(Initial::Z)], 'o' => &[I(Initial::C)], 'p' => &[I(Initial::S)],
    'a' => &[M(Medial::I)], 's' => &[M(Medial::U)], 'd' => &[M(Medial::Yu)],
    'f' => &[V(Vowel::A)], 'g' => &[V(Vowel::O)], 'h' => &[V(Vowel::E)], 'j' => &[V(Vowel::Eh)],
    'k' => &[V(Vowel::Ai)], 'l' => &[V(Vowel::Ei)], ';' => &[V(Vowel::Ao)], 'z' => &[V(Vowel::Ou)],
    'x' => &[V(Vowel::An)], 'c' => &[V(Vowel::En)], 'v' => &[V(Vowel::Ang)], 'b' => &[V(Vowel::Eng)],
    'n' => &[V(Vowel::Er)],
    'm' => &[T(Tone::Two)], ',' => &[T(Tone::Three)], '.' => &[T(Tone::Four)], '/' => &[T(Tone::Five)],
};

/// Hsu layout. ㄦ has no key of its own; a lone ㄥ becomes ㄦ.
static HSU: KeyTable = phf_map! {
    'b' => &[I(Initial::B)], 'p' => &[I(Initial::P)], 'm' => &[I(Initial::M), V(Vowel::An)],
    'f' => &[I(Initial::F), T(Tone::Three)], 'd' => &[I(Initial::D), T(Tone::Two)],
    't' => &[I(Initial::T)], 'n' => &[I(Initial::N), V(Vowel::En)], 'l' => &[I(Initial::L), V(Vowel::Eng)],
    'g' => &[I(Initial::G), V(Vowel::E)], 'k' => &[I(Initial::K), V(Vowel::Ang)],
    'h' => &[I(Initial::H), V(Vowel::O)],
    'j' => &[I(Initial::J), I(Initial::Zh), T(Tone::Four)],
    'v' => &[I(Initial::Q), I(Initial::Ch)], 'c' => &[I(Initial::X), I(Initial::Sh)],
    'r' => &[I(Initial::R)], 'z' => &[I(Initial::Z)], 'a' => &[I(Initial::C), V(Vowel::Ei)],
    's' => &[I(Initial::S), T(Tone::Five)],
    'e' => &[M(Medial::I), V(Vowel::Eh)], 'x' => &[M(Medial::U)], 'u' => &[M(Medial::Yu)],
    'y' => &[V(Vowel::A)], 'i' => &[V(Vowel::Ai)], 'w' => &[V(Vowel::Ao)], 'o' => &[V(Vowel::Ou)],
};

/// ETen 26-key layout.
static ETEN26: KeyTable = phf_map! {
    'b' => &[I(Initial::B)], 'p' => &[I(Initial::P), V(Vowel::Ou)], 'm' => &[I(Initial::M), V(Vowel::An)],
    'f' => &[I(Initial::F), T(Tone::Two)], 'd' => &[I(Initial::D), T(Tone::Five)],
    't' => &[I(Initial::T), V(Vowel::Ang)], 'n' => &[I(Initial::N), V(Vowel::En)],
    'l' => &[I(Initial::L), V(Vowel::Eng)], 'v' => &[I(Initial::G), I(Initial::Q)],
    'k' => &[I(Initial::K), T(Tone::Four)], 'h' => &[I(Initial::H), V(Vowel::Er)],
    'g' => &[I(Initial::J), I(Initial::Zh)], 'c' => &[I(Initial::X), I(Initial::Sh)],
    'y' => &[I(Initial::Ch)], 'j' => &[I(Initial::R), T(Tone::Three)],
    'q' => &[I(Initial::Z), V(Vowel::Ei)], 'w' => &[I(Initial::C), V(Vowel::Eh)], 's' => &[I(Initial::S)],
    'e' => &[M(Medial::I)], 'x' => &[M(Medial::U)], 'u' => &[M(Medial::Yu)],
    'a' => &[V(Vowel::A)], 'o' => &[V(Vowel::O)], 'r' => &[V(Vowel::E)], 'i' => &[V(Vowel::Ai)],
    'z' => &[V(Vowel::Ao)],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    Standard,
    Eten,
    Ibm,
    Hsu,
    Eten26,
}

impl KeyboardLayout {
    fn table(self) -> &'static KeyTable {
        match self {
            KeyboardLayout::Standard => &STANDARD,
            KeyboardLayout::Eten => &ETEN,
            KeyboardLayout::Ibm => &IBM,
            KeyboardLayout::Hsu => &HSU,
            KeyboardLayout::Eten26 => &ETEN26,
        }
    }

    /// Components a key can stand for, most likely first. Uppercase letters
    /// map like their lowercase form.
    pub fn components(self, key: char) -> &'static [Component] {
        self.table().get(&key.to_ascii_lowercase()).copied().unwrap_or(&[])
    }

    pub fn is_phonetic_key(self, key: char) -> bool {
        !self.components(key).is_empty()
    }

    /// Whether some key stands for more than one component.
    pub fn is_ambiguous(self) -> bool {
        matches!(self, KeyboardLayout::Hsu | KeyboardLayout::Eten26)
    }

    /// Layout-specific rewrites applied to every resolved syllable.
    pub fn adjust(self, syllable: Syllable) -> Syllable {
        if self != KeyboardLayout::Hsu {
            return syllable;
        }
        let mut out = syllable;
        if out.initial.is_none() && out.medial.is_none() && out.vowel == Some(Vowel::Eng) {
            out.vowel = Some(Vowel::Er);
        }
        if out.initial == Some(Initial::G) && matches!(out.medial, Some(Medial::I | Medial::Yu)) {
            out.initial = Some(Initial::J);
        }
        out
    }
}

impl std::str::FromStr for KeyboardLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "dachen" => Ok(KeyboardLayout::Standard),
            "eten" => Ok(KeyboardLayout::Eten),
            "ibm" => Ok(KeyboardLayout::Ibm),
            "hsu" => Ok(KeyboardLayout::Hsu),
            "eten26" => Ok(KeyboardLayout::Eten26),
            other => Err(format!("unknown keyboard layout: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_components(layout: KeyboardLayout) -> HashSet<String> {
        layout
            .table()
            .values()
            .flat_map(|cs| cs.iter())
            .map(|c| format!("{c:?}"))
            .collect()
    }

    #[test]
    fn standard_keys() {
        let l = KeyboardLayout::Standard;
        assert_eq!(l.components('s'), &[I(Initial::N)]);
        assert_eq!(l.components('S'), &[I(Initial::N)]);
        assert_eq!(l.components('3'), &[T(Tone::Three)]);
        assert!(l.components('<').is_empty());
        assert!(!l.is_phonetic_key('`'));
    }

    #[test]
    fn one_to_one_layouts_cover_every_component_once() {
        for layout in [KeyboardLayout::Standard, KeyboardLayout::Eten, KeyboardLayout::Ibm] {
            // 21 initials, 3 medials, 13 vowels, 4 marked tones
            assert_eq!(layout.table().len(), 41, "{layout:?}");
            assert!(layout.table().values().all(|cs| cs.len() == 1), "{layout:?}");
            assert_eq!(all_components(layout).len(), 41, "{layout:?}");
            assert!(!layout.is_ambiguous());
        }
    }

    #[test]
    fn letter_layouts_fit_on_26_keys() {
        for layout in [KeyboardLayout::Hsu, KeyboardLayout::Eten26] {
            assert!(layout.is_ambiguous());
            assert!(layout.table().keys().all(char::is_ascii_lowercase), "{layout:?}");
            assert!(layout.table().len() <= 26);
        }
        // Hsu reaches ㄦ through ㄥ
        assert_eq!(all_components(KeyboardLayout::Hsu).len(), 40);
        assert_eq!(all_components(KeyboardLayout::Eten26).len(), 41);
    }

    #[test]
    fn hsu_adjustments() {
        let lone_eng = Syllable {
            vowel: Some(Vowel::Eng),
            ..Syllable::default()
        };
        assert_eq!(KeyboardLayout::Hsu.adjust(lone_eng).composed(), "ㄦ");
        assert_eq!(KeyboardLayout::Eten26.adjust(lone_eng).composed(), "ㄥ");

        let gi = Syllable {
            initial: Some(Initial::G),
            medial: Some(Medial::I),
            ..Syllable::default()
        };
        assert_eq!(KeyboardLayout::Hsu.adjust(gi).composed(), "ㄐㄧ");
    }

    #[test]
    fn parse_layout_names() {
        assert_eq!("ETen".parse::<KeyboardLayout>(), Ok(KeyboardLayout::Eten));
        assert_eq!("hsu".parse::<KeyboardLayout>(), Ok(KeyboardLayout::Hsu));
        assert_eq!("ETen26".parse::<KeyboardLayout>(), Ok(KeyboardLayout::Eten26));
        assert_eq!("IBM".parse::<KeyboardLayout>(), Ok(KeyboardLayout::Ibm));
        assert!("pinyin".parse::<KeyboardLayout>().is_err());
    }
}
