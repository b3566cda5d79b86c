//! Bopomofo syllable structure and phonotactic rules.
//!
//! A syllable has four optional slots: initial consonant, medial, vowel
//! (final) and tone. Tone 1 is written without a mark.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Initial {
    B,
    P,
    M,
    F,
    D,
    T,
    N,
    L,
    G,
    K,
    H,
    J,
    Q,
    X,
    Zh,
    Ch,
    Sh,
    R,
    Z,
    C,
    S,
}

impl Initial {
    pub fn symbol(self) -> char {
        match self {
            Initial::B => 'ㄅ',
            Initial::P => 'ㄆ',
            Initial::M => 'ㄇ',
            Initial::F => 'ㄈ',
            Initial::D => 'ㄉ',
            Initial::T => 'ㄊ',
            Initial::N => 'ㄋ',
            Initial::L => 'ㄌ',
            Initial::G => 'ㄍ',
            Initial::K => 'ㄎ',
            Initial::H => 'ㄏ',
            Initial::J => 'ㄐ',
            Initial::Q => 'ㄑ',
            Initial::X => 'ㄒ',
            Initial::Zh => 'ㄓ',
            Initial::Ch => 'ㄔ',
            Initial::Sh => 'ㄕ',
            Initial::R => 'ㄖ',
            Initial::Z => 'ㄗ',
            Initial::C => 'ㄘ',
            Initial::S => 'ㄙ',
        }
    }

    /// ㄓㄔㄕㄖㄗㄘㄙ form a syllable on their own.
    pub fn is_syllabic(self) -> bool {
        matches!(
            self,
            Initial::Zh | Initial::Ch | Initial::Sh | Initial::R | Initial::Z | Initial::C | Initial::S
        )
    }

    /// ㄐㄑㄒ, which only combine with ㄧ or ㄩ.
    pub fn is_palatal(self) -> bool {
        matches!(self, Initial::J | Initial::Q | Initial::X)
    }

    fn is_velar(self) -> bool {
        matches!(self, Initial::G | Initial::K | Initial::H)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medial {
    I,
    U,
    Yu,
}

impl Medial {
    pub fn symbol(self) -> char {
        match self {
            Medial::I => 'ㄧ',
            Medial::U => 'ㄨ',
            Medial::Yu => 'ㄩ',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vowel {
    A,
    O,
    E,
    Eh,
    Ai,
    Ei,
    Ao,
    Ou,
    An,
    En,
    Ang,
    Eng,
    Er,
}

impl Vowel {
    pub fn symbol(self) -> char {
        match self {
            Vowel::A => 'ㄚ',
            Vowel::O => 'ㄛ',
            Vowel::E => 'ㄜ',
            Vowel::Eh => 'ㄝ',
            Vowel::Ai => 'ㄞ',
            Vowel::Ei => 'ㄟ',
            Vowel::Ao => 'ㄠ',
            Vowel::Ou => 'ㄡ',
            Vowel::An => 'ㄢ',
            Vowel::En => 'ㄣ',
            Vowel::Ang => 'ㄤ',
            Vowel::Eng => 'ㄥ',
            Vowel::Er => 'ㄦ',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Tone {
    /// Tone mark; tone 1 has none.
    pub fn mark(self) -> Option<char> {
        match self {
            Tone::One => None,
            Tone::Two => Some('ˊ'),
            Tone::Three => Some('ˇ'),
            Tone::Four => Some('ˋ'),
            Tone::Five => Some('˙'),
        }
    }
}

/// What a layout key produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Initial(Initial),
    Medial(Medial),
    Vowel(Vowel),
    Tone(Tone),
}

/// Slot categories in writing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    Initial,
    Medial,
    Vowel,
    Tone,
}

impl Component {
    pub fn slot(self) -> Slot {
        match self {
            Component::Initial(_) => Slot::Initial,
            Component::Medial(_) => Slot::Medial,
            Component::Vowel(_) => Slot::Vowel,
            Component::Tone(_) => Slot::Tone,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Syllable {
    pub initial: Option<Initial>,
    pub medial: Option<Medial>,
    pub vowel: Option<Vowel>,
    pub tone: Option<Tone>,
}

impl Syllable {
    pub fn is_empty(&self) -> bool {
        self.initial.is_none() && self.medial.is_none() && self.vowel.is_none() && self.tone.is_none()
    }

    /// Copy with `component` put in its slot, replacing what was there.
    pub fn with(self, component: Component) -> Self {
        let mut next = self;
        match component {
            Component::Initial(i) => next.initial = Some(i),
            Component::Medial(m) => next.medial = Some(m),
            Component::Vowel(v) => next.vowel = Some(v),
            Component::Tone(t) => next.tone = Some(t),
        }
        next
    }

    pub fn without(self, slot: Slot) -> Self {
        let mut next = self;
        match slot {
            Slot::Initial => next.initial = None,
            Slot::Medial => next.medial = None,
            Slot::Vowel => next.vowel = None,
            Slot::Tone => next.tone = None,
        }
        next
    }

    /// Whether the filled slots can still be part of a real syllable.
    pub fn is_valid_prefix(&self) -> bool {
        let Some(initial) = self.initial else {
            return true;
        };
        match self.medial {
            Some(Medial::Yu) => matches!(
                initial,
                Initial::N | Initial::L | Initial::J | Initial::Q | Initial::X
            ),
            Some(Medial::I) => !(initial.is_velar() || initial.is_syllabic()),
            Some(Medial::U) => !initial.is_palatal(),
            // ㄐㄑㄒ need a medial before any vowel
            None => !(initial.is_palatal() && self.vowel.is_some()),
        }
    }

    /// Complete enough to take a tone and be looked up.
    pub fn is_complete(&self) -> bool {
        let voiced = self.medial.is_some()
            || self.vowel.is_some()
            || self.initial.is_some_and(Initial::is_syllabic);
        voiced && self.is_valid_prefix()
    }

    /// Rendered text, tone mark last.
    pub fn composed(&self) -> String {
        let mut out = String::new();
        out.extend(self.initial.map(Initial::symbol));
        out.extend(self.medial.map(Medial::symbol));
        out.extend(self.vowel.map(Vowel::symbol));
        out.extend(self.tone.and_then(Tone::mark));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syl(initial: Option<Initial>, medial: Option<Medial>, vowel: Option<Vowel>) -> Syllable {
        Syllable {
            initial,
            medial,
            vowel,
            tone: None,
        }
    }

    #[test]
    fn composed_orders_slots() {
        let s = syl(Some(Initial::M), Some(Medial::I), Some(Vowel::Ao)).with(Component::Tone(Tone::Four));
        assert_eq!(s.composed(), "ㄇㄧㄠˋ");
        let s = s.with(Component::Tone(Tone::One));
        assert_eq!(s.composed(), "ㄇㄧㄠ");
    }

    #[test]
    fn syllabic_initials_stand_alone() {
        assert!(syl(Some(Initial::Sh), None, None).is_complete());
        assert!(!syl(Some(Initial::B), None, None).is_complete());
        assert!(!Syllable::default().is_complete());
    }

    #[test]
    fn palatals_need_front_medial() {
        assert!(!syl(Some(Initial::J), None, Some(Vowel::A)).is_valid_prefix());
        assert!(syl(Some(Initial::J), None, None).is_valid_prefix());
        assert!(!syl(Some(Initial::J), None, None).is_complete());
        assert!(syl(Some(Initial::X), Some(Medial::Yu), Some(Vowel::Eh)).is_complete());
        assert!(!syl(Some(Initial::Q), Some(Medial::U), None).is_valid_prefix());
    }

    #[test]
    fn medial_restrictions() {
        assert!(!syl(Some(Initial::G), Some(Medial::I), None).is_valid_prefix());
        assert!(!syl(Some(Initial::Zh), Some(Medial::I), None).is_valid_prefix());
        assert!(!syl(Some(Initial::B), Some(Medial::Yu), None).is_valid_prefix());
        assert!(syl(Some(Initial::L), Some(Medial::Yu), None).is_complete());
        assert!(syl(None, Some(Medial::Yu), None).is_complete());
    }
}
