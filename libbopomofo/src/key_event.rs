//! Key events as delivered by the host.
//!
//! Key codes follow macOS virtual key codes; character codes are the Unicode
//! scalar of the produced character (or a control code).

use crate::error::{KeyHandlerError, ScriptError};

/// Virtual key codes the handler looks at.
pub mod key_code {
    pub const RETURN: u16 = 36;
    pub const SPACE: u16 = 49;
    pub const BACKSPACE: u16 = 51;
    pub const ESCAPE: u16 = 53;
    pub const ENTER: u16 = 76;
    pub const HOME: u16 = 115;
    pub const PAGE_UP: u16 = 116;
    pub const DELETE: u16 = 117;
    pub const END: u16 = 119;
    pub const PAGE_DOWN: u16 = 121;
    pub const LEFT: u16 = 123;
    pub const RIGHT: u16 = 124;
    pub const DOWN: u16 = 125;
    pub const UP: u16 = 126;
}

/// Character codes with special meaning.
pub mod char_code {
    pub const ENTER_KEYPAD: u32 = 3;
    pub const BACKSPACE: u32 = 8;
    pub const RETURN: u32 = 13;
    pub const ESC: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const DELETE: u32 = 127;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub option: bool,
    pub command: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub text: String,
    pub key_code: u16,
    pub char_code: u32,
    pub modifiers: Modifiers,
    pub vertical_mode: bool,
}

impl KeyEvent {
    pub fn new<T: Into<String>>(text: T, key_code: u16, char_code: u32) -> Self {
        Self {
            text: text.into(),
            key_code,
            char_code,
            ..Self::default()
        }
    }

    /// A printable key with no virtual key code.
    pub fn from_char(ch: char) -> Self {
        Self::new(ch.to_string(), 0, ch as u32)
    }

    pub fn space() -> Self {
        Self::new(" ", key_code::SPACE, char_code::SPACE)
    }

    pub fn enter() -> Self {
        Self::new("\r", key_code::RETURN, char_code::RETURN)
    }

    pub fn escape() -> Self {
        Self::new(" ", key_code::ESCAPE, char_code::ESC)
    }

    pub fn backspace() -> Self {
        Self::new(" ", key_code::BACKSPACE, char_code::DELETE)
    }

    /// Forward delete.
    pub fn delete() -> Self {
        Self::new(" ", key_code::DELETE, 0)
    }

    pub fn key(key_code: u16) -> Self {
        Self::new("", key_code, 0)
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn with_command(mut self) -> Self {
        self.modifiers.command = true;
        self
    }

    pub fn vertical(mut self) -> Self {
        self.vertical_mode = true;
        self
    }

    /// Reject events the host cannot have produced: a character code that
    /// is not a character, or printable text that disagrees with a printable
    /// character code. Control codes travel with placeholder text and are
    /// not compared.
    pub fn validate(&self) -> Result<(), KeyHandlerError> {
        let Some(code) = char::from_u32(self.char_code) else {
            return Err(KeyHandlerError::MalformedEvent(self.char_code));
        };
        let mut chars = self.text.chars();
        if let (Some(text), None) = (chars.next(), chars.next()) {
            if !text.is_control() && !code.is_control() && text != code {
                return Err(KeyHandlerError::MismatchedEvent {
                    text: self.text.clone(),
                    char_code: self.char_code,
                });
            }
        }
        Ok(())
    }

    /// The single printable character this key produced, if any.
    pub fn input_char(&self) -> Option<char> {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() && !self.is_named_key() => Some(c),
            _ => None,
        }
    }

    fn is_named_key(&self) -> bool {
        self.is_esc()
            || self.is_enter()
            || self.is_space()
            || self.is_backspace()
            || self.is_delete()
            || self.is_cursor_key()
            || self.is_page_up()
            || self.is_page_down()
    }

    pub fn is_esc(&self) -> bool {
        self.char_code == char_code::ESC
    }

    pub fn is_enter(&self) -> bool {
        matches!(self.char_code, char_code::RETURN | char_code::ENTER_KEYPAD)
            || matches!(self.key_code, key_code::RETURN | key_code::ENTER)
    }

    pub fn is_space(&self) -> bool {
        self.char_code == char_code::SPACE
    }

    pub fn is_backspace(&self) -> bool {
        matches!(self.char_code, char_code::BACKSPACE | char_code::DELETE)
            || self.key_code == key_code::BACKSPACE
    }

    pub fn is_delete(&self) -> bool {
        self.key_code == key_code::DELETE
    }

    pub fn is_home(&self) -> bool {
        self.key_code == key_code::HOME
    }

    pub fn is_end(&self) -> bool {
        self.key_code == key_code::END
    }

    pub fn is_page_up(&self) -> bool {
        self.key_code == key_code::PAGE_UP
    }

    pub fn is_page_down(&self) -> bool {
        self.key_code == key_code::PAGE_DOWN
    }

    pub fn is_up(&self) -> bool {
        self.key_code == key_code::UP
    }

    pub fn is_down(&self) -> bool {
        self.key_code == key_code::DOWN
    }

    pub fn is_left(&self) -> bool {
        self.key_code == key_code::LEFT
    }

    pub fn is_right(&self) -> bool {
        self.key_code == key_code::RIGHT
    }

    fn is_cursor_key(&self) -> bool {
        self.is_up() || self.is_down() || self.is_left() || self.is_right() || self.is_home() || self.is_end()
    }

    /// Moves the buffer cursor toward the start (Left, or Up when vertical).
    pub fn is_cursor_backward(&self) -> bool {
        if self.vertical_mode {
            self.is_up()
        } else {
            self.is_left()
        }
    }

    /// Moves the buffer cursor toward the end (Right, or Down when vertical).
    pub fn is_cursor_forward(&self) -> bool {
        if self.vertical_mode {
            self.is_down()
        } else {
            self.is_right()
        }
    }

    /// Opens the candidate list for the phrase at the cursor (Down, or Left
    /// when vertical).
    pub fn is_open_candidates(&self) -> bool {
        if self.vertical_mode {
            self.is_left()
        } else {
            self.is_down()
        }
    }
}

/// Parse a key script: printable characters stand for themselves, named keys
/// go in braces (`{space}`, `{enter}`, `{esc}`, `{bs}`, `{del}`, `{left}`,
/// `{right}`, `{up}`, `{down}`, `{home}`, `{end}`, `{pgup}`, `{pgdn}`), and an
/// `S-` or `C-` prefix inside braces adds shift or ctrl (`{S-left}`, `{C-,}`).
pub fn parse_key_script(script: &str) -> Result<Vec<KeyEvent>, ScriptError> {
    let mut events = Vec::new();
    let mut rest = script;
    let mut offset = 0;
    while let Some(ch) = rest.chars().next() {
        if ch == '{' && rest.len() > 1 {
            let Some(close) = rest.find('}') else {
                return Err(ScriptError::Unterminated(offset));
            };
            events.push(named_key(&rest[1..close])?);
            offset += close + 1;
            rest = &rest[close + 1..];
            continue;
        }
        events.push(match ch {
            ' ' => KeyEvent::space(),
            c if c.is_ascii_uppercase() || "~!@#$%^&*()_+{}|:\"<>?".contains(c) => {
                KeyEvent::from_char(c).with_shift()
            }
            c => KeyEvent::from_char(c),
        });
        offset += ch.len_utf8();
        rest = &rest[ch.len_utf8()..];
    }
    Ok(events)
}

fn named_key(name: &str) -> Result<KeyEvent, ScriptError> {
    if let Some(inner) = name.strip_prefix("S-") {
        return named_key(inner).map(KeyEvent::with_shift);
    }
    if let Some(inner) = name.strip_prefix("C-") {
        return named_key(inner).map(KeyEvent::with_ctrl);
    }
    let event = match name {
        "space" => KeyEvent::space(),
        "enter" => KeyEvent::enter(),
        "esc" => KeyEvent::escape(),
        "bs" => KeyEvent::backspace(),
        "del" => KeyEvent::delete(),
        "left" => KeyEvent::key(key_code::LEFT),
        "right" => KeyEvent::key(key_code::RIGHT),
        "up" => KeyEvent::key(key_code::UP),
        "down" => KeyEvent::key(key_code::DOWN),
        "home" => KeyEvent::key(key_code::HOME),
        "end" => KeyEvent::key(key_code::END),
        "pgup" => KeyEvent::key(key_code::PAGE_UP),
        "pgdn" => KeyEvent::key(key_code::PAGE_DOWN),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyEvent::from_char(c),
                _ => return Err(ScriptError::UnknownKey(other.to_string())),
            }
        }
    };
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_is_not_space() {
        let esc = KeyEvent::escape();
        assert!(esc.is_esc());
        assert!(!esc.is_space());
        assert_eq!(esc.input_char(), None);
    }

    #[test]
    fn forward_delete_has_no_input_char() {
        let del = KeyEvent::delete();
        assert!(del.is_delete());
        assert!(!del.is_backspace());
        assert_eq!(del.input_char(), None);
    }

    #[test]
    fn vertical_mode_rotates_arrows() {
        let down = KeyEvent::key(key_code::DOWN);
        assert!(down.is_open_candidates());
        assert!(!down.clone().vertical().is_open_candidates());
        assert!(down.vertical().is_cursor_forward());
        assert!(KeyEvent::key(key_code::LEFT).vertical().is_open_candidates());
    }

    #[test]
    fn surrogate_char_code_is_malformed() {
        let event = KeyEvent::new("a", 0, 0xD800);
        assert_eq!(event.validate(), Err(KeyHandlerError::MalformedEvent(0xD800)));
        assert!(KeyEvent::from_char('a').validate().is_ok());
    }

    #[test]
    fn text_must_agree_with_char_code() {
        let event = KeyEvent::new("a", 0, 'b' as u32);
        assert_eq!(
            event.validate(),
            Err(KeyHandlerError::MismatchedEvent {
                text: "a".into(),
                char_code: 'b' as u32,
            })
        );
        // named keys carry a placeholder text next to a control code
        assert!(KeyEvent::escape().validate().is_ok());
        assert!(KeyEvent::backspace().validate().is_ok());
        assert!(KeyEvent::delete().validate().is_ok());
        assert!(KeyEvent::from_char('<').with_shift().validate().is_ok());
    }

    #[test]
    fn script_parsing() {
        let events = parse_key_script("su3{S-left}<{space}").unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].input_char(), Some('s'));
        assert!(events[3].is_left() && events[3].modifiers.shift);
        assert!(events[4].modifiers.shift);
        assert!(events[5].is_space());
        assert_eq!(
            parse_key_script("{nope}"),
            Err(ScriptError::UnknownKey("nope".into()))
        );
        assert_eq!(parse_key_script("a{left"), Err(ScriptError::Unterminated(1)));
    }
}
