use thiserror::Error;

/// Why a key was rejected. The handler's state is unchanged when one of
/// these is returned; the host is expected to give neutral feedback (a beep).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyHandlerError {
    #[error("malformed key event: char code {0:#x} is not a character")]
    MalformedEvent(u32),

    #[error("malformed key event: text {text:?} does not match char code {char_code:#x}")]
    MismatchedEvent { text: String, char_code: u32 },

    #[error("no phrase for reading {0}")]
    UnknownReading(String),

    #[error("syllable is not complete")]
    IncompleteSyllable,

    #[error("a syllable is being composed")]
    ComposingInProgress,

    #[error("cursor is at the buffer boundary")]
    CursorAtBoundary,

    #[error("no candidate at index {0}")]
    CandidateOutOfRange(usize),

    #[error("cannot learn marked text: {0}")]
    InvalidMark(String),

    #[error("failed to save user phrase: {0}")]
    UserPhrase(String),

    #[error("key {0:?} has no meaning here")]
    UnexpectedKey(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors from parsing a key script such as `su3{space}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown key name {{{0}}}")]
    UnknownKey(String),

    #[error("unterminated key name starting at byte {0}")]
    Unterminated(usize),
}
