//! # libbopomofo
//!
//! Bopomofo input method key handler built on libbopomofo-core.
//!
//! A host feeds `KeyEvent`s to a `KeyHandler` together with the last
//! `InputState` it published and the current `Preferences`; the handler
//! answers with the states to publish next.
//!
//! ```rust
//! use libbopomofo::{parse_key_script, InputState, KeyHandler, KeyHandlerResult, KeyboardLayout, Preferences};
//! use libbopomofo_core::{BopomofoModel, Config};
//! use std::rc::Rc;
//!
//! let model = BopomofoModel::builtin(Config::default()).unwrap();
//! let mut handler = KeyHandler::new(Rc::new(model), KeyboardLayout::Standard);
//! let prefs = Preferences::default();
//! let mut state = InputState::Empty;
//! for key in parse_key_script("su3cl3").unwrap() {
//!     if let KeyHandlerResult::Handled(states) = handler.handle(&key, &state, &prefs) {
//!         state = states.last().cloned().unwrap_or_default();
//!     }
//! }
//! assert_eq!(state.composing_buffer(), "你好");
//! ```

pub mod associated;
pub mod buffer;
pub mod composer;
pub mod config;
pub mod error;
pub mod input_state;
pub mod key_event;
pub mod key_handler;
pub mod layout;
pub mod punctuation;
pub mod syllable;

pub use associated::associated_phrases_state;
pub use buffer::ComposingBuffer;
pub use composer::{ComposerResult, SyllableComposer};
pub use config::{DataFiles, EngineConfig, InputMode, Preferences};
pub use error::{ConfigError, KeyHandlerError, ScriptError};
pub use input_state::InputState;
pub use key_event::{parse_key_script, KeyEvent, Modifiers};
pub use key_handler::{KeyHandler, KeyHandlerResult};
pub use layout::KeyboardLayout;
pub use punctuation::{PunctuationMatch, PunctuationOverlay};
pub use syllable::{Component, Initial, Medial, Syllable, Tone, Vowel};
