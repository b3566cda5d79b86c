//! Shared driver for key handler integration tests.

#![allow(dead_code)]

use libbopomofo::{parse_key_script, InputState, KeyEvent, KeyHandler, KeyHandlerResult, KeyboardLayout, Preferences};
use libbopomofo_core::{BopomofoModel, Config};
use std::rc::Rc;

/// A handler plus the state a host would hand back with the next key.
pub struct Session {
    pub handler: KeyHandler,
    pub model: Rc<BopomofoModel>,
    pub state: InputState,
    pub prefs: Preferences,
}

impl Session {
    pub fn new(prefs: Preferences) -> Self {
        Self::with_layout(prefs, KeyboardLayout::Standard)
    }

    pub fn with_layout(prefs: Preferences, layout: KeyboardLayout) -> Self {
        Self::with_model(prefs, layout, Config::default())
    }

    pub fn with_model(prefs: Preferences, layout: KeyboardLayout, config: Config) -> Self {
        let model = Rc::new(BopomofoModel::builtin(config).expect("builtin model"));
        Self {
            handler: KeyHandler::new(model.clone(), layout),
            model,
            state: InputState::Empty,
            prefs,
        }
    }

    pub fn key(&mut self, event: KeyEvent) -> KeyHandlerResult {
        let result = self.handler.handle(&event, &self.state, &self.prefs);
        if let Some(last) = result.last_state() {
            self.state = last.clone();
        }
        result
    }

    /// Replay a key script; returns the outcome of the last key.
    pub fn type_keys(&mut self, script: &str) -> KeyHandlerResult {
        let mut last = KeyHandlerResult::Unhandled(Vec::new());
        for event in parse_key_script(script).expect("valid script") {
            last = self.key(event);
        }
        last
    }
}

pub fn states(result: &KeyHandlerResult) -> Vec<InputState> {
    result.states().to_vec()
}
