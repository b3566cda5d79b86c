//! Composing buffer: completed readings with a cursor, an optional marker
//! and the candidates the user pinned.
//!
//! Positions count readings, not characters. Mapping to display characters
//! goes through the phrase grid walk.

use libbopomofo_core::Pin;
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposingBuffer {
    readings: Vec<String>,
    cursor: usize,
    // moving end of a marking; the cursor is the fixed end
    marker: Option<usize>,
    pins: Vec<Pin>,
}

impl ComposingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readings(&self) -> &[String] {
        &self.readings
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn clear(&mut self) {
        self.readings.clear();
        self.cursor = 0;
        self.marker = None;
        self.pins.clear();
    }

    /// Insert a reading at the cursor and move past it. A pin split by the
    /// insertion is dropped; pins after it shift right.
    pub fn insert_reading<R: Into<String>>(&mut self, reading: R) {
        let at = self.cursor;
        self.pins.retain(|p| !(p.start < at && at < p.end()));
        for pin in &mut self.pins {
            if pin.start >= at {
                pin.start += 1;
            }
        }
        self.readings.insert(at, reading.into());
        self.cursor += 1;
    }

    fn remove_at(&mut self, index: usize) {
        self.readings.remove(index);
        self.pins.retain(|p| !(p.start <= index && index < p.end()));
        for pin in &mut self.pins {
            if pin.start > index {
                pin.start -= 1;
            }
        }
    }

    /// Delete the reading before the cursor (backspace).
    /// Returns true if a reading was deleted.
    pub fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_at(self.cursor);
        true
    }

    /// Delete the reading after the cursor (forward delete).
    /// Returns true if a reading was deleted.
    pub fn delete_after(&mut self) -> bool {
        if self.cursor >= self.readings.len() {
            return false;
        }
        self.remove_at(self.cursor);
        true
    }

    /// Move cursor to the left by one reading.
    /// Returns true if cursor moved.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move cursor to the right by one reading.
    /// Returns true if cursor moved.
    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.readings.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn move_to_start(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    pub fn move_to_end(&mut self) -> bool {
        let moved = self.cursor != self.readings.len();
        self.cursor = self.readings.len();
        moved
    }

    /// Remember the user's choice for `[start, start + len)`, replacing any
    /// pin it overlaps.
    pub fn pin(&mut self, pin: Pin) {
        if pin.len == 0 || pin.end() > self.readings.len() {
            return;
        }
        self.pins
            .retain(|p| p.end() <= pin.start || pin.end() <= p.start);
        self.pins.push(pin);
    }

    /// Remove the first `count` readings (committed on overflow).
    pub fn drain_front(&mut self, count: usize) -> Vec<String> {
        let count = count.min(self.readings.len());
        let drained: Vec<String> = self.readings.drain(..count).collect();
        self.pins.retain(|p| p.start >= count);
        for pin in &mut self.pins {
            pin.start -= count;
        }
        self.cursor = self.cursor.saturating_sub(count);
        self.marker = None;
        drained
    }

    // ========== Marking ==========

    pub fn marker(&self) -> Option<usize> {
        self.marker
    }

    /// Move the marker end one reading back, starting a mark at the cursor
    /// if none is active. Returns false at the buffer start.
    pub fn mark_backward(&mut self) -> bool {
        let current = self.marker.unwrap_or(self.cursor);
        if current == 0 {
            return false;
        }
        self.marker = Some(current - 1);
        true
    }

    /// Move the marker end one reading forward. Returns false at the end.
    pub fn mark_forward(&mut self) -> bool {
        let current = self.marker.unwrap_or(self.cursor);
        if current >= self.readings.len() {
            return false;
        }
        self.marker = Some(current + 1);
        true
    }

    pub fn clear_marker(&mut self) {
        self.marker = None;
    }

    /// Ordered, non-empty marked range, or `None`.
    pub fn mark_range(&self) -> Option<Range<usize>> {
        let marker = self.marker?;
        match marker.cmp(&self.cursor) {
            std::cmp::Ordering::Less => Some(marker..self.cursor),
            std::cmp::Ordering::Greater => Some(self.cursor..marker),
            std::cmp::Ordering::Equal => None,
        }
    }
}
