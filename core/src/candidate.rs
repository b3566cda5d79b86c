//! Candidate types produced by the language model and the phrase grid.
//!
//! This module provides:
//! - `Candidate`: a phrase for a span of readings, with its score
//! - `CandidateList`: paged list with a highlighted entry, as shown in a
//!   candidate window

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A phrase proposed for one or more readings.
///
/// Scores are log probabilities; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    /// Joined reading key this candidate resolves (e.g. `ㄋㄧˇ-ㄏㄠˇ`).
    pub reading: String,
    /// Number of readings the candidate spans.
    pub span: usize,
    pub score: f64,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T, score: f64) -> Self {
        Candidate {
            text: text.into(),
            reading: String::new(),
            span: 0,
            score,
        }
    }

    /// Attach the reading key and span length.
    pub fn with_reading<R: Into<String>>(mut self, reading: R, span: usize) -> Self {
        self.reading = reading.into();
        self.span = span;
        self
    }
}

/// A paginated list of candidates with a highlighted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateList {
    candidates: Vec<Candidate>,

    /// Number of candidates per page (one per selection key)
    page_size: usize,

    /// Current page index (0-based)
    current_page: usize,

    /// Highlight position within the current page (0-based)
    cursor: usize,
}

impl CandidateList {
    /// Create a new empty candidate list.
    pub fn new() -> Self {
        Self::with_page_size(9)
    }

    /// Create a candidate list with specified page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            candidates: Vec::new(),
            page_size: page_size.max(1),
            current_page: 0,
            cursor: 0,
        }
    }

    /// Create a candidate list from a vector of candidates.
    pub fn from_candidates(candidates: Vec<Candidate>, page_size: usize) -> Self {
        let mut list = Self::with_page_size(page_size);
        list.set_candidates(candidates);
        list
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Set the candidates, resetting pagination state.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.current_page = 0;
        self.cursor = 0;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidate texts in list order.
    pub fn texts(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Get the total number of pages.
    pub fn num_pages(&self) -> usize {
        self.candidates.len().div_ceil(self.page_size)
    }

    /// Get the current page index (0-based).
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Get the highlight position within the current page (0-based).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn current_page_range(&self) -> Range<usize> {
        let start = self.current_page * self.page_size;
        let end = (start + self.page_size).min(self.candidates.len());
        start.min(end)..end
    }

    fn current_page_len(&self) -> usize {
        self.current_page_range().len()
    }

    /// Get the candidates for the current page.
    pub fn current_page_candidates(&self) -> &[Candidate] {
        &self.candidates[self.current_page_range()]
    }

    /// Get the highlighted candidate.
    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.current_page_candidates().get(self.cursor)
    }

    /// Get the global index of the highlighted candidate.
    pub fn selected_index(&self) -> Option<usize> {
        let global_index = self.current_page * self.page_size + self.cursor;
        (global_index < self.candidates.len()).then_some(global_index)
    }

    /// Move the highlight to the previous candidate, crossing pages.
    /// Returns true if the highlight moved.
    pub fn select_previous(&mut self) -> bool {
        match self.selected_index() {
            Some(index) if index > 0 => self.select_global(index - 1),
            _ => false,
        }
    }

    /// Move the highlight to the next candidate, crossing pages.
    /// Returns true if the highlight moved.
    pub fn select_next(&mut self) -> bool {
        match self.selected_index() {
            Some(index) if index + 1 < self.candidates.len() => self.select_global(index + 1),
            _ => false,
        }
    }

    /// Move the highlight to a global index.
    pub fn select_global(&mut self, index: usize) -> bool {
        if index >= self.candidates.len() {
            return false;
        }
        self.current_page = index / self.page_size;
        self.cursor = index % self.page_size;
        true
    }

    /// Move to the previous page.
    /// Returns true if the page changed.
    pub fn page_up(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            self.clamp_cursor();
            true
        } else {
            false
        }
    }

    /// Move to the next page.
    /// Returns true if the page changed.
    pub fn page_down(&mut self) -> bool {
        if self.current_page + 1 < self.num_pages() {
            self.current_page += 1;
            self.clamp_cursor();
            true
        } else {
            false
        }
    }

    /// Page forward, wrapping to the first page after the last one.
    pub fn page_down_wrapping(&mut self) {
        if !self.page_down() {
            self.reset();
        }
    }

    /// Page backward, wrapping to the last page before the first one.
    pub fn page_up_wrapping(&mut self) {
        if !self.page_up() && self.num_pages() > 0 {
            self.current_page = self.num_pages() - 1;
            self.clamp_cursor();
        }
    }

    fn clamp_cursor(&mut self) {
        let page_len = self.current_page_len();
        if page_len > 0 && self.cursor >= page_len {
            self.cursor = page_len - 1;
        }
    }

    /// Highlight a candidate by index within the current page and return it.
    pub fn select_by_index(&mut self, page_index: usize) -> Option<&Candidate> {
        if page_index < self.current_page_len() {
            self.cursor = page_index;
            self.selected_candidate()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.reset();
    }

    /// Go to the first page, first candidate.
    pub fn reset(&mut self) {
        self.current_page = 0;
        self.cursor = 0;
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize, page_size: usize) -> CandidateList {
        let cands = (0..n)
            .map(|i| Candidate::new(format!("c{i}"), -(i as f64)))
            .collect();
        CandidateList::from_candidates(cands, page_size)
    }

    #[test]
    fn paging_wraps_around() {
        let mut l = list(7, 3);
        assert_eq!(l.num_pages(), 3);
        l.page_down_wrapping();
        l.page_down_wrapping();
        assert_eq!(l.current_page(), 2);
        assert_eq!(l.current_page_candidates().len(), 1);
        l.page_down_wrapping();
        assert_eq!(l.current_page(), 0);
        l.page_up_wrapping();
        assert_eq!(l.current_page(), 2);
    }

    #[test]
    fn highlight_crosses_pages() {
        let mut l = list(5, 2);
        assert!(l.select_next());
        assert!(l.select_next());
        assert_eq!(l.current_page(), 1);
        assert_eq!(l.selected_candidate().map(|c| c.text.as_str()), Some("c2"));
        assert!(l.select_previous());
        assert_eq!(l.current_page(), 0);
        assert_eq!(l.selected_index(), Some(1));
    }

    #[test]
    fn select_by_index_is_page_relative() {
        let mut l = list(5, 2);
        l.page_down();
        assert_eq!(l.select_by_index(1).map(|c| c.text.clone()), Some("c3".into()));
        assert!(l.select_by_index(2).is_none());
    }

    #[test]
    fn empty_list_has_no_selection() {
        let l = CandidateList::new();
        assert_eq!(l.num_pages(), 0);
        assert!(l.selected_candidate().is_none());
        assert!(l.selected_index().is_none());
    }
}
