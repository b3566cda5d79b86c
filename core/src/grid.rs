//! Phrase grid over the readings of a composing buffer.
//!
//! Every span `[start, start + len)` whose joined key has unigrams becomes a
//! node in an arena. Positions are plain indices into the reading sequence,
//! so the grid is rebuilt from scratch after each buffer edit. `walk` finds
//! the maximum-weight segmentation with one forward pass over positions
//! `0..=N`.

use crate::candidate::Candidate;
use crate::model::{join_readings, LanguageModel, Unigram};
use crate::Config;

/// Tie-breaker added per extra reading a node spans, so equal totals favour
/// fewer, longer phrases.
pub const SPAN_BONUS: f64 = 1e-4;

/// Knobs taken from `Config`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    pub max_span_length: usize,
    pub unknown_reading_score: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl GridOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_span_length: config.max_span_length.max(1),
            unknown_reading_score: config.unknown_reading_score,
        }
    }
}

/// A user choice the walk must keep: `value` over `[start, start + len)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub start: usize,
    pub len: usize,
    pub value: String,
}

impl Pin {
    pub fn new<T: Into<String>>(start: usize, len: usize, value: T) -> Self {
        Self {
            start,
            len,
            value: value.into(),
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    fn overlaps(&self, start: usize, len: usize) -> bool {
        start < self.end() && self.start < start + len
    }
}

#[derive(Debug, Clone)]
struct Node {
    start: usize,
    len: usize,
    key: String,
    unigrams: Vec<Unigram>,
}

impl Node {
    fn best(&self) -> Option<&Unigram> {
        self.unigrams
            .iter()
            .fold(None, |best: Option<&Unigram>, u| match best {
                Some(b) if b.score >= u.score => Some(b),
                _ => Some(u),
            })
    }
}

#[derive(Debug, Clone)]
pub struct PhraseGrid {
    readings: Vec<String>,
    nodes: Vec<Node>,
    by_start: Vec<Vec<usize>>,
    by_end: Vec<Vec<usize>>,
}

impl PhraseGrid {
    pub fn build<S: AsRef<str>>(readings: &[S], lm: &dyn LanguageModel, options: GridOptions) -> Self {
        let n = readings.len();
        let mut grid = Self {
            readings: readings.iter().map(|r| r.as_ref().to_string()).collect(),
            nodes: Vec::new(),
            by_start: vec![Vec::new(); n],
            by_end: vec![Vec::new(); n + 1],
        };

        for start in 0..n {
            for len in 1..=options.max_span_length.min(n - start) {
                let key = join_readings(&readings[start..start + len]);
                let mut unigrams = lm.unigrams(&key);
                if unigrams.is_empty() {
                    if len > 1 {
                        continue;
                    }
                    // unknown single reading: show it raw
                    unigrams.push(Unigram::new(key.as_str(), options.unknown_reading_score));
                }
                let idx = grid.nodes.len();
                grid.nodes.push(Node {
                    start,
                    len,
                    key,
                    unigrams,
                });
                grid.by_start[start].push(idx);
                grid.by_end[start + len].push(idx);
            }
        }
        tracing::trace!(readings = n, nodes = grid.nodes.len(), "phrase grid built");
        grid
    }

    pub fn readings(&self) -> &[String] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Value and score a node contributes to a walk under `pins`, or `None`
    /// if the node conflicts with a pin.
    fn choose<'a>(&'a self, node: &'a Node, pins: &'a [Pin]) -> Option<(&'a str, f64)> {
        for pin in pins {
            if pin.start == node.start && pin.len == node.len {
                return node
                    .unigrams
                    .iter()
                    .find(|u| u.value == pin.value)
                    .map(|u| (u.value.as_str(), u.score));
            }
            if pin.overlaps(node.start, node.len) {
                return None;
            }
        }
        node.best().map(|u| (u.value.as_str(), u.score))
    }

    /// Highest-scoring path from position 0 to N honouring `pins`. Pins that
    /// no longer match any node are dropped.
    pub fn walk(&self, pins: &[Pin]) -> Walk {
        let live: Vec<Pin> = pins
            .iter()
            .filter(|p| {
                p.len > 0
                    && p.end() <= self.len()
                    && self.by_start[p.start].iter().any(|&i| {
                        let node = &self.nodes[i];
                        node.len == p.len && node.unigrams.iter().any(|u| u.value == p.value)
                    })
            })
            .cloned()
            .collect();

        self.walk_with(&live)
            .or_else(|| self.walk_with(&[]))
            .unwrap_or_default()
    }

    fn walk_with(&self, pins: &[Pin]) -> Option<Walk> {
        let n = self.len();
        // best[j] = (total weight, node index) of the best path ending at j
        let mut best: Vec<Option<(f64, usize)>> = vec![None; n + 1];
        let mut totals: Vec<Option<f64>> = vec![None; n + 1];
        totals[0] = Some(0.0);

        for end in 1..=n {
            for &idx in &self.by_end[end] {
                let node = &self.nodes[idx];
                let Some(prefix) = totals[node.start] else {
                    continue;
                };
                let Some((_, score)) = self.choose(node, pins) else {
                    continue;
                };
                let total = prefix + score + SPAN_BONUS * (node.len - 1) as f64;
                if best[end].map_or(true, |(t, _)| total > t) {
                    best[end] = Some((total, idx));
                    totals[end] = Some(total);
                }
            }
        }

        totals[n]?;
        let mut steps = Vec::new();
        let mut pos = n;
        while pos > 0 {
            let (_, idx) = best[pos]?;
            let node = &self.nodes[idx];
            let (value, score) = self.choose(node, pins)?;
            steps.push(WalkStep {
                start: node.start,
                len: node.len,
                reading: node.key.clone(),
                value: value.to_string(),
                score,
            });
            pos = node.start;
        }
        steps.reverse();
        Some(Walk { steps })
    }

    /// Every candidate whose span starts at `position`, best score first,
    /// longer spans first on ties. Texts appear once.
    pub fn candidates_at(&self, position: usize) -> Vec<Candidate> {
        let Some(indices) = self.by_start.get(position) else {
            return Vec::new();
        };
        let mut out: Vec<Candidate> = indices
            .iter()
            .flat_map(|&i| {
                let node = &self.nodes[i];
                node.unigrams.iter().map(move |u| {
                    Candidate::new(u.value.as_str(), u.score).with_reading(node.key.as_str(), node.len)
                })
            })
            .collect();
        out.sort_by(|a, b| b.score.total_cmp(&a.score).then(b.span.cmp(&a.span)));

        let mut seen = ahash::AHashSet::new();
        out.retain(|c| seen.insert(c.text.clone()));
        out
    }
}

/// One phrase of a walk.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkStep {
    pub start: usize,
    pub len: usize,
    pub reading: String,
    pub value: String,
    pub score: f64,
}

impl WalkStep {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    fn display_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// The chosen segmentation of the buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Walk {
    steps: Vec<WalkStep>,
}

impl Walk {
    pub fn steps(&self) -> &[WalkStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Concatenated display text.
    pub fn text(&self) -> String {
        self.steps.iter().map(|s| s.value.as_str()).collect()
    }

    pub fn score(&self) -> f64 {
        self.steps.iter().map(|s| s.score).sum()
    }

    /// The step covering reading `position`.
    pub fn step_covering(&self, position: usize) -> Option<&WalkStep> {
        self.steps
            .iter()
            .find(|s| s.start <= position && position < s.end())
    }

    /// Map a reading index to a character index in `text()`. Inside a phrase
    /// whose length differs from its reading count the index snaps to the
    /// phrase end.
    pub fn display_index(&self, reading_index: usize) -> usize {
        let mut display = 0;
        for step in &self.steps {
            if reading_index >= step.end() {
                display += step.display_len();
                continue;
            }
            if reading_index > step.start {
                let offset = reading_index - step.start;
                display += if step.display_len() == step.len {
                    offset
                } else {
                    step.display_len()
                };
            }
            break;
        }
        display
    }
}
