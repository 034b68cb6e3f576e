//! Font size statistics.

use std::collections::BTreeMap;

use crate::model::{Block, Page};

/// Character-weighted font size histogram.
///
/// Sizes are bucketed at 0.1 pt. The histogram is ordered so every
/// statistic is reproducible.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    histogram: BTreeMap<i32, usize>,
    total: usize,
}

impl FontStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics over the blocks of a page.
    pub fn from_blocks<'a, I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = &'a Block>,
    {
        let mut stats = Self::new();
        for block in blocks {
            let chars = block.text.chars().filter(|c| !c.is_whitespace()).count();
            stats.add(block.size, chars);
        }
        stats
    }

    /// Statistics over the flowing fragments of a page.
    pub fn from_page(page: &Page) -> Self {
        let mut stats = Self::new();
        for id in page.flowing_fragments() {
            let frag = page.fragment(id);
            if frag.script.is_none() {
                stats.add(frag.size, frag.char_count());
            }
        }
        stats
    }

    /// Add `weight` observations of `size`.
    pub fn add(&mut self, size: f32, weight: usize) {
        if weight == 0 || !size.is_finite() {
            return;
        }
        let key = (size * 10.0).round() as i32;
        *self.histogram.entry(key).or_insert(0) += weight;
        self.total += weight;
    }

    pub fn merge(&mut self, other: &FontStatistics) {
        for (key, count) in &other.histogram {
            *self.histogram.entry(*key).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Weighted median size: the body text size of a page.
    pub fn median(&self) -> Option<f32> {
        if self.total == 0 {
            return None;
        }
        let half = self.total.div_ceil(2);
        let mut seen = 0;
        for (key, count) in &self.histogram {
            seen += count;
            if seen >= half {
                return Some(*key as f32 / 10.0);
            }
        }
        None
    }

    /// Most frequent size; ties go to the smaller size.
    pub fn mode(&self) -> Option<f32> {
        let mut best: Option<(i32, usize)> = None;
        for (key, count) in &self.histogram {
            if best.map_or(true, |(_, c)| *count > c) {
                best = Some((*key, *count));
            }
        }
        best.map(|(key, _)| key as f32 / 10.0)
    }
}
