//! Line formation: fragments to baseline rows to lines.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{BoundingBox, FontWeight, FragmentId, Line, LineId, Page};
use crate::text::needs_space;

use super::LayoutConfig;

/// Fragments sharing a baseline, before splitting on wide gaps.
#[derive(Debug)]
struct Row {
    baseline_sum: f32,
    count: usize,
    members: Vec<FragmentId>,
}

impl Row {
    fn new(id: FragmentId, baseline: f32) -> Self {
        Self {
            baseline_sum: baseline,
            count: 1,
            members: vec![id],
        }
    }

    fn baseline(&self) -> f32 {
        self.baseline_sum / self.count as f32
    }

    fn push(&mut self, id: FragmentId, baseline: f32) {
        self.baseline_sum += baseline;
        self.count += 1;
        self.members.push(id);
    }
}

/// Group the given fragments of a page into lines.
///
/// Lines come back ordered by (baseline, x0) with ids matching their
/// position in the returned vector.
pub fn form_lines(page: &Page, ids: &[FragmentId], config: &LayoutConfig) -> Vec<Line> {
    let (scripts, mut normal): (Vec<FragmentId>, Vec<FragmentId>) = ids
        .iter()
        .copied()
        .filter(|id| !page.fragment(*id).text.trim().is_empty())
        .partition(|id| page.fragment(*id).script.is_some());

    normal.sort_by(|a, b| {
        let fa = page.fragment(*a);
        let fb = page.fragment(*b);
        fa.baseline_y()
            .partial_cmp(&fb.baseline_y())
            .unwrap_or(Ordering::Equal)
            .then(fa.bbox.x0.partial_cmp(&fb.bbox.x0).unwrap_or(Ordering::Equal))
            .then(a.cmp(b))
    });

    let mut rows: Vec<Row> = Vec::new();
    for id in normal {
        let baseline = page.fragment(id).baseline_y();
        let joins = rows
            .last()
            .map_or(false, |row| (baseline - row.baseline()).abs() <= config.baseline_tolerance);
        if joins {
            if let Some(row) = rows.last_mut() {
                row.push(id, baseline);
            }
        } else {
            rows.push(Row::new(id, baseline));
        }
    }

    // Super/subscripts sit off the baseline; attach them to the nearest row.
    for id in scripts {
        let baseline = page.fragment(id).baseline_y();
        let nearest = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, (row.baseline() - baseline).abs()))
            .filter(|(_, d)| *d <= config.script_baseline_tolerance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        match nearest {
            Some((i, _)) => rows[i].members.push(id),
            None => rows.push(Row::new(id, baseline)),
        }
    }
    rows.sort_by(|a, b| {
        a.baseline()
            .partial_cmp(&b.baseline())
            .unwrap_or(Ordering::Equal)
    });

    let mut lines = Vec::new();
    for row in rows {
        let baseline = row.baseline();
        for members in split_row(page, row.members, config) {
            lines.push(build_line(page, members, baseline));
        }
    }

    lines.sort_by(|a, b| {
        a.baseline
            .partial_cmp(&b.baseline)
            .unwrap_or(Ordering::Equal)
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });
    for (i, line) in lines.iter_mut().enumerate() {
        line.id = LineId(i as u32);
    }

    log::debug!(
        "page {}: {} fragments -> {} lines",
        page.index,
        ids.len(),
        lines.len()
    );
    lines
}

/// Split one baseline row wherever the horizontal gap is too wide to be a word space.
fn split_row(page: &Page, mut members: Vec<FragmentId>, config: &LayoutConfig) -> Vec<Vec<FragmentId>> {
    members.sort_by(|a, b| {
        page.fragment(*a)
            .bbox
            .x0
            .partial_cmp(&page.fragment(*b).bbox.x0)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    });

    let mut groups: Vec<Vec<FragmentId>> = Vec::new();
    let mut right_edge = f32::MIN;
    let mut current_size = 0.0f32;
    for id in members {
        let frag = page.fragment(id);
        let gap = frag.bbox.x0 - right_edge;
        let limit = config.word_gap_factor * frag.size.max(current_size);
        if gap <= limit && !groups.is_empty() {
            if let Some(group) = groups.last_mut() {
                group.push(id);
            }
            right_edge = right_edge.max(frag.bbox.x1);
            current_size = current_size.max(frag.size);
        } else {
            groups.push(vec![id]);
            right_edge = frag.bbox.x1;
            current_size = frag.size;
        }
    }
    groups
}

fn build_line(page: &Page, fragments: Vec<FragmentId>, row_baseline: f32) -> Line {
    let frags: Vec<_> = fragments.iter().map(|id| page.fragment(*id)).collect();

    let mut text = String::new();
    let mut prev_x1 = 0.0;
    for (i, frag) in frags.iter().enumerate() {
        if i > 0 && needs_space(&text, &frag.text, frag.bbox.x0 - prev_x1, frag.size) {
            text.push(' ');
        }
        text.push_str(&frag.text);
        prev_x1 = frag.bbox.x1;
    }

    // Scripts do not vote on the dominant font unless the line is nothing else.
    let voters: Vec<_> = if frags.iter().all(|f| f.script.is_some()) {
        frags.clone()
    } else {
        frags.iter().copied().filter(|f| f.script.is_none()).collect()
    };

    let mut families: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    let mut sizes: BTreeMap<i32, (usize, usize)> = BTreeMap::new();
    let mut bold_chars = 0;
    let mut total_chars = 0;
    for (order, frag) in voters.iter().enumerate() {
        let chars = frag.char_count().max(1);
        let family = families.entry(frag.font_family.as_str()).or_insert((0, order));
        family.0 += chars;
        let size = sizes.entry((frag.size * 10.0).round() as i32).or_insert((0, order));
        size.0 += chars;
        if frag.is_bold() {
            bold_chars += chars;
        }
        total_chars += chars;
    }

    let font_family = dominant(&families).map(|k| k.to_string()).unwrap_or_default();
    let size = dominant(&sizes).map(|k| k as f32 / 10.0).unwrap_or(0.0);
    let weight = if total_chars > 0 && bold_chars * 2 > total_chars {
        FontWeight::Bold
    } else {
        FontWeight::Normal
    };

    let bbox = BoundingBox::union_all(frags.iter().map(|f| &f.bbox)).unwrap_or_default();
    let baselines: Vec<f32> = voters.iter().map(|f| f.baseline_y()).collect();
    let baseline = if baselines.is_empty() {
        row_baseline
    } else {
        baselines.iter().sum::<f32>() / baselines.len() as f32
    };

    Line {
        id: LineId(0),
        has_script: frags.iter().any(|f| f.script.is_some()),
        fragments,
        bbox,
        baseline,
        text,
        font_family,
        size,
        weight,
    }
}

/// Key with the highest count; ties go to the first seen.
fn dominant<K: Copy + Ord>(counts: &BTreeMap<K, (usize, usize)>) -> Option<K> {
    counts
        .iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(k, _)| *k)
}
