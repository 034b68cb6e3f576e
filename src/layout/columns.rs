//! Column detection and reading order.

use std::cmp::Ordering;

use crate::model::{Block, BlockId, Column, ColumnId, Diagnostic, DiagnosticKind, Line};

use super::LayoutConfig;

/// A cluster of block x0 values.
#[derive(Debug, Clone)]
struct Cluster {
    members: Vec<usize>,
    x0: f32,
    x1: f32,
}

impl Cluster {
    fn absorb(&mut self, other: Cluster) {
        self.members.extend(other.members);
        self.members.sort_unstable();
        self.x0 = self.x0.min(other.x0);
        self.x1 = self.x1.max(other.x1);
    }
}

/// Assign column ids to blocks and return the detected columns.
///
/// Full-width blocks keep `column == None`.
pub fn assign_columns(blocks: &mut [Block], page_width: f32, config: &LayoutConfig) -> Vec<Column> {
    let full_width = config.full_width_ratio * page_width;
    let mut candidates: Vec<usize> = (0..blocks.len())
        .filter(|i| blocks[*i].bbox.width() < full_width)
        .collect();
    candidates.sort_by(|a, b| {
        blocks[*a]
            .bbox
            .x0
            .partial_cmp(&blocks[*b].bbox.x0)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    });

    // Gap-based 1-D clustering of x0.
    let gap = config.column_gap_ratio * page_width;
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut prev_x0 = f32::MIN;
    for i in candidates {
        let bbox = blocks[i].bbox;
        let starts_new = clusters.is_empty() || bbox.x0 - prev_x0 > gap;
        if starts_new {
            clusters.push(Cluster {
                members: vec![i],
                x0: bbox.x0,
                x1: bbox.x1,
            });
        } else if let Some(cluster) = clusters.last_mut() {
            cluster.members.push(i);
            cluster.x1 = cluster.x1.max(bbox.x1);
        }
        prev_x0 = bbox.x0;
    }

    fold_small_clusters(&mut clusters, blocks, config);

    let columns: Vec<Column> = clusters
        .iter()
        .enumerate()
        .map(|(i, c)| Column {
            id: ColumnId(i as u16),
            x0: c.x0,
            x1: c.x1,
        })
        .collect();
    for (cluster, column) in clusters.iter().zip(&columns) {
        for &i in &cluster.members {
            blocks[i].column = Some(column.id);
        }
    }

    let content_left = blocks
        .iter()
        .map(|b| b.bbox.x0)
        .fold(f32::MAX, f32::min);
    for block in blocks.iter_mut() {
        let left = match block.column {
            Some(id) => columns[id.0 as usize].x0,
            None => content_left,
        };
        block.indent = (block.bbox.x0 - left).max(0.0);
    }

    log::debug!(
        "{} columns: {:?}",
        columns.len(),
        columns.iter().map(|c| (c.x0, c.x1)).collect::<Vec<_>>()
    );
    columns
}

/// Fold sparse clusters (a centered heading, an indented quote) into the
/// column whose horizontal extent contains them.
fn fold_small_clusters(clusters: &mut Vec<Cluster>, blocks: &[Block], config: &LayoutConfig) {
    loop {
        let mut merge: Option<(usize, usize)> = None;
        for (i, small) in clusters.iter().enumerate() {
            if small.members.len() >= config.min_column_blocks {
                continue;
            }
            let host = clusters.iter().enumerate().find(|(j, host)| {
                *j != i
                    && small.members.iter().all(|m| {
                        let b = &blocks[*m].bbox;
                        b.x0 >= host.x0 - config.indent_tolerance
                            && b.x1 <= host.x1 + config.indent_tolerance
                    })
            });
            if let Some((j, _)) = host {
                merge = Some((i, j));
                break;
            }
        }
        match merge {
            Some((small, host)) => {
                let taken = clusters.remove(small);
                let host = if host > small { host - 1 } else { host };
                clusters[host].absorb(taken);
            }
            None => break,
        }
    }
}

/// Order blocks for reading.
///
/// Full-width blocks cut the page into bands. Inside a band, blocks are
/// stable-sorted by (column, y0); bands and the full-width blocks between
/// them follow top to bottom. Ties keep block id order.
pub fn reading_order(blocks: &mut [Block]) -> Vec<BlockId> {
    let by_y = |a: &&Block, b: &&Block| {
        a.bbox
            .y0
            .partial_cmp(&b.bbox.y0)
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    };

    let mut spanning: Vec<&Block> = blocks.iter().filter(|b| b.is_full_width()).collect();
    spanning.sort_by(by_y);

    let band_of = |block: &Block| spanning.iter().filter(|s| s.bbox.y0 <= block.bbox.y0).count();

    let mut bands: Vec<Vec<&Block>> = vec![Vec::new(); spanning.len() + 1];
    for block in blocks.iter().filter(|b| !b.is_full_width()) {
        bands[band_of(block)].push(block);
    }

    let mut order = Vec::with_capacity(blocks.len());
    for (band_index, band) in bands.iter_mut().enumerate() {
        if band_index > 0 {
            order.push(spanning[band_index - 1].id);
        }
        band.sort_by(|a, b| a.column.cmp(&b.column).then_with(|| by_y(a, b)));
        order.extend(band.iter().map(|b| b.id));
    }

    for (position, id) in order.iter().enumerate() {
        blocks[id.0 as usize].reading_order = Some(position as u32);
    }
    order
}

/// Flag pages where lines sit side by side but only one column was found.
pub fn check_degenerate(
    lines: &[Line],
    columns: &[Column],
    page_width: f32,
    config: &LayoutConfig,
) -> Option<Diagnostic> {
    if columns.len() > 1 {
        return None;
    }

    let split_gap = config.column_gap_ratio * page_width / 3.0;
    let mut rows = 0usize;
    let mut split_rows = 0usize;
    let mut i = 0;
    while i < lines.len() {
        let mut j = i + 1;
        while j < lines.len() && (lines[j].baseline - lines[i].baseline).abs() <= config.baseline_tolerance {
            j += 1;
        }
        rows += 1;
        let mut row: Vec<&Line> = lines[i..j].iter().collect();
        row.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));
        if row.windows(2).any(|w| w[1].bbox.x0 - w[0].bbox.x1 > split_gap) {
            split_rows += 1;
        }
        i = j;
    }

    if rows >= 4 && split_rows as f32 >= config.side_by_side_ratio * rows as f32 {
        Some(Diagnostic::new(
            DiagnosticKind::ColumnLayoutDegenerate,
            format!(
                "{} of {} text rows hold side-by-side lines but {} column(s) were detected",
                split_rows,
                rows,
                columns.len()
            ),
        ))
    } else {
        None
    }
}
