//! Display equation detection.

use crate::model::{Block, Page, Role};

use super::HeuristicsConfig;

const OPERATORS: [char; 17] = [
    '=', '+', '−', '×', '÷', '±', '≤', '≥', '≈', '≠', '∑', '∏', '∫', '√', '∞', '∂', '∇',
];

pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

pub fn is_greek(c: char) -> bool {
    ('\u{0391}'..='\u{03C9}').contains(&c)
}

/// Share of non-space characters that are operators or Greek letters.
pub fn math_density(text: &str) -> f32 {
    let mut total = 0usize;
    let mut math = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_operator(c) || is_greek(c) {
            math += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        math as f32 / total as f32
    }
}

fn looks_like_equation(page: &Page, block: &Block, config: &HeuristicsConfig) -> bool {
    if block.line_count() == 0 || block.line_count() > config.max_equation_lines {
        return false;
    }
    if math_density(&block.text) >= config.min_math_density {
        return true;
    }
    let has_script = block.lines.iter().any(|id| page.line(*id).has_script);
    has_script && block.text.chars().any(is_operator)
}

/// Tag untagged blocks that read as display equations.
pub fn tag_equations(page: &mut Page, config: &HeuristicsConfig) -> usize {
    let found: Vec<_> = page
        .ordered_blocks()
        .filter(|b| b.role.is_none() && looks_like_equation(page, b, config))
        .map(|b| b.id)
        .collect();
    for id in &found {
        page.block_mut(*id).role = Some(Role::Equation);
    }
    found.len()
}
