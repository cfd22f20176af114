//! Context assembly.
//!
//! Ranked passages are rendered into numbered blocks joined by a line of
//! dashes, which never appears inside a passage, so the context can be split
//! back into its blocks.

use crate::types::ScoredPassage;

/// Separator placed between passage blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Render results in the order given. Empty input gives an empty string.
pub fn assemble(results: &[ScoredPassage<'_>]) -> String {
    render_blocks(results).join(BLOCK_SEPARATOR)
}

/// Like [`assemble`], but drops trailing blocks once the context would
/// exceed `max_chars` characters. The first block is always kept.
pub fn assemble_with_budget(results: &[ScoredPassage<'_>], max_chars: Option<usize>) -> String {
    let Some(max_chars) = max_chars else {
        return assemble(results);
    };

    let separator_chars = BLOCK_SEPARATOR.chars().count();
    let mut kept: Vec<String> = Vec::new();
    let mut used = 0usize;

    for block in render_blocks(results) {
        let cost = block.chars().count() + if kept.is_empty() { 0 } else { separator_chars };
        if !kept.is_empty() && used + cost > max_chars {
            tracing::debug!(
                "Context budget of {} chars reached; dropping {} of {} blocks",
                max_chars,
                results.len() - kept.len(),
                results.len()
            );
            break;
        }
        used += cost;
        kept.push(block);
    }

    kept.join(BLOCK_SEPARATOR)
}

/// Split an assembled context back into its blocks.
pub fn split_context(context: &str) -> Vec<&str> {
    if context.is_empty() {
        return Vec::new();
    }
    context.split(BLOCK_SEPARATOR).collect()
}

fn render_blocks(results: &[ScoredPassage<'_>]) -> Vec<String> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[PASSAGE {} | score={:.4}]\n{}",
                i + 1,
                result.score,
                result.passage.text
            )
        })
        .collect()
}
