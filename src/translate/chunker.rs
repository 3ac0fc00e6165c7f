//! Paragraph chunking for long translation inputs.
//!
//! The provider rejects oversized requests in practice, so long text is split
//! on blank-line boundaries and translated chunk by chunk. Splitting and
//! rejoining on the same separator keeps untouched chunks byte-identical.

/// Separator used both to split and to reassemble chunks.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Inputs shorter than this are translated in a single provider call.
pub const CHUNK_THRESHOLD: usize = 3000;

pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split(PARAGRAPH_SEPARATOR).collect()
}

/// Whether a chunk should be sent to the provider at all.
///
/// Whitespace-only chunks and chunks that are entirely a fenced code block
/// pass through verbatim.
pub fn should_translate(chunk: &str) -> bool {
    let trimmed = chunk.trim();
    if trimmed.is_empty() {
        return false;
    }
    !is_fenced_code_block(trimmed)
}

fn is_fenced_code_block(trimmed: &str) -> bool {
    trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```")
}
