use crate::error::{IndexError, Result};
use regex::Regex;

/// Collapses whitespace runs and strips characters outside word characters
/// and common punctuation. Normalization utility for text arriving from
/// external collaborators such as scrapers and web lookups.
pub fn clean_text(text: &str) -> Result<String> {
    let collapse = Regex::new(r"\s+")?;
    let strip = Regex::new(r"[^\w\s.,!?\-:;()\[\]{}]")?;

    let collapsed = collapse.replace_all(text.trim(), " ");
    Ok(strip.replace_all(&collapsed, "").into_owned())
}

/// Splits `text` into overlapping windows of at most `chunk_size` characters,
/// snapping window ends to sentence boundaries where one falls past the
/// window midpoint. Adjacent windows overlap by `overlap` characters.
///
/// `overlap` must be smaller than `chunk_size`; anything else would stall or
/// regress the window and is rejected up front.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(IndexError::InvalidChunkConfig(
            "chunk size must be positive".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(IndexError::InvalidChunkConfig(format!(
            "overlap {overlap} must be smaller than chunk size {chunk_size}"
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        let trimmed = text.trim();
        return Ok(if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        });
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = start + chunk_size;

        if end < chars.len() {
            if let Some(period) = last_period(&chars, start, end) {
                if period > start + chunk_size / 2 {
                    end = period + 1;
                }
            }
        }

        let clamped = end.min(chars.len());
        let piece: String = chars[start..clamped].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        // A snapped window shorter than the overlap would move the cursor
        // backwards; jump past the window instead.
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { clamped };
    }

    Ok(chunks)
}

fn last_period(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let end = end.min(chars.len());
    chars[start..end]
        .iter()
        .rposition(|c| *c == '.')
        .map(|offset| start + offset)
}
