//! Fixed-pitch measurement backend.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::measure::{MeasureError, MeasureRequest, TextMeasurer};

/// Measures text in terminal-style fixed-pitch cells.
///
/// Every grapheme cluster occupies its `unicode-width` cell count and lines
/// wrap greedily at word boundaries, with over-wide words broken cluster by
/// cluster. The font attributes in the request are ignored; fixed pitch has
/// no use for them. Hosts rendering proportional fonts supply their own
/// [`TextMeasurer`] instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonospaceMeasurer;

impl TextMeasurer for MonospaceMeasurer {
    fn truncation_offset(&self, request: &MeasureRequest) -> Result<usize, MeasureError> {
        if request.width == 0 {
            return Err(MeasureError::new("width must be positive"));
        }
        if request.line_limit == 0 {
            return Err(MeasureError::new("line limit must be positive"));
        }
        if request.text.is_empty() {
            return Ok(0);
        }

        let total_chars = request.text.chars().count();
        if wrapped_line_count(&request.text, request.width) <= request.line_limit {
            return Ok(total_chars);
        }

        Ok(largest_fitting_offset(request))
    }
}

/// Binary search over grapheme boundaries for the longest slice whose text
/// plus the affordance suffix still wraps into the line budget.
fn largest_fitting_offset(request: &MeasureRequest) -> usize {
    let boundaries = grapheme_boundaries(&request.text);
    let fits = |boundary: &(usize, usize)| {
        let mut candidate =
            String::with_capacity(boundary.0 + request.link_text.len());
        candidate.push_str(&request.text[..boundary.0]);
        candidate.push_str(&request.link_text);
        wrapped_line_count(&candidate, request.width) <= request.line_limit
    };

    if !fits(&boundaries[0]) {
        return 0;
    }

    // The full text alone overflows the budget, so the last boundary with the
    // suffix appended cannot fit; the invariant lo-fits / hi-does-not holds.
    let mut lo = 0;
    let mut hi = boundaries.len() - 1;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(&boundaries[mid]) {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    boundaries[lo].1
}

/// Grapheme cluster boundaries as `(byte index, chars before the boundary)`,
/// including both ends of the text.
fn grapheme_boundaries(text: &str) -> Vec<(usize, usize)> {
    let mut boundaries = Vec::new();
    boundaries.push((0, 0));

    let mut chars_so_far = 0;
    for (byte_idx, grapheme) in text.grapheme_indices(true) {
        chars_so_far += grapheme.chars().count();
        boundaries.push((byte_idx + grapheme.len(), chars_so_far));
    }

    boundaries
}

/// Lines occupied by `text` at `width` cells under greedy word wrapping.
fn wrapped_line_count(text: &str, width: usize) -> usize {
    let mut lines = 1;
    let mut column = 0;

    for segment in text.split_word_bounds() {
        if segment.contains('\n') {
            lines += segment.matches('\n').count();
            column = 0;
            continue;
        }

        let segment_width = cell_width(segment);
        if segment_width == 0 {
            continue;
        }

        if column + segment_width <= width {
            column += segment_width;
            continue;
        }

        if segment.chars().all(char::is_whitespace) {
            // Whitespace at the wrap point collapses into the break.
            lines += 1;
            column = 0;
            continue;
        }

        if segment_width <= width {
            lines += 1;
            column = segment_width;
            continue;
        }

        // Over-wide word: hard-break cluster by cluster.
        for grapheme in segment.graphemes(true) {
            let grapheme_cells = cell_width(grapheme);
            if column + grapheme_cells > width && column > 0 {
                lines += 1;
                column = 0;
            }
            column += grapheme_cells;
        }
    }

    lines
}

fn cell_width(segment: &str) -> usize {
    segment
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}
