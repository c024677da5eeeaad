//! Moves the cursor out of inline data URIs.
//!
//! Editors render a base64 link as an image until the cursor enters it, at
//! which point the whole payload expands into view. Jumping past the closing
//! parenthesis keeps the line collapsed.

const DATA_URI_OPEN: &str = "(data:image/";

/// Where the cursor should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorTarget {
    /// Same line, at this byte column.
    Column(usize),
    /// Start of the following line.
    NextLine,
}

/// Returns where to move a cursor at byte `column` of `line`, or `None` when
/// it is not inside a data URI.
///
/// Parentheses nest, so a `)` inside the URI does not end it early. An
/// unterminated URI sends the cursor to the next line.
#[must_use]
pub fn escape_target(line: &str, column: usize) -> Option<CursorTarget> {
    let mut search_from = 0;

    while let Some(found) = line[search_from..].find(DATA_URI_OPEN) {
        let open = search_from + found;
        let close = matching_paren(line, open);

        match close {
            Some(close) if column > open && column <= close => {
                return Some(CursorTarget::Column(close + 1));
            }
            None if column > open => return Some(CursorTarget::NextLine),
            None => return None,
            Some(close) => search_from = close + 1,
        }
    }

    None
}

fn matching_paren(line: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, byte) in line.bytes().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
