//! Paragraph-based pagination of lyric text.

use thiserror::Error;

/// Lyrics are split into paragraphs on blank lines.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

/// A single page of lyric paragraphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LyricsPage {
    pub text: String,
    pub page: usize,
    pub total_pages: usize,
}

impl LyricsPage {
    /// Render the page with its trailing "page X of Y" marker.
    pub fn annotated(&self) -> String {
        format!(
            "{}\n\n... (Page {} of {})",
            self.text, self.page, self.total_pages
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page and limit must both be positive (got page {page}, limit {limit})")]
    InvalidBounds { page: usize, limit: usize },

    #[error("page {page} is beyond the {available} available paragraphs")]
    PageOutOfRange { page: usize, available: usize },
}

/// Split `text` into blank-line-delimited paragraphs and return the
/// requested page.
///
/// When the requested window reaches past the last paragraph, the page
/// holds everything from `page` to the end and the total is the remaining
/// paragraph count; otherwise the total is the number of limit-sized pages
/// the text splits into. Pure function, no side effects.
pub fn paginate(text: &str, page: usize, limit: usize) -> Result<LyricsPage, PaginationError> {
    if page < 1 || limit < 1 {
        return Err(PaginationError::InvalidBounds { page, limit });
    }

    let paragraphs: Vec<&str> = text.split(PARAGRAPH_DELIMITER).collect();
    let available = paragraphs.len();
    if page > available {
        return Err(PaginationError::PageOutOfRange { page, available });
    }

    let first = page - 1;
    let remaining = available - first;
    let (window, total_pages) = if limit >= remaining {
        (&paragraphs[first..], remaining)
    } else {
        (&paragraphs[first..first + limit], available.div_ceil(limit))
    };

    Ok(LyricsPage {
        text: window.join(PARAGRAPH_DELIMITER),
        page,
        total_pages,
    })
}
