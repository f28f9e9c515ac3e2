//! Release metadata extraction from the NOTICE file.
//!
//! Documentation footers carry the last edit year of the project. It is read
//! from the first `Copyright` line of the NOTICE text, which must look like
//! `Copyright 1998-2024 Example Org`. A missing or malformed line stops the
//! build: a wrong year in generated documentation is worse than no build.

use crate::result::{ForjaError, ForjaResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Token identifying the copyright line
pub const COPYRIGHT_MARKER: &str = "Copyright";

const SPAN_PATTERN: &str = r"Copyright (\d{4})-(\d{4})";

fn span_pattern() -> ForjaResult<Regex> {
    Regex::new(SPAN_PATTERN).map_err(|e| ForjaError::Config {
        message: format!("invalid copyright pattern: {e}"),
    })
}

/// First and last year of a copyright notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyrightSpan {
    /// First year
    pub first: u16,
    /// Last edit year
    pub last: u16,
}

/// Extract the copyright span from NOTICE text
pub fn extract_span(notice: &str) -> ForjaResult<CopyrightSpan> {
    let line = notice
        .lines()
        .find(|line| line.contains(COPYRIGHT_MARKER))
        .ok_or_else(|| ForjaError::NoticeMarkerMissing {
            marker: COPYRIGHT_MARKER.to_string(),
        })?;

    let mismatch = || ForjaError::NoticePatternMismatch {
        line: line.trim().to_string(),
    };
    let pattern = span_pattern()?;
    let captures = pattern.captures(line).ok_or_else(mismatch)?;
    let first: u16 = captures[1].parse().map_err(|_| mismatch())?;
    let last: u16 = captures[2].parse().map_err(|_| mismatch())?;
    if first > last {
        return Err(mismatch());
    }
    Ok(CopyrightSpan { first, last })
}

/// Extract the last edit year from NOTICE text
pub fn extract_year(notice: &str) -> ForjaResult<u16> {
    extract_span(notice).map(|span| span.last)
}

/// Read a NOTICE file and extract the last edit year
pub fn read_year(path: &Path) -> ForjaResult<u16> {
    let text = std::fs::read_to_string(path)?;
    extract_year(&text)
}
