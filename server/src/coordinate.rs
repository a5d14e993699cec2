//! Two-character tile coordinates such as `A1`, `1A` or `c7`.
//!
//! The digit picks the column (1-based on the wire) and the letter picks the
//! row, matching the header and row labels the renderer draws.

use crate::game::{FIELD_HEIGHT, FIELD_WIDTH};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("a coordinate is exactly two characters")]
    WrongLength,

    #[error("a coordinate is one digit and one letter")]
    Malformed,

    #[error("coordinate lies outside the field")]
    OutOfRange,
}

/// Parses a coordinate into `(x, y)` grid indices.
pub fn parse_coordinate(input: &str) -> Result<(usize, usize), CoordinateError> {
    let chars: Vec<char> = input.chars().collect();
    let [first, second] = chars[..] else {
        return Err(CoordinateError::WrongLength);
    };

    let (digit, letter) = match (first.is_ascii_digit(), second.is_ascii_digit()) {
        (true, false) => (first, second),
        (false, true) => (second, first),
        _ => return Err(CoordinateError::Malformed),
    };

    if !letter.is_ascii_alphabetic() {
        return Err(CoordinateError::Malformed);
    }

    let column = digit.to_digit(10).ok_or(CoordinateError::Malformed)? as usize;
    let row = (letter.to_ascii_uppercase() as u8 - b'A') as usize;

    if column == 0 || column > FIELD_WIDTH || row >= FIELD_HEIGHT {
        return Err(CoordinateError::OutOfRange);
    }

    Ok((column - 1, row))
}

pub fn row_label(y: usize) -> char {
    (b'A' + y as u8) as char
}

/// Inverse of [`parse_coordinate`], letter first.
pub fn format_coordinate(x: usize, y: usize) -> String {
    format!("{}{}", row_label(y), x + 1)
}
