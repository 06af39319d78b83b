//! `vmstat -n -t` output, used as the broker-side disk write rate
//!
//! ```text
//! procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu----- -----timestamp-----
//!  r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st                 EST
//!  1  0      0  61822      0   1405    0    0     0  4096 1204 2210  3  2 95  0  0 2019-03-01 12:00:01
//! ```

use super::parse_number;
use crate::error::ParseError;
use crate::parser::timestamp::parse_timestamp;
use crate::sample::Sample;

/// Position of `bo` when the header does not name it
pub const DEFAULT_BO_COLUMN: usize = 9;

/// Block size used to convert `bo` to bytes
const BLOCK_BYTES: f64 = 512.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Row parser bound to the column layout announced by the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmstatLineParser {
    bo_column: usize,
}

impl VmstatLineParser {
    /// Locate the `bo` column from the header line, if there is one
    pub fn from_header(header: Option<&str>) -> Self {
        let bo_column = header
            .and_then(|h| h.split_whitespace().position(|name| name == "bo"))
            .unwrap_or(DEFAULT_BO_COLUMN);
        Self { bo_column }
    }

    pub fn bo_column(&self) -> usize {
        self.bo_column
    }

    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<Sample, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(ParseError::MissingField {
                line: line_no,
                field: self.bo_column,
            });
        }

        let stamp = tokens[tokens.len() - 2..].join(" ");
        let timestamp = parse_timestamp(&stamp).ok_or_else(|| ParseError::InvalidTimestamp {
            line: line_no,
            value: stamp.clone(),
        })?;

        // The two timestamp tokens are not data columns
        let bo_text = tokens
            .get(self.bo_column)
            .filter(|_| self.bo_column < tokens.len() - 2)
            .ok_or(ParseError::MissingField {
                line: line_no,
                field: self.bo_column,
            })?;
        let blocks_out = parse_number(line_no, bo_text)?;

        Ok(Sample::new(
            timestamp,
            None,
            blocks_out * BLOCK_BYTES / BYTES_PER_MB,
        ))
    }
}
