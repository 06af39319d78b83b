//! Timestamping of live tool output
//!
//! Benchmark tools such as `kafka-producer-perf-test.sh` print report lines
//! without a wall-clock time. Piping them through [`stamp_lines`] produces the
//! `<timestamp>, <line>` form the parsers expect.

use crate::parser::TIMESTAMP_FORMAT;
use chrono::{Local, NaiveDateTime};
use std::io::{self, BufRead, Write};

/// Wall-clock time in the local timezone
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Copy `reader` to `writer` line by line, prefixing each line with `clock()`
///
/// Each line is flushed as soon as it is written so an interrupted benchmark
/// still leaves a usable log. Returns the number of lines written.
pub fn stamp_lines<R, W, C>(reader: R, mut writer: W, mut clock: C) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    C: FnMut() -> NaiveDateTime,
{
    let mut count = 0;
    for line in reader.lines() {
        let line = line?;
        writeln!(writer, "{}, {}", clock().format(TIMESTAMP_FORMAT), line)?;
        writer.flush()?;
        count += 1;
    }
    Ok(count)
}
