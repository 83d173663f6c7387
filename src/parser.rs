//! Record parser: streams a session log and decodes it line by line.

use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::trace;

use crate::control::ScanControl;
use crate::error::{LineError, ScanError};
use crate::models::{MessageInfo, RecordKind, SessionLine, UsageCounts, UsageRecord};
use crate::normalize::ModelKey;
use crate::utils::parse_timestamp;

const CANCEL_CHECK_EVERY: u64 = 1024;

/// Line counters for one file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStats {
    pub lines: u64,
    pub records: u64,
    pub skipped: u64,
}

/// Decode one non-blank line into a record.
pub fn decode_line(line: &[u8]) -> Result<UsageRecord, LineError> {
    let raw: Value = serde_json::from_slice(line)?;
    if !raw.is_object() {
        return Err(serde_json::Error::custom("log line is not a JSON object").into());
    }
    let parsed = SessionLine::deserialize(&raw)?;
    let ts = parsed
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or(LineError::TimestampUnparsable)?;

    let message = parsed.message.map(|m| MessageInfo {
        key: ModelKey::new(m.provider.as_deref(), m.model.as_deref()),
        stop_reason: m.stop_reason,
        usage: m.usage.map(|u| UsageCounts {
            input: clamp(u.input),
            output: clamp(u.output),
            cache_read: clamp(u.cache_read),
            cache_write: clamp(u.cache_write),
            total_tokens: u.total_tokens,
            cost: u.cost.map(|c| c.total).unwrap_or(0.0).max(0.0),
        }),
    });

    Ok(UsageRecord::new(
        RecordKind::from_type(parsed.r#type.as_deref()),
        ts,
        message,
        raw,
    ))
}

fn clamp(v: i64) -> u64 {
    v.max(0) as u64
}

/// Stream `path`, calling `on_record` for every decodable line.
///
/// Bad lines are skipped. Errors are `FileUnreadable` for open/read
/// failures and `Cancelled` when `ctl` fires; records already delivered
/// stay delivered.
pub fn scan_log<F>(
    path: &Path,
    ctl: &ScanControl,
    max_line_bytes: usize,
    mut on_record: F,
) -> Result<FileStats, ScanError>
where
    F: FnMut(&UsageRecord),
{
    let unreadable = |source| ScanError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut buf = Vec::with_capacity(64 * 1024);
    let mut stats = FileStats::default();

    loop {
        let read = read_line_bounded(&mut reader, &mut buf, max_line_bytes).map_err(unreadable)?;
        let line = match read {
            LineRead::Eof => break,
            LineRead::TooLong => {
                stats.lines += 1;
                stats.skipped += 1;
                trace!(path = %path.display(), line = stats.lines, "{}", LineError::TooLong(max_line_bytes));
                continue;
            }
            LineRead::Line => buf.trim_ascii(),
        };
        stats.lines += 1;
        if stats.lines % CANCEL_CHECK_EVERY == 0 {
            ctl.check()?;
        }
        if line.is_empty() {
            continue;
        }
        match decode_line(line) {
            Ok(record) => {
                stats.records += 1;
                on_record(&record);
            }
            Err(err) => {
                stats.skipped += 1;
                trace!(path = %path.display(), line = stats.lines, error = %err, "skipping line");
            }
        }
    }
    Ok(stats)
}

#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Line,
    TooLong,
    Eof,
}

/// Read up to the next `\n` into `buf` without letting it grow past `max`.
/// An over-long line is consumed and reported as `TooLong`.
fn read_line_bounded<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> io::Result<LineRead> {
    buf.clear();
    let mut overflow = false;
    let mut seen_any = false;
    loop {
        let (done, used) = {
            let available = match reader.fill_buf() {
                Ok(b) => b,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(match (seen_any, overflow) {
                    (false, _) => LineRead::Eof,
                    (true, true) => LineRead::TooLong,
                    (true, false) => LineRead::Line,
                });
            }
            seen_any = true;
            let (chunk, done, used) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..i], true, i + 1),
                None => (available, false, available.len()),
            };
            if !overflow {
                if buf.len() + chunk.len() > max {
                    overflow = true;
                    buf.clear();
                } else {
                    buf.extend_from_slice(chunk);
                }
            }
            (done, used)
        };
        reader.consume(used);
        if done {
            return Ok(if overflow {
                LineRead::TooLong
            } else {
                LineRead::Line
            });
        }
    }
}
