use std::io;
use std::path::PathBuf;

/// Failures a scan can report to its caller.
///
/// Only `RootUnreadable` and `Cancelled` ever escape a public scan
/// function. `FileUnreadable` is produced per file and absorbed by the
/// driver after logging.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("agents root {} cannot be listed: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("scan cancelled before completion")]
    Cancelled,
}

/// Why a single line contributed nothing.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("invalid log record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("missing or unparsable timestamp")]
    TimestampUnparsable,
    #[error("line longer than {0} bytes")]
    TooLong(usize),
}
