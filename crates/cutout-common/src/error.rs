//! Error types for Cutout.
//!
//! Only asset loading can fail. Playback reports soft failures (unknown
//! animation names, empty hit tests) through `Option` and `bool` instead.

use thiserror::Error;

/// Errors raised while building an animation library from asset data.
///
/// Every variant is fatal to the load that produced it. Line numbers are
/// 1-based and refer to the text asset being parsed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The asset is empty.
    #[error("Asset is empty: expected SPRITESHEET_FILENAME or COMBO_FILENAME header")]
    MissingHeader,

    /// The first record is not a recognised header.
    #[error("Unexpected header record '{found}'")]
    UnexpectedHeader {
        /// Tag found in column 0 of the first line
        found: String,
    },

    /// A header record is missing or out of place.
    #[error("Line {line}: expected {expected} record")]
    MissingRecord {
        /// Line number
        line: usize,
        /// Tag that should appear here
        expected: &'static str,
    },

    /// A record has a missing or non-numeric field.
    #[error("Line {line}: malformed {tag} field at column {column}")]
    MalformedField {
        /// Line number
        line: usize,
        /// Record tag
        tag: String,
        /// Zero-based column of the bad field
        column: usize,
    },

    /// A record appeared before the record that opens its context.
    #[error("Line {line}: {tag} record has no enclosing {expected}")]
    MissingContext {
        /// Line number
        line: usize,
        /// Record tag
        tag: String,
        /// What should have been declared first
        expected: &'static str,
    },

    /// A part index is outside the declared part table.
    #[error("Line {line}: part index {index} out of range (declared {count} parts)")]
    PartIndexOutOfRange {
        /// Line number
        line: usize,
        /// Offending part index
        index: i64,
        /// Declared part count
        count: usize,
    },

    /// More animations than the header declared.
    #[error("Line {line}: animation count exceeds declared total of {declared}")]
    AnimationOverflow {
        /// Line number
        line: usize,
        /// Declared animation count
        declared: usize,
    },

    /// A declared count is larger than the asset could possibly define.
    #[error("Line {line}: {tag} count {value} exceeds limit of {limit}")]
    CountOutOfRange {
        /// Line number
        line: usize,
        /// Record tag
        tag: String,
        /// Declared count
        value: usize,
        /// Largest count the asset can satisfy
        limit: usize,
    },

    /// A declared part was never defined.
    #[error("Part {index} is declared but never defined")]
    MissingPart {
        /// Part index
        index: usize,
    },

    /// A key index is outside the animation's declared key count.
    #[error("Line {line}: key {key} out of range for animation with {count} keys")]
    KeyIndexOutOfRange {
        /// Line number
        line: usize,
        /// Offending key index
        key: i64,
        /// Declared key count
        count: usize,
    },

    /// A key lists more parts than the animation's part range holds.
    #[error("Line {line}: key lists more than {rows} parts")]
    KeyRowOverflow {
        /// Line number
        line: usize,
        /// Rows available in the key grid
        rows: usize,
    },

    /// A key grid cell was never populated.
    #[error("Animation '{animation}': no keyframe for part row {row} at key {key}")]
    IncompleteKeys {
        /// Animation name
        animation: String,
        /// Part row inside the animation's part range
        row: usize,
        /// Key index
        key: usize,
    },

    /// Time stamp count does not match the key grid.
    #[error("Animation '{animation}': {times} time stamps for {keys} keys")]
    KeyCountMismatch {
        /// Animation name
        animation: String,
        /// Number of time stamps
        times: usize,
        /// Number of key columns
        keys: usize,
    },

    /// Key grid row count does not match the animation's part range.
    #[error("Animation '{animation}': key grid has {rows} rows for a range of {parts} parts")]
    PartRowMismatch {
        /// Animation name
        animation: String,
        /// Rows in the key grid
        rows: usize,
        /// Length of the part range
        parts: usize,
    },

    /// An animation has no keys.
    #[error("Animation '{animation}' has no keys")]
    EmptyTimeline {
        /// Animation name
        animation: String,
    },

    /// Time stamps decrease.
    #[error("Animation '{animation}': time of key {key} is earlier than the previous key")]
    NonMonotonicTimes {
        /// Animation name
        animation: String,
        /// First key whose time decreases
        key: usize,
    },

    /// The animation drives parts the library does not have.
    #[error("Animation '{animation}': part range ends at {end} but library has {parts} parts")]
    PartRangeOutOfBounds {
        /// Animation name
        animation: String,
        /// Exclusive end of the part range
        end: usize,
        /// Parts in the library
        parts: usize,
    },

    /// A keyframe references a part the library does not have.
    #[error("Animation '{animation}': keyframe references unknown part {part}")]
    UnknownPart {
        /// Animation name
        animation: String,
        /// Referenced part index
        part: usize,
    },

    /// Two animations share a lookup key.
    #[error("Duplicate animation '{name}' in section '{section}'")]
    DuplicateAnimation {
        /// Sheet section name
        section: String,
        /// Animation name
        name: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for asset loading.
pub type LoadResult<T> = Result<T, LoadError>;
