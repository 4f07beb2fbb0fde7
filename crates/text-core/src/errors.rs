pub type TextResult<T> = Result<T, TextError>;

/// Errors surfaced at the public `Buffer` boundary.
///
/// Every public operation validates its arguments before touching any
/// state, so an `Err` always means "nothing happened".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    /// A mutation was attempted while the buffer is marked read-only.
    ReadOnly,
    /// A single offset fell outside the buffer. Carries the offending
    /// offset and the buffer length so script-level callers can report
    /// something useful.
    OffsetOutOfBounds { offset: usize, len: usize },
    /// A `[start, end)` pair with `start > end` or `end` past the buffer.
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },
}

impl std::fmt::Display for TextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextError::ReadOnly => write!(f, "buffer is read-only"),
            TextError::OffsetOutOfBounds { offset, len } => {
                write!(f, "offset {offset} out of bounds (len={len})")
            }
            TextError::InvalidRange { start, end, len } => {
                write!(f, "invalid range [{start},{end}) (len={len})")
            }
        }
    }
}

impl std::error::Error for TextError {}
