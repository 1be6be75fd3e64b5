use thiserror::Error;

/// Errors returned when a [`Cursor`](crate::Cursor) cannot be used.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorError {
    /// The cursor is the end sentinel; there is no entry to read or move past.
    #[error("cursor is at the end of the tree")]
    End,

    /// The tree changed structurally after the cursor was created.
    ///
    /// Overwriting the value of an existing key is not a structural change.
    #[error("cursor was invalidated by a structural change to the tree")]
    Stale,
}
