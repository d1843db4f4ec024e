//! Error types for stores, quiz sessions, and drafts.
//!
//! `StoreError` lives in `quizdeck-core` so the session can downcast store
//! failures without string matching, even though the stores themselves are
//! implemented in `quizdeck-store`.

use thiserror::Error;

/// Errors that can occur when talking to a question store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested question set does not exist.
    #[error("question set not found: {0}")]
    NotFound(String),

    /// The store rejected our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The store returned an error response.
    #[error("store error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The store returned data we could not interpret.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Local storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors raised by a quiz session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No question set has been loaded.
    #[error("no question set is loaded")]
    NotLoaded,

    /// The quiz has not been submitted yet.
    #[error("the quiz has not been submitted")]
    NotSubmitted,

    /// No available set matches the requested id or name.
    #[error("unknown question set: {0}")]
    UnknownSet(String),

    /// A load finished after a newer one was started.
    #[error("discarded stale response (generation {got}, current {current})")]
    Stale { got: u64, current: u64 },

    /// The store failed to deliver questions.
    #[error("failed to load questions: {0}")]
    Load(String),

    /// The store did not answer in time.
    #[error("loading questions timed out after {0}s")]
    Timeout(u64),
}

/// Errors raised while editing or submitting a draft.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("question {index} out of range (draft has {len})")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("choice {index} out of range (question has {len})")]
    ChoiceOutOfRange { index: usize, len: usize },

    /// Removing the choice would leave the question without choices.
    #[error("a question must keep at least one choice")]
    LastChoice,

    #[error("answer must be an integer choice index, got {0:?}")]
    InvalidAnswer(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unknown question type: {0}")]
    InvalidType(String),

    /// Title (or set name) is blank.
    #[error("a title is required before submitting")]
    MissingTitle,

    #[error("the draft has no questions")]
    EmptyDraft,

    #[error("unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}
