//! Error codes and the engine-wide error type.
//!
//! Every fallible operation returns `Result<T, VoxError>`. Low-level object
//! and container operations produce a bare error with a code and a message;
//! higher layers wrap it with [`ResultExt::context`], which pushes a frame
//! naming the calling operation before re-signalling.
//!
//! # Handling Policies
//!
//! - **Recoverable**: lookups return `Option` or the caller drops the error.
//! - **Contextual**: the error is wrapped with the operation name and passed on.
//! - **Fatal**: resource exhaustion and invariant violations. Whether these
//!   abort the process or propagate is decided by [`FatalPolicy`].

use std::fmt;

use smallvec::SmallVec;

/// Result alias used throughout the engine.
pub type VoxResult<T> = Result<T, VoxError>;

/// Error category.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// No class registered under the requested name.
    UnknownClass,
    /// A class with the same name is already registered.
    DuplicateClass,
    /// The parent named by a class descriptor is not registered.
    MissingParent,
    /// A value or object is not of the requested type.
    TypeMismatch,
    /// An optional class hook was invoked but the class does not provide it.
    MethodNotImplemented,
    /// An argument was rejected.
    ArgumentError,
    /// Allocation failed.
    MemoryError,
    /// Missing relation/feature, or a graph invariant does not hold.
    StructuralError,
}

impl ErrorCode {
    /// The code's name as it appears in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownClass => "UnknownClass",
            ErrorCode::DuplicateClass => "DuplicateClass",
            ErrorCode::MissingParent => "MissingParent",
            ErrorCode::TypeMismatch => "TypeMismatch",
            ErrorCode::MethodNotImplemented => "MethodNotImplemented",
            ErrorCode::ArgumentError => "ArgumentError",
            ErrorCode::MemoryError => "MemoryError",
            ErrorCode::StructuralError => "StructuralError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level of context added while an error propagated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorFrame {
    /// Name of the operation that re-signalled the error.
    pub operation: &'static str,
    /// What that operation was trying to do.
    pub message: String,
}

/// An engine error: code, message and the context chain, innermost first.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}{}", render_frames(.context))]
pub struct VoxError {
    code: ErrorCode,
    message: String,
    context: SmallVec<[ErrorFrame; 2]>,
    fatal: bool,
}

fn render_frames(frames: &[ErrorFrame]) -> String {
    let mut out = String::new();
    for frame in frames {
        out.push_str("\n  in ");
        out.push_str(frame.operation);
        out.push_str(": ");
        out.push_str(&frame.message);
    }
    out
}

impl VoxError {
    /// Create a non-fatal error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        VoxError {
            code,
            message: message.into(),
            context: SmallVec::new(),
            fatal: code == ErrorCode::MemoryError,
        }
    }

    pub fn unknown_class(name: &str) -> Self {
        Self::new(ErrorCode::UnknownClass, format!("class '{name}' is not registered"))
    }

    pub fn duplicate_class(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateClass,
            format!("class '{name}' is already registered, class names must be unique"),
        )
    }

    pub fn missing_parent(name: &str, parent: &str) -> Self {
        Self::new(
            ErrorCode::MissingParent,
            format!("parent class '{parent}' of '{name}' is not registered"),
        )
    }

    pub fn type_mismatch(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorCode::TypeMismatch,
            format!("expected '{expected}', got '{got}'"),
        )
    }

    pub fn method_not_implemented(class: &str, method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotImplemented,
            format!("class '{class}' does not implement '{method}'"),
        )
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ArgumentError, message)
    }

    /// Allocation failure. Always fatal.
    pub fn memory(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MemoryError, message)
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StructuralError, message)
    }

    /// A broken graph or registry invariant. Always fatal.
    pub fn invariant(message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorCode::StructuralError, message);
        err.fatal = true;
        err
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Context frames, innermost first.
    pub fn context(&self) -> &[ErrorFrame] {
        &self.context
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    /// Push a context frame and hand the error back.
    #[must_use]
    pub fn with_context(mut self, operation: &'static str, message: impl Into<String>) -> Self {
        self.context.push(ErrorFrame {
            operation,
            message: message.into(),
        });
        self
    }

    /// Apply a fatal-error policy.
    ///
    /// Non-fatal errors and the `Propagate` policy return the error
    /// unchanged. A fatal error under `Abort` is logged and the process
    /// aborts.
    #[must_use]
    pub fn escalate(self, policy: FatalPolicy) -> Self {
        if self.fatal && policy == FatalPolicy::Abort {
            tracing::error!(code = %self.code, error = %self, "fatal engine error, aborting");
            std::process::abort();
        }
        self
    }
}

/// Contextual propagation for results.
pub trait ResultExt<T> {
    /// Wrap an error with the calling operation's name and message.
    fn context(self, operation: &'static str, message: impl Into<String>) -> VoxResult<T>;

    /// Like [`ResultExt::context`] but builds the message lazily.
    fn with_context<M: Into<String>>(
        self,
        operation: &'static str,
        message: impl FnOnce() -> M,
    ) -> VoxResult<T>;
}

impl<T> ResultExt<T> for VoxResult<T> {
    #[inline]
    fn context(self, operation: &'static str, message: impl Into<String>) -> VoxResult<T> {
        self.map_err(|e| e.with_context(operation, message))
    }

    #[inline]
    fn with_context<M: Into<String>>(
        self,
        operation: &'static str,
        message: impl FnOnce() -> M,
    ) -> VoxResult<T> {
        self.map_err(|e| e.with_context(operation, message()))
    }
}

/// What to do with fatal errors.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FatalPolicy {
    /// Log and abort the process.
    Abort,
    /// Return the error to the caller like any other.
    Propagate,
}

impl FatalPolicy {
    /// The policy selected at build time (`fatal-abort` feature).
    pub const fn build_default() -> Self {
        if cfg!(feature = "fatal-abort") {
            FatalPolicy::Abort
        } else {
            FatalPolicy::Propagate
        }
    }
}

impl Default for FatalPolicy {
    fn default() -> Self {
        Self::build_default()
    }
}
