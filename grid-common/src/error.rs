// Copyright 2026 grid Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    backtrace::Backtrace,
    fmt::{Debug, Display},
    sync::Arc,
};

/// All kinds of [`Error`] raised by grid components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid configuration, fatal to starting the component.
    Config,
    /// Malformed or truncated encoded bytes.
    Decode,
    /// A value cannot be represented in its wire format.
    Encode,
    /// The lock coordinator denied a lock request.
    LockConflict,
    /// The lock coordinator gave up waiting for a lock.
    LockTimeout,
    /// Error raised by user code, e.g. a visitor or a listener.
    External,
}

impl ErrorKind {
    /// Convert self into static str.
    pub fn into_static(self) -> &'static str {
        self.into()
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

impl From<ErrorKind> for &'static str {
    fn from(v: ErrorKind) -> &'static str {
        match v {
            ErrorKind::Config => "Config error",
            ErrorKind::Decode => "Decode error",
            ErrorKind::Encode => "Encode error",
            ErrorKind::LockConflict => "Lock conflict",
            ErrorKind::LockTimeout => "Lock timeout",
            ErrorKind::External => "External error",
        }
    }
}

/// Error returned by grid functions.
///
/// `Display` prints a single line:
///
/// ```shell
/// Lock conflict, context: { key: 42, owner: GlobalTransaction(node-1:7) } => key is locked by another transaction
/// ```
///
/// `Debug` prints the same information over multiple lines, plus the source and the backtrace if captured.
/// The alternate form (`{:#?}`) prints the conventional struct representation.
pub struct Error {
    kind: ErrorKind,
    message: String,

    context: Vec<(&'static str, String)>,

    source: Option<Arc<anyhow::Error>>,
    backtrace: Option<Arc<Backtrace>>,
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            return f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("message", &self.message)
                .field("context", &self.context)
                .field("source", &self.source)
                .field("backtrace", &self.backtrace)
                .finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "  {k}: {v}")?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source:")?;
            writeln!(f, "  {source:#}")?;
        }

        if let Some(backtrace) = &self.backtrace {
            writeln!(f)?;
            writeln!(f, "Backtrace:")?;
            writeln!(f, "{backtrace}")?;
        }

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            let mut iter = self.context.iter().peekable();
            while let Some((k, v)) = iter.next() {
                write!(f, "{k}: {v}")?;
                if iter.peek().is_some() {
                    write!(f, ", ")?;
                }
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref().as_ref())
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            context: self.context.clone(),
            source: self.source.clone(),
            backtrace: self.backtrace.clone(),
        }
    }
}

impl Error {
    /// Create a new error.
    ///
    /// ```rust
    /// # use grid_common::error::{Error, ErrorKind};
    /// let err = Error::new(ErrorKind::Config, "max entries must be positive").with_context("max_entries", 0);
    /// assert_eq!(err.kind(), ErrorKind::Config);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
            backtrace: Some(Arc::new(Backtrace::capture())),
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Set source for error.
    ///
    /// Setting the source twice is a bug and panics in debug builds.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(Arc::new(source.into()));
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the error context.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Get the error backtrace.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_deref()
    }

    /// Get the error source.
    pub fn source(&self) -> Option<&anyhow::Error> {
        self.source.as_deref()
    }

    /// Downcast the reference of the source error to a specific error type reference.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }
}

/// Helper constructors.
impl Error {
    /// Helper for creating an [`ErrorKind::Config`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Helper for creating an [`ErrorKind::Decode`] error for a buffer that ended early.
    pub fn truncated(what: &'static str, required: usize, remaining: usize) -> Self {
        Error::new(ErrorKind::Decode, "unexpected end of buffer")
            .with_context("reading", what)
            .with_context("required", required)
            .with_context("remaining", remaining)
    }

    /// Helper for wrapping an error raised by user code.
    pub fn external(source: impl Into<anyhow::Error>) -> Self {
        Error::new(ErrorKind::External, "").with_source(source)
    }
}

/// Result type for grid.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<Error>();
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct DeniedError(String);

    impl std::fmt::Display for DeniedError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "denied: {}", self.0)
        }
    }

    impl std::error::Error for DeniedError {}

    #[test]
    fn test_error_display() {
        let err = Error::new(ErrorKind::LockConflict, "key is locked by another transaction")
            .with_context("key", 42)
            .with_context("owner", "node-1:7");
        assert_eq!(
            "Lock conflict, context: { key: 42, owner: node-1:7 } => key is locked by another transaction",
            err.to_string()
        );

        let err = Error::external(DeniedError("quota".to_string()));
        assert_eq!("External error, source: denied: quota", err.to_string());
    }

    #[test]
    fn test_error_downcast() {
        let inner = DeniedError("visitor refused".to_string());
        let err = Error::external(inner.clone());
        assert_eq!(err.downcast_ref::<DeniedError>(), Some(&inner));
        assert!(err.downcast_ref::<std::io::Error>().is_none());
    }

    #[test]
    fn test_truncated_context() {
        let err = Error::truncated("entry length", 2, 1);
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(
            err.context(),
            &[
                ("reading", "entry length".to_string()),
                ("required", "2".to_string()),
                ("remaining", "1".to_string())
            ]
        );
    }
}
