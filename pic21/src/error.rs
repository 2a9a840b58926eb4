//!
//! # Layout Result and Error Types
//!

// Local Imports
use crate::geom::Point;
pub use crate::utils::{self, ErrorContext};

/// # [LayoutError] Result Type
pub type LayoutResult<T> = Result<T, LayoutError>;

///
/// # Layout Error Enumeration
///
/// Every failing operation leaves its target unchanged,
/// and reports through one of these variants.
///
pub enum LayoutError {
    /// Mutation attempted on a locked (finalized) component
    LockedComponent { component: String },
    /// Port-name collision within a component
    DuplicatePort { component: String, port: String },
    /// Reference graph would contain, or does contain, a cycle.
    /// `path` lists component names around the cycle, starting and ending at the same component.
    CyclicReference { path: Vec<String> },
    /// More than two coincident, compatible ports
    AmbiguousConnection { location: Point, ports: Vec<String> },
    /// Connection between ports of incompatible types
    TypeMismatch { a: String, b: String },
    /// Name collision, e.g. among components in a library or references in a component
    DuplicateName(String),
    /// Lookup of a component, reference, port, or layer which does not exist
    NotFound(String),
    /// Invalid input data
    Validation(String),
    /// Error Exporting to Foreign Format
    Export {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Error Importing from Foreign Format
    Import {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
    /// # [Ptr](crate::utils::Ptr) Locking
    /// Caused by a panic while holding a shared lock.
    /// Generally caused by a [std::sync::PoisonError], which is not forwardable due to lifetime constraints.
    PtrLock,
}
impl LayoutError {
    /// Create a [LayoutError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [LayoutError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create a [LayoutError::Validation] from anything String-convertible
    pub fn validation(s: impl Into<String>) -> Self {
        Self::Validation(s.into())
    }
    /// Create a [LayoutError::NotFound] from anything String-convertible
    pub fn not_found(s: impl Into<String>) -> Self {
        Self::NotFound(s.into())
    }
}
impl std::fmt::Debug for LayoutError {
    /// Display a [LayoutError]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LayoutError::LockedComponent { component } => {
                write!(f, "Locked Component: cannot modify `{}`", component)
            }
            LayoutError::DuplicatePort { component, port } => {
                write!(f, "Duplicate Port `{}` on Component `{}`", port, component)
            }
            LayoutError::CyclicReference { path } => {
                write!(f, "Cyclic Reference: {}", path.join(" -> "))
            }
            LayoutError::AmbiguousConnection { location, ports } => write!(
                f,
                "Ambiguous Connection at ({}, {}) between ports {:?}",
                location.x, location.y, ports
            ),
            LayoutError::TypeMismatch { a, b } => {
                write!(f, "Port Type Mismatch: `{}` and `{}`", a, b)
            }
            LayoutError::DuplicateName(name) => write!(f, "Duplicate Name `{}`", name),
            LayoutError::NotFound(what) => write!(f, "Not Found: {}", what),
            LayoutError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            LayoutError::Export { message, stack } => {
                write!(f, "Export Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Import { message, stack } => {
                write!(f, "Import Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Boxed(err) => write!(f, "{}", err),
            LayoutError::Str(err) => write!(f, "{}", err),
            LayoutError::PtrLock => write!(f, "[std::sync::PoisonError]"),
        }
    }
}
impl std::fmt::Display for LayoutError {
    /// Display a [LayoutError]
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<String> for LayoutError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for LayoutError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<utils::ser::Error> for LayoutError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<std::io::Error> for LayoutError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl<T> From<std::sync::PoisonError<T>> for LayoutError {
    fn from(_e: std::sync::PoisonError<T>) -> Self {
        Self::PtrLock
    }
}
impl<T: std::error::Error + Send + Sync + 'static> From<Box<T>> for LayoutError {
    fn from(e: Box<T>) -> Self {
        Self::Boxed(e)
    }
}
