//!
//! # pic21 Error-Helper Utilities
//!
//! ```rust
//! use pic21utils::error::{ErrorHelper, Unwrapper};
//! use pic21utils::ErrorContext;
//!
//! /// Example tree-walker, tracking where it is in a hierarchy.
//! struct Walker {
//!     ctx: Vec<ErrorContext>,
//! }
//! impl ErrorHelper for Walker {
//!     type Error = String;
//!
//!     /// Report our context stack alongside the message.
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("{} (while in {:?})", msg.into(), self.ctx)
//!     }
//! }
//! impl Walker {
//!     fn walk(&self, widths: &[f64]) -> Result<f64, String> {
//!         let first = widths.first().unwrapper(self, "No widths")?;
//!         self.assert(*first > 0.0, "Width must be positive")?;
//!         Ok(*first)
//!     }
//! }
//! let w = Walker { ctx: vec![ErrorContext::Component("mmi".into())] };
//! assert_eq!(w.walk(&[0.5]), Ok(0.5));
//! assert!(w.walk(&[]).unwrap_err().contains("mmi"));
//! ```
//!

///
/// # ErrorHelper
///
/// Helper trait for the library's many tree-walkers: importers, exporters, resolvers.
/// Each implementer generally has internal state to report upon failure,
/// such as a stack of [crate::ErrorContext]s, which it injects in the required `err` method.
/// All other methods are provided, and route through `err`.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Unwrap the [Result] `res`, replacing any failure with our own error.
    fn ok<T, E>(&self, res: Result<T, E>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match res {
            Ok(val) => Ok(val),
            Err(_) => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix application of [`ErrorHelper`] handling to [`Option`]s and [`Result`]s.
/// Not generally implemented by new types; import it and call `unwrapper` on the standard-library types.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self, msg)
    }
}

impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.ok(self, msg)
    }
}
