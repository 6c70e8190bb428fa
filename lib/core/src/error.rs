//! Shared result alias.
//!
//! Each crate owns its error enums. Seams between crates carry them in a
//! rootcause `Report`, spelled `solace_core::Result<T, MyError>`.

use rootcause::Report;

/// Result carrying a rootcause report of context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
