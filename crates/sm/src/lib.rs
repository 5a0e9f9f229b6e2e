//! Lifecycle coordinator for a resource that moves through
//! Created -> Opening -> Opened -> Closing, with barrier operations
//! that must drain every in-flight non-barrier operation before
//! running exclusively.
//!
//! [`Sm`] is a single independent value — there is no global/static
//! instance, and no two `Sm`s share state. Every `*_begin` operation
//! returns an [`SmResult`] (`Granted` or `Refused`); there are no
//! fatal errors at this layer. `close_begin` and `barrier_begin` are
//! the only operations that may block, and only while draining.

mod phase;
mod result;
mod sm;

pub use phase::Phase;
pub use result::SmResult;
pub use sm::Sm;
