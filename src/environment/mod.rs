//! Host environment constants.
//!
//! Resolves the kernel's clock tick rate and page size once, together with the
//! privilege level of the running process.
mod error;
mod host;

pub use error::{Error, Result};
pub use host::{FALLBACK_CLOCK_TICKS, FALLBACK_PAGE_SIZE, HostEnvironment};
