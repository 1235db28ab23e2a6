//! FundMe Utilities.
//!
//! Miscellaneous utilities shared by the FundMe crates and binaries.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unreadable_literal)]
#![warn(missing_docs)]

mod logger;
mod network;
mod time;
mod units;

pub use logger::*;
pub use network::*;
pub use time::*;
pub use units::*;
