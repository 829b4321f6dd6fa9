//! Plain data: the wire shape of an order, its normalized form, and the
//! views derived from it.

pub mod address;
pub mod filter;
pub mod order;
pub mod raw;
pub mod status;

pub use address::*;
pub use filter::*;
pub use order::*;
pub use raw::*;
pub use status::*;
