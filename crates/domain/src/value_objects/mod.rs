//! Value objects for wallet state.

mod address;
mod balance;
mod network;

pub use address::*;
pub use balance::*;
pub use network::*;
