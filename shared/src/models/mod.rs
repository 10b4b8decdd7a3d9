//! Domain models shared between server and clients.

mod dining_table;
mod order;
mod product;
mod staff;

pub use dining_table::*;
pub use order::*;
pub use product::*;
pub use staff::*;
