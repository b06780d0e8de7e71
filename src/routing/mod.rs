//! Request routing model
//!
//! Routes are constructed independently of any connection and passed with
//! each command to the execution layer, which dispatches to one node or fans
//! out based on [`Route::is_multi_node`].

pub mod route;
pub mod slot;

pub use route::{ByAddressRoute, Route, SimpleRoute, SlotIdRoute, SlotKeyRoute, SlotType};
pub use slot::{slot_for_key, SLOT_COUNT};
