//! JSON-RPC Interface and Implementation

mod api;
mod methods;

// re-export the defined API
pub use api::*;
pub use methods::*;
