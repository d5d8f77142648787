//! Configuration-driven forwarding of dashboard calls to the upstream API.

pub mod headers;
pub mod relay;
pub mod route;
pub mod target;

pub use relay::{Inbound, forward};
pub use route::RouteSpec;
