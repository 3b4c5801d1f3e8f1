//! Database tools: the gateway and the static catalog that exposes it.

pub mod ddl;
pub mod gateway;
pub mod registry;
