pub mod heartbeat;
pub mod output;
pub mod session;
pub mod transport;
