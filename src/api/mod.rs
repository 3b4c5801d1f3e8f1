//! Protocol surface: dialect normalization and the dispatcher.

pub mod dialect;
pub mod dispatch;
