//! HTTP surface of the bidder: the OpenRTB bid endpoint plus the win and
//! event notification listeners.

pub mod rest;
pub mod server;

pub use server::ApiServer;
