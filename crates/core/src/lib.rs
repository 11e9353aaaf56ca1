pub mod config;
pub mod error;
pub mod openrtb;
pub mod types;

pub use config::AppConfig;
pub use error::{BidError, BidResult};
