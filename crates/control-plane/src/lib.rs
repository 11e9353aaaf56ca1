//! Control-plane integration layer: clients for the ACS (agent
//! configuration service) and the Banker (spend ledger).

pub mod clients;

pub use clients::{AcsClient, BalanceSink, BankerClient, ConfigStore};
