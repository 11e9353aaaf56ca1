pub mod agent;
pub mod index;
pub mod manager;
pub mod pacer;
pub mod processor;
pub mod registry;

#[cfg(test)]
pub(crate) mod testutil;

pub use agent::Agent;
pub use index::{build_eligibility_index, EligibilityIndex};
pub use manager::AgentManager;
pub use pacer::PacerHandle;
pub use processor::BidProcessor;
pub use registry::AgentRegistry;
