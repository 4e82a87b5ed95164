//! Nexus Gateway - School-Shopping Intelligence
//!
//! The domain facade over the generative model: grounded deal scans, price
//! comparison, school placement advice, marketplace helpers and the cached
//! trending feed. Also hosts the best-effort public lookups.
//!
//! Every operation degrades to a value. Callers never see an error.

pub mod gateway;
pub mod lookups;
pub mod prompts;
pub mod pulse;

pub use gateway::IntelligenceGateway;
pub use lookups::{
    budget_qr_url, retailer_logo, LookupEndpoints, PostcodeInfo, PostcodePlace, PublicLookups,
    TrendQuote,
};
pub use pulse::PulseDeal;
