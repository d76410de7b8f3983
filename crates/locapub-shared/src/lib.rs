//! Types shared by every Locapub crate: entity models, wire requests,
//! error types and fixed constants.

pub mod constants;
pub mod content;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::{Field, GatewayError, ValidationError};
pub use types::{Campaign, CampaignId, Channel, Owner, Session, Support, SupportId, SupportKind};
