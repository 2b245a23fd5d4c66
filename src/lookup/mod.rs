//! External metadata lookup collaborator.

mod client;
mod models;

pub use client::{HttpLookupClient, LookupError, LookupService};
pub use models::SongDetails;
