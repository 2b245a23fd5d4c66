//! Common test infrastructure
//!
//! Spawns an isolated server instance for end-to-end tests: its own
//! temporary database plus a stub lookup service on an ephemeral port.
//! Tests should only import from this module, not from internal submodules.

mod lookup_stub;
mod server;

// Public API - this is what tests import
pub use lookup_stub::StubLookupService;
pub use server::TestServer;
