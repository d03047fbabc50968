//! Task lifecycle and approval workflow management.
//!
//! Status changes, approval decisions, detail edits, bulk operations and
//! deletions are validated by the domain rules before the executor writes
//! them back to the repository. Every status change produces one audit
//! entry. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
