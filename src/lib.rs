//! Workboard: task lifecycle and approval workflow rules.
//!
//! This crate decides which status a task may move to, whether an approval
//! task is resolved, and whether single or bulk task operations are
//! permitted, and applies validated changes through one owned task
//! repository while keeping an append-only audit trail.
//!
//! # Architecture
//!
//! Workboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure workflow rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and settings
//! - **Adapters**: Concrete implementations of ports (in-memory, JSON file)
//!
//! # Modules
//!
//! - [`task`]: Status catalog, permissions, transitions, approvals and the
//!   workflow executor

pub mod task;
