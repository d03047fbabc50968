//! Step definitions for task workflow behaviour scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
