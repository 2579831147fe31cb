//! Domain services used by the HTTP routes and the route gate.
//!
//! ARCHITECTURE
//! ============
//! Service modules own token, session, and credential logic so route
//! handlers and middleware stay focused on HTTP plumbing.

pub mod imagekit;
pub mod session;
pub mod token;
