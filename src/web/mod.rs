//! Web visualization module for repo-hotspots
//!
//! Serves an interactive complexity-versus-changes scatter of the
//! hotspot table. Rendering happens in the browser; this module only
//! exposes the table as JSON and ships the embedded page.

pub mod chart;
pub mod routes;
pub mod server;

pub use chart::ScatterData;
pub use server::{ServerConfig, start_server};
