//! Recipe search backend library.
//!
//! Hexagonal layout: `domain` holds the entities, services, and ports;
//! `inbound::http` maps HTTP onto the domain; `outbound` implements the
//! ports against PostgreSQL and the upstream recipe API; `server` wires the
//! pieces together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
