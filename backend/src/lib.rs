//! Backend library for the inkwell blogging platform.
//!
//! Layout follows the hexagonal shape: `domain` holds the aggregates, ports,
//! and services; `inbound` adapts HTTP onto the driving ports; `outbound`
//! implements the driven ports (stores, image host, password hashing).

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
/// Request-trace middleware re-exported for server wiring.
pub use middleware::RequestTrace;
