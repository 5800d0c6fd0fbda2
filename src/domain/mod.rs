//! Domain model: entities, projections, and read-time aggregation.

pub mod aggregate;
pub mod comment;
pub mod offer;
pub mod user;
