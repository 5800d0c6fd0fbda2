//! # Controllers
//!
//! One route table per resource. Each constructor wires its service
//! into handlers and declares the middleware order per route.

pub mod comments;
pub mod offers;
pub mod users;

pub use comments::comment_controller;
pub use offers::offer_controller;
pub use users::user_controller;
