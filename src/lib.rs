//! lodgely - a rental offers HTTP backend
//!
//! Controllers register routes with ordered middleware; handlers raise
//! typed errors that an exception filter chain turns into one uniform
//! error body; read models aggregate comment-derived fields on every
//! request.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod controllers;
pub mod domain;
pub mod pipeline;
pub mod services;
pub mod store;
pub mod upload;
