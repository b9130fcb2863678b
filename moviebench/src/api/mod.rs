//! HTTP surface: request handlers for the movie catalog and health checks.

pub mod handlers;
