//! Mt. Fuji finder
//!
//! Exports a snapshot from a Soracom Cloud Camera, asks a vision model whether
//! Mt. Fuji is visible in it, and posts the photo with a greeting to Slack.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
