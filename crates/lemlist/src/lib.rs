//! Lemlist implementation of the snapshot source.

pub mod client;
pub mod config;
pub mod models;

pub use client::LemlistClient;
pub use config::LemlistConfig;
