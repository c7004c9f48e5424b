// Library exports for quill
// This allows integration tests and external code to use quill modules

pub mod auth;
pub mod blog;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
