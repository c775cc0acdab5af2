//! # TeamBoard API Server Library
//!
//! HTTP surface of TeamBoard: a multi-tenant kanban backend where users own
//! workspaces, workspaces hold projects, and projects hold a fixed
//! four-column board of tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body extractor with API-shaped rejections
//! - `middleware`: Bearer authentication and security headers
//! - `routes`: API route handlers
//! - `server`: Store selection and the serve loop

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
