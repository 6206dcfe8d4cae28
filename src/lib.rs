//! Core of the intradash intranet dashboard.
//!
//! The server binary exposes these modules over REST; the CLI drives a
//! [`auth::SessionStore`] against the server through [`client::ApiClient`].

pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod directory;
pub mod feed;
pub mod models;
pub mod notifications;
pub mod server;
