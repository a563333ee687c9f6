//! Betfair Exchange API Adapter
//!
//! Implements the `Exchange` port against the Betfair Exchange JSON
//! REST API. Handles certificate login, market catalogue and book
//! queries, order placement and account reports.
//!
//! Sub-modules:
//! - `auth`: Credentials and non-interactive certificate login
//! - `client`: Session-backed HTTP client
//! - `markets`: Catalogue and best-offer book retrieval
//! - `orders`: Placement, current/cleared orders, account funds
//! - `types`: API request/response type definitions

pub mod auth;
pub mod client;
mod exchange;
pub mod markets;
pub mod orders;
pub mod types;

pub use auth::Credentials;
pub use client::BetfairClient;
