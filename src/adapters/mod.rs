//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, file I/O). Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Betfair Exchange REST API client and certificate login
//! - `data`: CSV probability and selection lookup datasets
//! - `persistence`: Object-store JSON records of placed bets

pub mod api;
pub mod data;
pub mod persistence;
