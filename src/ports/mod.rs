//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `Exchange`: Session-backed betting exchange access
//! - `BetStore`: Placed-bet persistence (object storage)

pub mod exchange;
pub mod repository;

pub use exchange::{Exchange, ExchangeError, MarketQuery};
pub use repository::BetStore;
