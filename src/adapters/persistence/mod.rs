//! Persistence Adapters - Object-store Bet Records
//!
//! Implements the `BetStore` port with one JSON object per placed bet,
//! in S3 or a local bucket directory. No database dependency.

pub mod bets;

pub use bets::BetObjectStore;
