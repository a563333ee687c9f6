//! Exchange port implementation for the Betfair client.

use async_trait::async_trait;

use super::client::BetfairClient;
use crate::domain::bet::{BetOrder, ClearedOrder, OpenOrder, PlacementReport};
use crate::domain::market::{BookEntry, Market};
use crate::ports::{Exchange, ExchangeError, MarketQuery};

#[async_trait]
impl Exchange for BetfairClient {
    async fn list_open_bets(&self) -> Result<Vec<OpenOrder>, ExchangeError> {
        self.current_orders().await
    }

    async fn list_settled_bets(&self) -> Result<Vec<ClearedOrder>, ExchangeError> {
        self.cleared_orders().await
    }

    async fn list_market_catalogue(
        &self,
        query: &MarketQuery,
    ) -> Result<Vec<Market>, ExchangeError> {
        self.market_catalogue(query).await
    }

    async fn list_book(&self, market: &Market) -> Result<Vec<BookEntry>, ExchangeError> {
        self.market_book(market).await
    }

    async fn place_bet(&self, order: &BetOrder) -> Result<PlacementReport, ExchangeError> {
        self.place_limit_order(order).await
    }

    async fn available_balance(&self) -> Result<f64, ExchangeError> {
        self.account_funds().await
    }
}
