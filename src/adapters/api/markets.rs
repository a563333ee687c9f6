//! Market Adapter - Catalogue and Book Queries
//!
//! Fetches market catalogues and best-offer books from the Betfair
//! betting API and flattens them into domain types.

use serde_json::json;
use tracing::{debug, warn};

use super::client::BetfairClient;
use super::types::{MarketBookResponse, MarketCatalogue};
use crate::domain::bet::Side;
use crate::domain::market::{BookEntry, Market, Runner};
use crate::ports::{ExchangeError, MarketQuery};

/// Commission assumed when the catalogue omits `marketBaseRate` (percent).
const DEFAULT_MARKET_BASE_RATE: f64 = 5.0;

const MARKET_PROJECTION: [&str; 5] = [
    "COMPETITION",
    "EVENT",
    "MARKET_DESCRIPTION",
    "MARKET_START_TIME",
    "RUNNER_DESCRIPTION",
];

impl BetfairClient {
    /// List the catalogue for one competition and market type.
    ///
    /// Entries missing a competition, event or start time are dropped.
    pub async fn market_catalogue(
        &self,
        query: &MarketQuery,
    ) -> Result<Vec<Market>, ExchangeError> {
        let body = json!({
            "filter": {
                "competitionIds": [query.competition_id.to_string()],
                "marketTypeCodes": [query.market_type],
            },
            "marketProjection": MARKET_PROJECTION,
            "maxResults": query.max_results,
        });

        let catalogues: Vec<MarketCatalogue> =
            self.betting("listMarketCatalogue", &body).await?;
        let fetched = catalogues.len();
        let markets: Vec<Market> = catalogues.into_iter().filter_map(to_market).collect();

        debug!(
            competition_id = query.competition_id,
            fetched,
            kept = markets.len(),
            "Market catalogue fetched"
        );
        Ok(markets)
    }

    /// Best back and lay offers for one market.
    pub async fn market_book(&self, market: &Market) -> Result<Vec<BookEntry>, ExchangeError> {
        let body = json!({
            "marketIds": [market.market_id],
            "priceProjection": { "priceData": ["EX_BEST_OFFERS"] },
        });

        let books: Vec<MarketBookResponse> = self.betting("listMarketBook", &body).await?;
        let Some(book) = books.iter().find(|b| b.market_id == market.market_id) else {
            debug!(market_id = %market.market_id, "No book returned for market");
            return Ok(Vec::new());
        };

        Ok(flatten_book(market, book))
    }
}

/// Convert a catalogue entry into a domain market.
pub(crate) fn to_market(catalogue: MarketCatalogue) -> Option<Market> {
    let MarketCatalogue {
        market_id,
        market_name,
        market_start_time,
        description,
        total_matched,
        runners,
        competition,
        event,
    } = catalogue;

    let Some(competition) = competition else {
        warn!(%market_id, "Catalogue entry without competition, skipping");
        return None;
    };
    let Ok(competition_id) = competition.id.parse::<u64>() else {
        warn!(%market_id, competition_id = %competition.id, "Non-numeric competition id, skipping");
        return None;
    };
    let Some(event_name) = event.as_ref().and_then(|e| e.name.clone()) else {
        warn!(%market_id, "Catalogue entry without event, skipping");
        return None;
    };
    let Some(market_start_time) = market_start_time
        .or_else(|| description.as_ref().and_then(|d| d.market_time))
        .or_else(|| event.as_ref().and_then(|e| e.open_date))
    else {
        warn!(%market_id, "Catalogue entry without start time, skipping");
        return None;
    };

    let base_rate = description
        .as_ref()
        .and_then(|d| d.market_base_rate)
        .unwrap_or(DEFAULT_MARKET_BASE_RATE);

    Some(Market {
        market_id,
        market_name,
        competition_id,
        competition_name: competition.name,
        event_name,
        market_start_time,
        commission_rate: base_rate / 100.0,
        total_matched: total_matched.unwrap_or(0.0),
        runners: runners
            .into_iter()
            .map(|r| Runner {
                selection_id: r.selection_id,
                runner_name: r.runner_name,
            })
            .collect(),
    })
}

/// Flatten a market book into one entry per runner and side.
///
/// A market that is not `OPEN`, or is in-play, yields nothing. A side
/// is emitted only when it has at least one offer; back entries come
/// before lay entries.
pub(crate) fn flatten_book(market: &Market, book: &MarketBookResponse) -> Vec<BookEntry> {
    if book.status.as_deref() != Some("OPEN") || book.inplay.unwrap_or(false) {
        debug!(
            market_id = %market.market_id,
            status = ?book.status,
            inplay = ?book.inplay,
            "Market not open for pre-play betting"
        );
        return Vec::new();
    }

    let entry = |selection_id, side, price, size| BookEntry {
        market_id: market.market_id.clone(),
        selection_id,
        side,
        price,
        size,
        commission_rate: market.commission_rate,
    };

    let active = || {
        book.runners
            .iter()
            .filter(|r| r.status.as_deref().is_none_or(|s| s == "ACTIVE"))
            .filter_map(|r| r.ex.as_ref().map(|ex| (r.selection_id, ex)))
    };

    let backs = active().filter_map(|(id, ex)| {
        ex.available_to_back
            .first()
            .map(|best| entry(id, Side::Back, best.price, best.size))
    });
    let lays = active().filter_map(|(id, ex)| {
        ex.available_to_lay
            .first()
            .map(|best| entry(id, Side::Lay, best.price, best.size))
    });

    backs.chain(lays).collect()
}
