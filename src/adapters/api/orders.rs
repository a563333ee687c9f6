//! Order Adapter - Placement, Order Reports and Account Funds
//!
//! Places single LIMIT orders with `LAPSE` persistence and pages
//! through the current and cleared order reports.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::client::BetfairClient;
use super::types::{
    AccountFundsResponse, ClearedOrderSummary, ClearedOrderSummaryReport, CurrentOrderSummary,
    CurrentOrderSummaryReport, LimitOrder, PlaceExecutionReport, PlaceInstruction,
    PlaceOrdersRequest,
};
use crate::domain::bet::{BetOrder, ClearedOrder, OpenOrder, PlacementReport, Side};
use crate::domain::staking::round_cents;
use crate::ports::ExchangeError;

/// Records requested per report page (API maximum).
const RECORD_PAGE: usize = 1000;

impl BetfairClient {
    /// Every open order on the account, across all pages.
    pub async fn current_orders(&self) -> Result<Vec<OpenOrder>, ExchangeError> {
        let mut orders = Vec::new();
        let mut from_record = 0;
        loop {
            let body = json!({
                "fromRecord": from_record,
                "recordCount": RECORD_PAGE,
            });
            let page: CurrentOrderSummaryReport =
                self.betting("listCurrentOrders", &body).await?;

            let received = page.current_orders.len();
            from_record += received;
            orders.extend(page.current_orders.into_iter().filter_map(to_open_order));
            if !page.more_available || received == 0 {
                break;
            }
        }

        debug!(count = orders.len(), "Current orders fetched");
        Ok(orders)
    }

    /// Every settled order on the account, across all pages.
    pub async fn cleared_orders(&self) -> Result<Vec<ClearedOrder>, ExchangeError> {
        let mut orders = Vec::new();
        let mut from_record = 0;
        loop {
            let body = json!({
                "betStatus": "SETTLED",
                "fromRecord": from_record,
                "recordCount": RECORD_PAGE,
            });
            let page: ClearedOrderSummaryReport =
                self.betting("listClearedOrders", &body).await?;

            let received = page.cleared_orders.len();
            from_record += received;
            orders.extend(page.cleared_orders.into_iter().filter_map(to_cleared_order));
            if !page.more_available || received == 0 {
                break;
            }
        }

        debug!(count = orders.len(), "Cleared orders fetched");
        Ok(orders)
    }

    /// Place a single limit order.
    ///
    /// # Errors
    /// `ExchangeError::OrderRejected` when the venue reports `FAILURE`.
    #[instrument(skip(self), fields(market_id = %order.market_id, selection_id = order.selection_id))]
    pub async fn place_limit_order(
        &self,
        order: &BetOrder,
    ) -> Result<PlacementReport, ExchangeError> {
        let request = place_request(order);
        let body = serde_json::to_value(&request).map_err(|e| ExchangeError::Malformed {
            operation: "placeOrders".to_string(),
            reason: format!("unserializable request: {e}"),
        })?;

        let report: PlaceExecutionReport = self.betting("placeOrders", &body).await?;
        let placement = placement_from_report(report)?;

        info!(
            bet_id = %placement.bet_id,
            side = %order.side,
            price = order.price,
            size = request.instructions[0].limit_order.size,
            status = %placement.status,
            "Order placed"
        );
        Ok(placement)
    }

    /// Balance currently available to bet.
    pub async fn account_funds(&self) -> Result<f64, ExchangeError> {
        let funds: AccountFundsResponse = self.account("getAccountFunds", &json!({})).await?;
        debug!(
            available = funds.available_to_bet_balance,
            exposure = ?funds.exposure,
            "Account funds fetched"
        );
        Ok(funds.available_to_bet_balance)
    }
}

/// Build the `placeOrders` request; size is rounded to cents.
pub(crate) fn place_request(order: &BetOrder) -> PlaceOrdersRequest {
    PlaceOrdersRequest {
        market_id: order.market_id.clone(),
        instructions: vec![PlaceInstruction {
            order_type: "LIMIT".to_string(),
            selection_id: order.selection_id,
            side: order.side.as_venue_str().to_string(),
            limit_order: LimitOrder {
                size: round_cents(order.stake),
                price: order.price,
                persistence_type: "LAPSE".to_string(),
            },
        }],
    }
}

/// Interpret a `placeOrders` response.
///
/// `FAILURE` maps to `OrderRejected` with the top-level error code,
/// falling back to the first instruction's code.
pub(crate) fn placement_from_report(
    report: PlaceExecutionReport,
) -> Result<PlacementReport, ExchangeError> {
    let PlaceExecutionReport {
        status,
        error_code,
        instruction_reports,
        ..
    } = report;
    let instruction = instruction_reports.into_iter().next();

    if status == "FAILURE" {
        let code = error_code
            .or_else(|| instruction.and_then(|i| i.error_code))
            .unwrap_or_else(|| "UNKNOWN".to_string());
        warn!(%code, "Order rejected");
        return Err(ExchangeError::OrderRejected { code });
    }

    let Some(instruction) = instruction else {
        return Err(ExchangeError::Malformed {
            operation: "placeOrders".to_string(),
            reason: format!("status {status} without instruction report"),
        });
    };
    let Some(bet_id) = instruction.bet_id else {
        return Err(ExchangeError::Malformed {
            operation: "placeOrders".to_string(),
            reason: format!("instruction status {} without bet id", instruction.status),
        });
    };

    Ok(PlacementReport {
        bet_id,
        placed_date: instruction.placed_date.unwrap_or_else(Utc::now),
        average_price_matched: instruction.average_price_matched,
        size_matched: instruction.size_matched,
        status,
    })
}

fn parse_side(raw: &str, bet_id: &str) -> Option<Side> {
    match raw.parse::<Side>() {
        Ok(side) => Some(side),
        Err(e) => {
            warn!(bet_id, error = %e, "Order with unknown side, skipping");
            None
        }
    }
}

fn to_open_order(summary: CurrentOrderSummary) -> Option<OpenOrder> {
    let side = parse_side(&summary.side, &summary.bet_id)?;
    Some(OpenOrder {
        side,
        price: summary.price_size.price,
        size: summary.price_size.size,
        size_matched: summary.size_matched.unwrap_or(0.0),
        size_remaining: summary.size_remaining.unwrap_or(0.0),
        status: summary.status.unwrap_or_default(),
        placed_date: summary.placed_date,
        bet_id: summary.bet_id,
        market_id: summary.market_id,
        selection_id: summary.selection_id,
    })
}

fn to_cleared_order(summary: ClearedOrderSummary) -> Option<ClearedOrder> {
    let (Some(bet_id), Some(market_id), Some(selection_id), Some(side)) = (
        summary.bet_id,
        summary.market_id,
        summary.selection_id,
        summary.side,
    ) else {
        debug!("Rolled-up cleared order without identifiers, skipping");
        return None;
    };
    let side = parse_side(&side, &bet_id)?;

    Some(ClearedOrder {
        bet_id,
        market_id,
        selection_id,
        side,
        bet_outcome: summary.bet_outcome.unwrap_or_default(),
        price_matched: summary.price_matched.unwrap_or(0.0),
        size_settled: summary.size_settled.unwrap_or(0.0),
        profit: summary.profit.unwrap_or(0.0),
        commission: summary.commission.unwrap_or(0.0),
        settled_date: summary.settled_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> PlaceExecutionReport {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_place_request_rounds_size_and_uses_lapse() {
        let order = BetOrder {
            market_id: "1.5".to_string(),
            selection_id: 42,
            side: Side::Lay,
            stake: 16.666_666,
            price: 4.0,
        };
        let request = place_request(&order);
        let instruction = &request.instructions[0];

        assert_eq!(instruction.order_type, "LIMIT");
        assert_eq!(instruction.side, "LAY");
        assert!((instruction.limit_order.size - 16.67).abs() < 1e-9);
        assert_eq!(instruction.limit_order.persistence_type, "LAPSE");
    }

    #[test]
    fn test_placement_success() {
        let placement = placement_from_report(report(
            r#"{"status": "SUCCESS", "marketId": "1.5", "instructionReports": [{
                "status": "SUCCESS", "betId": "31242604945",
                "placedDate": "2024-05-01T10:00:00.000Z",
                "averagePriceMatched": 0.0, "sizeMatched": 0.0
            }]}"#,
        ))
        .unwrap();

        assert_eq!(placement.bet_id, "31242604945");
        assert_eq!(placement.status, "SUCCESS");
        assert_eq!(placement.placed_date.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_placement_failure_uses_top_level_code() {
        let err = placement_from_report(report(
            r#"{"status": "FAILURE", "errorCode": "INSUFFICIENT_FUNDS",
                "instructionReports": [{"status": "FAILURE", "errorCode": "ERROR_IN_ORDER"}]}"#,
        ))
        .unwrap_err();

        match err {
            ExchangeError::OrderRejected { code } => assert_eq!(code, "INSUFFICIENT_FUNDS"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_placement_failure_falls_back_to_instruction_code() {
        let err = placement_from_report(report(
            r#"{"status": "FAILURE",
                "instructionReports": [{"status": "FAILURE", "errorCode": "INVALID_BET_SIZE"}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ExchangeError::OrderRejected { code } if code == "INVALID_BET_SIZE"));
    }

    #[test]
    fn test_placement_without_bet_id_is_malformed() {
        let err = placement_from_report(report(
            r#"{"status": "SUCCESS", "instructionReports": [{"status": "SUCCESS"}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ExchangeError::Malformed { .. }));
    }

    #[test]
    fn test_open_order_conversion() {
        let summary: CurrentOrderSummary = serde_json::from_str(
            r#"{"betId": "1", "marketId": "1.5", "selectionId": 42, "side": "BACK",
                "priceSize": {"price": 2.5, "size": 10.0}, "status": "EXECUTABLE",
                "sizeMatched": 4.0, "sizeRemaining": 6.0}"#,
        )
        .unwrap();
        let order = to_open_order(summary).unwrap();
        assert_eq!(order.side, Side::Back);
        assert!((order.size_remaining - 6.0).abs() < f64::EPSILON);
        assert_eq!(order.status, "EXECUTABLE");
    }

    #[test]
    fn test_cleared_order_without_ids_is_skipped() {
        let summary: ClearedOrderSummary =
            serde_json::from_str(r#"{"profit": 12.5, "commission": 0.6}"#).unwrap();
        assert!(to_cleared_order(summary).is_none());

        let summary: ClearedOrderSummary = serde_json::from_str(
            r#"{"betId": "9", "marketId": "1.5", "selectionId": 42, "side": "LAY",
                "betOutcome": "WON", "priceMatched": 3.0, "sizeSettled": 10.0,
                "profit": 9.5, "commission": 0.5}"#,
        )
        .unwrap();
        let order = to_cleared_order(summary).unwrap();
        assert_eq!(order.side, Side::Lay);
        assert_eq!(order.bet_outcome, "WON");
    }
}
