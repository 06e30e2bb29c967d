//! Spending statistics over a trailing window.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error, UserId,
    profile::resolve_timezone,
    timezone::local_date,
    transaction::{TransactionKind, db::list_transactions},
    user_id::TimezoneHeader,
};

/// The query parameters of the stats summary endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    /// The trailing window to summarize, `7d` or `30d`. Defaults to `30d`.
    pub range: Option<String>,
}

fn window_days(range: &str) -> Result<i64, Error> {
    match range {
        "7d" => Ok(7),
        "30d" => Ok(30),
        other => Err(Error::InvalidRange(other.to_owned())),
    }
}

/// Summarize the caller's spending over the trailing window: absolute expense
/// totals per category, the overall total, the transaction count, and the
/// category with the highest spend.
pub async fn get_stats_summary_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    TimezoneHeader(header_timezone): TimezoneHeader,
    Query(params): Query<SummaryParams>,
) -> Result<Response, Error> {
    let range = params.range.as_deref().unwrap_or("30d");
    let days = window_days(range)?;

    let connection = state.connection()?;
    let timezone = resolve_timezone(
        &user_id,
        header_timezone.as_deref(),
        &state.fallback_timezone,
        &connection,
    )?;
    let today = local_date(&timezone, OffsetDateTime::now_utc())?;
    let from = today
        .checked_sub(Duration::days(days - 1))
        .ok_or_else(|| Error::InvalidDate(format!("{days} days before {today}")))?;

    let transactions = list_transactions(&user_id, Some(from), Some(today), &connection)?;

    let mut by_category: HashMap<String, f64> = HashMap::new();
    let mut total_spend = 0.0;
    for transaction in &transactions {
        if transaction.kind == TransactionKind::Expense {
            let amount = transaction.amount.abs();
            *by_category.entry(transaction.category.clone()).or_insert(0.0) += amount;
            total_spend += amount;
        }
    }

    let top_category = by_category
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(category, _)| category.clone());

    Ok(Json(json!({
        "range": range,
        "from": from,
        "to": today,
        "transaction_count": transactions.len(),
        "total_spend": total_spend,
        "by_category": by_category,
        "top_category": top_category,
    }))
    .into_response())
}

#[cfg(test)]
mod stats_tests {
    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        routing::get,
    };
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState, UserId, endpoints,
        timezone::local_date,
        transaction::{NewTransaction, TransactionKind, db::insert_transaction},
    };

    use super::get_stats_summary_endpoint;

    fn test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::STATS_SUMMARY, get(get_stats_summary_endpoint))
            .with_state(state);

        TestServer::new(app)
    }

    fn user_header() -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_static("user-1"),
        )
    }

    #[tokio::test]
    async fn summary_totals_expenses_and_names_top_category() {
        let state = AppState::new_test();
        let user_id = UserId::new("user-1");
        let today = local_date("America/Sao_Paulo", OffsetDateTime::now_utc()).unwrap();
        {
            let connection = state.connection().unwrap();
            for (amount, kind, category) in [
                (30.0, TransactionKind::Expense, "Food"),
                (10.0, TransactionKind::Expense, "Transport"),
                (500.0, TransactionKind::Income, "Wages"),
            ] {
                insert_transaction(
                    &user_id,
                    NewTransaction::new(amount, kind, category, today, None).unwrap(),
                    &connection,
                )
                .unwrap();
            }
            // An old expense outside any window.
            insert_transaction(
                &user_id,
                NewTransaction::new(
                    99.0,
                    TransactionKind::Expense,
                    "Food",
                    today - Duration::days(60),
                    None,
                )
                .unwrap(),
                &connection,
            )
            .unwrap();
        }
        let server = test_server(state);
        let (name, value) = user_header();

        let response = server
            .get(endpoints::STATS_SUMMARY)
            .add_header(name, value)
            .await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["range"], "30d");
        assert_eq!(body["transaction_count"], 3);
        assert_eq!(body["total_spend"], 40.0);
        assert_eq!(body["by_category"]["Food"], 30.0);
        assert_eq!(body["top_category"], "Food");
    }

    #[tokio::test]
    async fn unknown_range_is_rejected() {
        let server = test_server(AppState::new_test());
        let (name, value) = user_header();

        let response = server
            .get(endpoints::STATS_SUMMARY)
            .add_query_param("range", "90d")
            .add_header(name, value)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
