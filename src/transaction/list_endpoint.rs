//! The transaction listing endpoint.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{AppState, Error, UserId, transaction::db::list_transactions};

/// Optional date bounds for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Only include transactions on or after this date.
    pub from: Option<Date>,
    /// Only include transactions on or before this date.
    pub to: Option<Date>,
}

/// Return the caller's transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Query(params): Query<ListParams>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let transactions = list_transactions(&user_id, params.from, params.to, &connection)?;

    Ok(Json(json!({ "transactions": transactions })).into_response())
}

#[cfg(test)]
mod list_transactions_endpoint_tests {
    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        routing::get,
    };
    use axum_test::TestServer;
    use time::macros::date;

    use crate::{
        AppState, UserId, endpoints,
        transaction::{NewTransaction, TransactionKind, db::insert_transaction},
    };

    use super::list_transactions_endpoint;

    #[tokio::test]
    async fn filters_by_date_range() {
        let state = AppState::new_test();
        let user_id = UserId::new("user-1");

        {
            let connection = state.connection().unwrap();
            for (amount, day) in [(1.0, 1), (2.0, 15), (3.0, 31)] {
                insert_transaction(
                    &user_id,
                    NewTransaction::new(
                        amount,
                        TransactionKind::Expense,
                        "Food",
                        date!(2026 - 08 - 01).replace_day(day).unwrap(),
                        None,
                    )
                    .unwrap(),
                    &connection,
                )
                .unwrap();
            }
        }

        let app = Router::new()
            .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
            .with_state(state);
        let server = TestServer::new(app);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("from", "2026-08-10")
            .add_query_param("to", "2026-08-20")
            .add_header(
                HeaderName::from_static("x-user-id"),
                HeaderValue::from_static("user-1"),
            )
            .await;

        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["amount"], 2.0);
    }
}
