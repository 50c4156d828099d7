use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::db::ledger_repository::LedgerRepository;
use crate::db::models::Earning;
use crate::error::AppError;
use crate::models::wallet::{
    BalanceView, EarnRequest, EarnResponse, HistoryQuery, HistoryResponse, TransactionView,
};

/// The wallet owner named by the token. Only real accounts (ObjectId hex) own wallets.
fn wallet_owner(user: &AuthenticatedUser) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(&user.user_id)
        .map_err(|_| AppError::BadRequest(format!("Invalid user id '{}'", user.user_id)))
}

/// Core earn logic: validate the amount, append it, and return the fresh balance.
pub async fn process_earn(
    ledger: &dyn LedgerRepository,
    user_id: ObjectId,
    request: EarnRequest,
) -> Result<EarnResponse, AppError> {
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(AppError::BadRequest(
            "Amount must be a positive number".into(),
        ));
    }

    let reason = request
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let earning = ledger
        .append(Earning {
            id: None,
            user_id,
            amount: request.amount,
            reason,
            timestamp: mongodb::bson::DateTime::from_chrono(Utc::now()),
        })
        .await?;

    let balance = ledger.balance(user_id).await?;

    tracing::info!(
        user_id = %user_id,
        amount = earning.amount,
        balance = balance.balance,
        "Recorded earning"
    );

    Ok(EarnResponse {
        transaction: earning.into(),
        balance: BalanceView::new(user_id.to_hex(), balance),
    })
}

/// Axum handler for `GET /api/token/balance`.
pub async fn balance_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<BalanceView>, AppError> {
    let owner = wallet_owner(&user)?;
    let balance = state.ledger_repo.balance(owner).await?;
    Ok(Json(BalanceView::new(owner.to_hex(), balance)))
}

/// Axum handler for `GET /api/token/transactions`.
pub async fn transactions_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let owner = wallet_owner(&user)?;
    let Query(query) = query?;
    let earnings = state
        .ledger_repo
        .history(owner, query.effective_limit())
        .await?;

    Ok(Json(HistoryResponse {
        transactions: earnings.into_iter().map(TransactionView::from).collect(),
    }))
}

/// Axum handler for `POST /api/token/earn`.
pub async fn earn_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    request: Result<Json<EarnRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EarnResponse>), AppError> {
    let owner = wallet_owner(&user)?;
    let Json(request) = request?;
    let response = process_earn(state.ledger_repo.as_ref(), owner, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
