use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Earning, LedgerBalance};

/// Default page size for `GET /api/token/transactions`.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
/// Largest page size a client may request.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// An earning as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: Option<String>,
    pub user_id: String,
    pub amount: f64,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Earning> for TransactionView {
    fn from(e: Earning) -> Self {
        Self {
            id: e.id.map(|id| id.to_hex()),
            user_id: e.user_id.to_hex(),
            amount: e.amount,
            reason: e.reason,
            timestamp: e.timestamp.to_chrono(),
        }
    }
}

/// Response body of `GET /api/token/balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub user_id: String,
    pub balance: f64,
    pub transaction_count: u64,
}

impl BalanceView {
    pub fn new(user_id: String, balance: LedgerBalance) -> Self {
        Self {
            user_id,
            balance: balance.balance,
            transaction_count: balance.transactions,
        }
    }
}

/// Request body of `POST /api/token/earn`.
#[derive(Debug, Clone, Deserialize)]
pub struct EarnRequest {
    pub amount: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response body of `POST /api/token/earn`: the recorded transaction and the
/// balance after it, so clients can replace any optimistic value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnResponse {
    pub transaction: TransactionView,
    pub balance: BalanceView,
}

/// Query string of `GET /api/token/transactions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// The requested page size clamped to `1..=MAX_HISTORY_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// Response body of `GET /api/token/transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub transactions: Vec<TransactionView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_effective_limit() {
        assert_eq!(HistoryQuery::default().effective_limit(), 20);
        assert_eq!(HistoryQuery { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(HistoryQuery { limit: Some(5) }.effective_limit(), 5);
        assert_eq!(HistoryQuery { limit: Some(10_000) }.effective_limit(), 100);
    }

    #[test]
    fn test_transaction_view_uses_hex_ids() {
        let user = ObjectId::new();
        let id = ObjectId::new();
        let view = TransactionView::from(Earning {
            id: Some(id),
            user_id: user,
            amount: 12.5,
            reason: None,
            timestamp: mongodb::bson::DateTime::from_millis(0),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], id.to_hex());
        assert_eq!(json["userId"], user.to_hex());
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_earn_request_reason_optional() {
        let req: EarnRequest = serde_json::from_str(r#"{"amount": 3}"#).unwrap();
        assert_eq!(req.amount, 3.0);
        assert!(req.reason.is_none());
    }
}
