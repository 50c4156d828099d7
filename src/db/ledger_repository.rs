use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};

use crate::db::models::{Earning, LedgerBalance};
use crate::error::AppError;

/// The append-only earnings log behind the token wallet.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Append an earning. Returns it with its assigned id.
    async fn append(&self, earning: Earning) -> Result<Earning, AppError>;

    /// Derive a user's balance by summing their earnings.
    async fn balance(&self, user_id: ObjectId) -> Result<LedgerBalance, AppError>;

    /// A user's most recent earnings, newest first.
    async fn history(&self, user_id: ObjectId, limit: usize) -> Result<Vec<Earning>, AppError>;
}

/// MongoDB implementation of the LedgerRepository.
pub struct MongoLedgerRepository {
    collection: mongodb::Collection<Earning>,
}

impl MongoLedgerRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("earnings"),
        }
    }
}

/// Match a user's earnings whether `userId` was stored as ObjectId or hex string.
fn user_filter(user_id: ObjectId) -> Document {
    doc! { "userId": { "$in": [Bson::ObjectId(user_id), Bson::String(user_id.to_hex())] } }
}

#[async_trait]
impl LedgerRepository for MongoLedgerRepository {
    async fn append(&self, mut earning: Earning) -> Result<Earning, AppError> {
        let result = self.collection.insert_one(&earning).await?;

        earning.id = result.inserted_id.as_object_id();
        Ok(earning)
    }

    async fn balance(&self, user_id: ObjectId) -> Result<LedgerBalance, AppError> {
        let pipeline = vec![
            doc! { "$match": user_filter(user_id) },
            doc! {
                "$group": {
                    "_id": Bson::Null,
                    "balance": { "$sum": "$amount" },
                    "transactions": { "$sum": 1 },
                }
            },
        ];

        let mut cursor = self
            .collection
            .clone_with_type::<Document>()
            .aggregate(pipeline)
            .await?;

        let Some(row) = cursor.try_next().await? else {
            return Ok(LedgerBalance::default());
        };

        let balance = match row.get("balance") {
            Some(Bson::Double(v)) => *v,
            Some(Bson::Int32(v)) => *v as f64,
            Some(Bson::Int64(v)) => *v as f64,
            _ => 0.0,
        };
        let transactions = match row.get("transactions") {
            Some(Bson::Int32(v)) => *v as u64,
            Some(Bson::Int64(v)) => *v as u64,
            _ => 0,
        };

        Ok(LedgerBalance {
            balance,
            transactions,
        })
    }

    async fn history(&self, user_id: ObjectId, limit: usize) -> Result<Vec<Earning>, AppError> {
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "timestamp": -1, "_id": -1 })
            .limit(limit as i64)
            .build();

        let mut cursor = self
            .collection
            .find(user_filter(user_id))
            .with_options(options)
            .await?;

        let mut earnings = Vec::new();
        while let Some(earning) = cursor.try_next().await? {
            earnings.push(earning);
        }

        Ok(earnings)
    }
}
