use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};

use crate::error::AppError;
use crate::stats::{CategoryCount, CreatorRanking, Engagement};

/// The collections counted by the admin statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Users,
    Posts,
    Blogs,
    Nfts,
}

impl Entity {
    pub fn collection_name(&self) -> &'static str {
        match self {
            Entity::Users => "users",
            Entity::Posts => "posts",
            Entity::Blogs => "blogs",
            Entity::Nfts => "nfts",
        }
    }
}

/// Read-only queries behind the admin statistics.
///
/// Abstracted as a trait so the aggregation can run against MongoDB, the
/// in-memory store or a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Count documents of `entity`, optionally only those created at or after `since`.
    async fn count(&self, entity: Entity, since: Option<DateTime<Utc>>) -> Result<u64, AppError>;

    /// Count users whose last login is at or after `since`.
    async fn count_active_users(&self, since: DateTime<Utc>) -> Result<u64, AppError>;

    /// Sum earning amounts, optionally only those at or after `since`.
    async fn sum_earnings(&self, since: Option<DateTime<Utc>>) -> Result<f64, AppError>;

    /// Total views and likes across all blogs.
    async fn blog_engagement(&self) -> Result<Engagement, AppError>;

    /// Users with the highest summed earnings since `since`, best first.
    /// Ties are ordered by user id ascending.
    async fn top_creators(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CreatorRanking>, AppError>;

    /// Blog categories with the most blogs, largest first.
    /// Ties are ordered by category name ascending.
    async fn top_categories(&self, limit: usize) -> Result<Vec<CategoryCount>, AppError>;
}

/// MongoDB implementation of the StatsRepository.
pub struct MongoStatsRepository {
    db: mongodb::Database,
}

impl MongoStatsRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self { db: db.clone() }
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection(name)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, AppError> {
        let cursor = self.collection(collection).aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }
}

fn since_filter(field: &str, since: Option<DateTime<Utc>>) -> Document {
    match since {
        Some(since) => doc! { field: { "$gte": mongodb::bson::DateTime::from_chrono(since) } },
        None => doc! {},
    }
}

/// Read a numeric aggregation output regardless of its BSON width.
fn number(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => *v as f64,
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

fn integer(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int32(v)) => *v as i64,
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

fn id_string(value: Option<&Bson>) -> String {
    match value {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn optional_str(doc: &Document, key: &str) -> Option<String> {
    doc.get_str(key).ok().map(String::from)
}

#[async_trait]
impl StatsRepository for MongoStatsRepository {
    async fn count(&self, entity: Entity, since: Option<DateTime<Utc>>) -> Result<u64, AppError> {
        Ok(self
            .collection(entity.collection_name())
            .count_documents(since_filter("createdAt", since))
            .await?)
    }

    async fn count_active_users(&self, since: DateTime<Utc>) -> Result<u64, AppError> {
        Ok(self
            .collection(Entity::Users.collection_name())
            .count_documents(since_filter("lastLogin", Some(since)))
            .await?)
    }

    async fn sum_earnings(&self, since: Option<DateTime<Utc>>) -> Result<f64, AppError> {
        let pipeline = vec![
            doc! { "$match": since_filter("timestamp", since) },
            doc! { "$group": { "_id": Bson::Null, "total": { "$sum": "$amount" } } },
        ];

        let rows = self.aggregate("earnings", pipeline).await?;
        Ok(rows.first().map(|row| number(row, "total")).unwrap_or(0.0))
    }

    async fn blog_engagement(&self) -> Result<Engagement, AppError> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "views": { "$sum": "$views" },
                "likes": { "$sum": { "$size": { "$ifNull": ["$likes", []] } } },
            }
        }];

        let rows = self.aggregate("blogs", pipeline).await?;
        Ok(rows
            .first()
            .map(|row| Engagement {
                views: integer(row, "views"),
                likes: integer(row, "likes").max(0) as u64,
            })
            .unwrap_or_default())
    }

    async fn top_creators(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CreatorRanking>, AppError> {
        let pipeline = vec![
            doc! { "$match": since_filter("timestamp", Some(since)) },
            // Legacy rows hold userId as a hex string; fold them onto the ObjectId.
            doc! {
                "$group": {
                    "_id": {
                        "$convert": {
                            "input": "$userId",
                            "to": "objectId",
                            "onError": "$userId",
                            "onNull": Bson::Null,
                        }
                    },
                    "earnings": { "$sum": "$amount" },
                    "transactions": { "$sum": 1 },
                }
            },
            doc! { "$sort": { "earnings": -1, "_id": 1 } },
            doc! { "$limit": limit as i64 },
            doc! {
                "$lookup": {
                    "from": "users",
                    "localField": "_id",
                    "foreignField": "_id",
                    "as": "user",
                }
            },
            doc! { "$unwind": { "path": "$user", "preserveNullAndEmptyArrays": true } },
            doc! {
                "$project": {
                    "_id": 1,
                    "earnings": 1,
                    "transactions": 1,
                    "name": "$user.name",
                    "username": "$user.username",
                    "avatar": "$user.avatar",
                }
            },
            doc! { "$sort": { "earnings": -1, "_id": 1 } },
        ];

        let rows = self.aggregate("earnings", pipeline).await?;
        Ok(rows
            .iter()
            .map(|row| CreatorRanking {
                user_id: id_string(row.get("_id")),
                name: optional_str(row, "name"),
                username: optional_str(row, "username"),
                avatar: optional_str(row, "avatar"),
                earnings: number(row, "earnings"),
                transactions: integer(row, "transactions").max(0) as u64,
            })
            .collect())
    }

    async fn top_categories(&self, limit: usize) -> Result<Vec<CategoryCount>, AppError> {
        let pipeline = vec![
            doc! { "$project": { "category": { "$ifNull": ["$niche", "$category"] } } },
            doc! { "$match": { "category": { "$type": "string", "$ne": "" } } },
            doc! { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
            doc! { "$limit": limit as i64 },
        ];

        let rows = self.aggregate("blogs", pipeline).await?;
        Ok(rows
            .iter()
            .map(|row| CategoryCount {
                category: id_string(row.get("_id")),
                count: integer(row, "count").max(0) as u64,
            })
            .collect())
    }
}
