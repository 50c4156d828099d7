//! Process-local store that answers every repository query with a linear
//! scan. It backs `store = "memory"` and serves as the reference the MongoDB
//! aggregation pipelines are checked against.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::db::ledger_repository::LedgerRepository;
use crate::db::models::{Dataset, Earning, LedgerBalance};
use crate::db::repository::{Entity, StatsRepository};
use crate::error::AppError;
use crate::stats::{rank_categories, rank_creators, CategoryCount, CreatorRanking, Engagement};

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Dataset>,
}

fn bson_time(t: DateTime<Utc>) -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_chrono(t)
}

fn at_or_after(at: mongodb::bson::DateTime, since: Option<DateTime<Utc>>) -> bool {
    since.map_or(true, |since| at >= bson_time(since))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(data: Dataset) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Dataset>, AppError> {
        self.data
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Dataset>, AppError> {
        self.data
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    /// Replace the contents with `data`.
    pub fn load(&self, data: Dataset) -> Result<(), AppError> {
        *self.write()? = data;
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn count(&self, entity: Entity, since: Option<DateTime<Utc>>) -> Result<u64, AppError> {
        let data = self.read()?;
        let n = match entity {
            Entity::Users => data
                .users
                .iter()
                .filter(|u| at_or_after(u.created_at, since))
                .count(),
            Entity::Posts => data
                .posts
                .iter()
                .filter(|p| at_or_after(p.created_at, since))
                .count(),
            Entity::Blogs => data
                .blogs
                .iter()
                .filter(|b| at_or_after(b.created_at, since))
                .count(),
            Entity::Nfts => data
                .nfts
                .iter()
                .filter(|n| at_or_after(n.created_at, since))
                .count(),
        };
        Ok(n as u64)
    }

    async fn count_active_users(&self, since: DateTime<Utc>) -> Result<u64, AppError> {
        let data = self.read()?;
        Ok(data
            .users
            .iter()
            .filter(|u| u.last_login.is_some_and(|l| l >= bson_time(since)))
            .count() as u64)
    }

    async fn sum_earnings(&self, since: Option<DateTime<Utc>>) -> Result<f64, AppError> {
        let data = self.read()?;
        Ok(data
            .earnings
            .iter()
            .filter(|e| at_or_after(e.timestamp, since))
            .map(|e| e.amount)
            .sum())
    }

    async fn blog_engagement(&self) -> Result<Engagement, AppError> {
        let data = self.read()?;
        Ok(data.blogs.iter().fold(Engagement::default(), |acc, b| Engagement {
            views: acc.views + b.views,
            likes: acc.likes + b.likes.len() as u64,
        }))
    }

    async fn top_creators(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CreatorRanking>, AppError> {
        let data = self.read()?;

        let mut totals: HashMap<ObjectId, (f64, u64)> = HashMap::new();
        for earning in data.earnings.iter().filter(|e| at_or_after(e.timestamp, Some(since))) {
            let entry = totals.entry(earning.user_id).or_default();
            entry.0 += earning.amount;
            entry.1 += 1;
        }

        let mut rows: Vec<CreatorRanking> = totals
            .into_iter()
            .map(|(user_id, (earnings, transactions))| {
                let user = data.users.iter().find(|u| u.id == user_id);
                CreatorRanking {
                    user_id: user_id.to_hex(),
                    name: user.and_then(|u| u.name.clone()),
                    username: user.and_then(|u| u.username.clone()),
                    avatar: user.and_then(|u| u.avatar.clone()),
                    earnings,
                    transactions,
                }
            })
            .collect();

        rank_creators(&mut rows);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn top_categories(&self, limit: usize) -> Result<Vec<CategoryCount>, AppError> {
        let data = self.read()?;

        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for topic in data.blogs.iter().filter_map(|b| b.topic()) {
            *counts.entry(topic).or_default() += 1;
        }

        let mut rows: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();

        rank_categories(&mut rows);
        rows.truncate(limit);
        Ok(rows)
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn append(&self, mut earning: Earning) -> Result<Earning, AppError> {
        earning.id.get_or_insert_with(ObjectId::new);
        self.write()?.earnings.push(earning.clone());
        Ok(earning)
    }

    async fn balance(&self, user_id: ObjectId) -> Result<LedgerBalance, AppError> {
        let data = self.read()?;
        Ok(data
            .earnings
            .iter()
            .filter(|e| e.user_id == user_id)
            .fold(LedgerBalance::default(), |acc, e| LedgerBalance {
                balance: acc.balance + e.amount,
                transactions: acc.transactions + 1,
            }))
    }

    async fn history(&self, user_id: ObjectId, limit: usize) -> Result<Vec<Earning>, AppError> {
        let data = self.read()?;
        let mut rows: Vec<Earning> = data
            .earnings
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        rows.truncate(limit);
        Ok(rows)
    }
}
