use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, DateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::models::Role;

/// A platform account, stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime,
    pub last_login: Option<DateTime>,
}

fn default_active() -> bool {
    true
}

/// Publication state of a blog. Only `Published` blogs are public.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    #[default]
    Published,
    Archived,
}

/// A long-form article, stored in the `blogs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author: ObjectId,
    pub title: String,
    pub category: Option<String>,
    pub niche: Option<String>,
    #[serde(default)]
    pub views: i64,
    /// Ids of users who liked the blog. Kept set-like by `$addToSet`.
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    #[serde(default)]
    pub status: BlogStatus,
    pub created_at: DateTime,
}

impl Blog {
    /// The category a blog is ranked under: `niche`, else `category`.
    /// Blank values count as missing.
    pub fn topic(&self) -> Option<&str> {
        self.niche
            .as_deref()
            .or(self.category.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// A social-feed entry, stored in the `posts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author: ObjectId,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime,
}

/// A minted NFT record, stored in the `nfts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    /// The blog or post the NFT was minted from.
    pub content_id: Option<ObjectId>,
    pub name: Option<String>,
    pub created_at: DateTime,
}

/// One entry of the append-only `earnings` log. Amounts are signed:
/// rewards are positive, spends negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earning {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(deserialize_with = "object_id_or_hex")]
    pub user_id: ObjectId,
    pub amount: f64,
    pub reason: Option<String>,
    pub timestamp: DateTime,
}

/// Older writers stored `userId` as a hex string; accept both forms.
fn object_id_or_hex<'de, D>(deserializer: D) -> Result<ObjectId, D::Error>
where
    D: Deserializer<'de>,
{
    match Bson::deserialize(deserializer)? {
        Bson::ObjectId(oid) => Ok(oid),
        Bson::String(s) => ObjectId::parse_str(&s).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "expected ObjectId or hex string, found {other}"
        ))),
    }
}

/// A full snapshot of the platform collections.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub blogs: Vec<Blog>,
    pub nfts: Vec<Nft>,
    pub earnings: Vec<Earning>,
}

/// A user's derived wallet balance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LedgerBalance {
    /// Sum of every earning amount for the user.
    pub balance: f64,
    /// Number of earnings contributing to `balance`.
    pub transactions: u64,
}
