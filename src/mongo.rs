//! MongoDB implementation of the storage backend.
//!
//! Three collections: `users`, `otps`, `categories`. The pending-to-verified
//! transitions are filtered `update_one` calls conditioned on the unverified
//! state, so concurrent verification attempts commit at most once. OTP
//! records are never deleted; expired and superseded records remain in the
//! `otps` collection (a TTL index on `expires_at` would bound growth, but
//! none is created).

use crate::backend::{AuthBackend, AuthUser, Category, NewUser, OtpRecord};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{self, DateTime as BsonDateTime, doc, oid::ObjectId},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User document as stored in the `users` collection.
///
/// The embedded OTP challenge fields are `$unset` (removed, not nulled) when
/// the email is verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUser {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    otp_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    otp_expires_at: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    verified_at: Option<BsonDateTime>,
    #[serde(default)]
    interests: Vec<String>,
    created_at: BsonDateTime,
}

impl AuthUser for MongoUser {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }

    fn email_verified(&self) -> bool {
        self.email_verified
    }

    fn otp_code(&self) -> Option<&str> {
        self.otp_code.as_deref()
    }

    fn otp_expires_at(&self) -> Option<DateTime<Utc>> {
        self.otp_expires_at.map(|dt| dt.to_chrono())
    }

    fn interests(&self) -> &[String] {
        &self.interests
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at.to_chrono()
    }
}

/// OTP record document as stored in the `otps` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtpDocument {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    id: Uuid,
    email: String,
    code: String,
    purpose: String,
    created_at: BsonDateTime,
    expires_at: BsonDateTime,
    verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    verified_at: Option<BsonDateTime>,
}

impl From<&OtpRecord> for OtpDocument {
    fn from(record: &OtpRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            code: record.code.clone(),
            purpose: record.purpose.clone(),
            created_at: BsonDateTime::from_chrono(record.created_at),
            expires_at: BsonDateTime::from_chrono(record.expires_at),
            verified: record.verified,
            verified_at: record.verified_at.map(BsonDateTime::from_chrono),
        }
    }
}

impl From<OtpDocument> for OtpRecord {
    fn from(doc: OtpDocument) -> Self {
        Self {
            id: doc.id,
            email: doc.email,
            code: doc.code,
            purpose: doc.purpose,
            created_at: doc.created_at.to_chrono(),
            expires_at: doc.expires_at.to_chrono(),
            verified: doc.verified,
            verified_at: doc.verified_at.map(|dt| dt.to_chrono()),
        }
    }
}

/// Category document as stored in the `categories` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    description: String,
    icon: String,
    #[serde(default)]
    is_active: bool,
    created_at: BsonDateTime,
}

impl From<CategoryDocument> for Category {
    fn from(doc: CategoryDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            name: doc.name,
            description: doc.description,
            icon: doc.icon,
            is_active: doc.is_active,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

/// Storage backend over a MongoDB database.
#[derive(Clone)]
pub struct MongoBackend {
    db: Database,
}

impl MongoBackend {
    /// Wrap an existing database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect to a MongoDB deployment and select a database.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(client.database(db_name)))
    }

    fn users(&self) -> Collection<MongoUser> {
        self.db.collection("users")
    }

    fn otps(&self) -> Collection<OtpDocument> {
        self.db.collection("otps")
    }

    fn categories(&self) -> Collection<CategoryDocument> {
        self.db.collection("categories")
    }
}

impl AuthBackend for MongoBackend {
    type User = MongoUser;
    type Error = mongodb::error::Error;

    async fn user_find_by_email(&self, email: &str) -> Result<Option<Self::User>, Self::Error> {
        self.users().find_one(doc! { "email": email }).await
    }

    async fn user_get_by_id(&self, id: Uuid) -> Result<Option<Self::User>, Self::Error> {
        self.users()
            .find_one(doc! { "_id": bson::Uuid::from_uuid_1(id) })
            .await
    }

    async fn user_insert(&self, user: NewUser) -> Result<Self::User, Self::Error> {
        let doc = MongoUser {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            email_verified: false,
            otp_code: Some(user.otp_code),
            otp_expires_at: Some(BsonDateTime::from_chrono(user.otp_expires_at)),
            verified_at: None,
            interests: Vec::new(),
            created_at: BsonDateTime::now(),
        };
        self.users().insert_one(&doc).await?;
        Ok(doc)
    }

    async fn user_email_verify_apply(
        &self,
        id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> Result<bool, Self::Error> {
        let result = self
            .users()
            .update_one(
                doc! {
                    "_id": bson::Uuid::from_uuid_1(id),
                    "email_verified": false,
                },
                doc! {
                    "$set": {
                        "email_verified": true,
                        "verified_at": BsonDateTime::from_chrono(verified_at),
                    },
                    "$unset": { "otp_code": "", "otp_expires_at": "" },
                },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn user_interests_replace(
        &self,
        id: Uuid,
        category_ids: &[String],
    ) -> Result<(), Self::Error> {
        self.users()
            .update_one(
                doc! { "_id": bson::Uuid::from_uuid_1(id) },
                doc! { "$set": { "interests": category_ids.to_vec() } },
            )
            .await?;
        Ok(())
    }

    async fn user_interest_add(&self, id: Uuid, category_id: &str) -> Result<(), Self::Error> {
        self.users()
            .update_one(
                doc! { "_id": bson::Uuid::from_uuid_1(id) },
                doc! { "$addToSet": { "interests": category_id } },
            )
            .await?;
        Ok(())
    }

    async fn user_interest_remove(&self, id: Uuid, category_id: &str) -> Result<(), Self::Error> {
        self.users()
            .update_one(
                doc! { "_id": bson::Uuid::from_uuid_1(id) },
                doc! { "$pull": { "interests": category_id } },
            )
            .await?;
        Ok(())
    }

    async fn otp_record_insert(&self, record: &OtpRecord) -> Result<(), Self::Error> {
        self.otps().insert_one(OtpDocument::from(record)).await?;
        Ok(())
    }

    async fn otp_find_latest_pending(
        &self,
        email: &str,
    ) -> Result<Option<OtpRecord>, Self::Error> {
        let doc = self
            .otps()
            .find_one(doc! { "email": email, "verified": false })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(doc.map(OtpRecord::from))
    }

    async fn otp_verify_apply(
        &self,
        id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> Result<bool, Self::Error> {
        let result = self
            .otps()
            .update_one(
                doc! {
                    "_id": bson::Uuid::from_uuid_1(id),
                    "verified": false,
                },
                doc! {
                    "$set": {
                        "verified": true,
                        "verified_at": BsonDateTime::from_chrono(verified_at),
                    },
                },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn categories_page(
        &self,
        skip: u64,
        limit: i64,
    ) -> Result<(Vec<Category>, u64), Self::Error> {
        let cursor = self.categories().find(doc! {}).skip(skip).limit(limit).await?;
        let docs: Vec<CategoryDocument> = cursor.try_collect().await?;
        let total = self.categories().count_documents(doc! {}).await?;
        Ok((docs.into_iter().map(Category::from).collect(), total))
    }
}
