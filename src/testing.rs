//! Test and local-development support.
//!
//! [`MemoryBackend`] is a mutex-guarded in-process store implementing
//! [`AuthBackend`], mirroring the document collections a deployment keeps in
//! MongoDB. The integration suites drive the full router against it, and the
//! mutator helpers let tests rewind expiry clocks without sleeping.

use crate::backend::{AuthBackend, AuthUser, Category, NewUser, OtpRecord};
use crate::notify::{NotificationSender, NotifyError};
use chrono::{DateTime, Duration, Utc};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// User record held by [`MemoryBackend`].
#[derive(Debug, Clone)]
pub struct MemoryUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub email_verified: bool,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AuthUser for MemoryUser {
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
        self.otp_expires_at
    }

    fn interests(&self) -> &[String] {
        &self.interests
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<MemoryUser>,
    otps: Vec<OtpRecord>,
    categories: Vec<Category>,
}

/// In-process storage backend for tests and local development.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

const SEED_CATEGORY_NAMES: &[&str] = &[
    "Shoes",
    "Men T-shirts",
    "Makeup",
    "Jewellery",
    "Women T-shirts",
    "Furniture",
    "Electronics",
    "Books",
    "Sports",
    "Home & Garden",
    "Automotive",
    "Health & Beauty",
    "Toys & Games",
    "Clothing",
    "Accessories",
    "Kitchen",
    "Office Supplies",
    "Pet Supplies",
];

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the category collection with a fixed development set.
    pub fn seed_categories(&self) {
        let mut state = self.lock();
        state.categories = SEED_CATEGORY_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| Category {
                id: (index + 1).to_string(),
                name: (*name).to_string(),
                description: format!("High quality {} for all your needs", name.to_lowercase()),
                icon: "🛍️".to_string(),
                is_active: true,
                created_at: Utc::now(),
            })
            .collect();
    }

    /// Snapshot a user by email, for assertions.
    pub fn user_get(&self, email: &str) -> Option<MemoryUser> {
        self.lock().users.iter().find(|u| u.email == email).cloned()
    }

    /// All OTP records for an identity, in insertion order.
    pub fn otp_records(&self, email: &str) -> Vec<OtpRecord> {
        self.lock()
            .otps
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect()
    }

    /// The code on the newest pending record for an identity, if any.
    pub fn otp_latest_code(&self, email: &str) -> Option<String> {
        let state = self.lock();
        latest_pending(&state.otps, email).map(|r| r.code.clone())
    }

    /// Rewind the newest pending record's expiry into the past.
    pub fn otp_expire_latest(&self, email: &str) {
        let mut state = self.lock();
        let expired_at = Utc::now() - Duration::minutes(1);
        let id = latest_pending(&state.otps, email).map(|r| r.id);
        if let Some(id) = id
            && let Some(record) = state.otps.iter_mut().find(|r| r.id == id)
        {
            record.expires_at = expired_at;
        }
    }

    /// The embedded challenge code on a user record, if any.
    pub fn user_otp_code(&self, email: &str) -> Option<String> {
        self.lock()
            .users
            .iter()
            .find(|u| u.email == email)
            .and_then(|u| u.otp_code.clone())
    }

    /// Rewind a user's embedded challenge expiry into the past.
    pub fn user_otp_expire(&self, email: &str) {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.email == email) {
            user.otp_expires_at = Some(Utc::now() - Duration::minutes(1));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory backend mutex poisoned")
    }
}

/// Newest pending record wins; `max_by_key` keeps the last of equal
/// timestamps, which preserves insertion order on ties.
fn latest_pending<'a>(otps: &'a [OtpRecord], email: &str) -> Option<&'a OtpRecord> {
    otps.iter()
        .filter(|r| r.email == email && !r.verified)
        .max_by_key(|r| r.created_at)
}

impl AuthBackend for MemoryBackend {
    type User = MemoryUser;
    type Error = Infallible;

    async fn user_find_by_email(&self, email: &str) -> Result<Option<Self::User>, Self::Error> {
        Ok(self.user_get(email))
    }

    async fn user_get_by_id(&self, id: Uuid) -> Result<Option<Self::User>, Self::Error> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_insert(&self, user: NewUser) -> Result<Self::User, Self::Error> {
        let record = MemoryUser {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            email_verified: false,
            otp_code: Some(user.otp_code),
            otp_expires_at: Some(user.otp_expires_at),
            verified_at: None,
            interests: Vec::new(),
            created_at: Utc::now(),
        };
        self.lock().users.push(record.clone());
        Ok(record)
    }

    async fn user_email_verify_apply(
        &self,
        id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> Result<bool, Self::Error> {
        let mut state = self.lock();
        let Some(user) = state
            .users
            .iter_mut()
            .find(|u| u.id == id && !u.email_verified)
        else {
            return Ok(false);
        };
        user.email_verified = true;
        user.verified_at = Some(verified_at);
        user.otp_code = None;
        user.otp_expires_at = None;
        Ok(true)
    }

    async fn user_interests_replace(
        &self,
        id: Uuid,
        category_ids: &[String],
    ) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.interests = category_ids.to_vec();
        }
        Ok(())
    }

    async fn user_interest_add(&self, id: Uuid, category_id: &str) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id)
            && !user.interests.iter().any(|c| c == category_id)
        {
            user.interests.push(category_id.to_string());
        }
        Ok(())
    }

    async fn user_interest_remove(&self, id: Uuid, category_id: &str) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.interests.retain(|c| c != category_id);
        }
        Ok(())
    }

    async fn otp_record_insert(&self, record: &OtpRecord) -> Result<(), Self::Error> {
        self.lock().otps.push(record.clone());
        Ok(())
    }

    async fn otp_find_latest_pending(
        &self,
        email: &str,
    ) -> Result<Option<OtpRecord>, Self::Error> {
        let state = self.lock();
        Ok(latest_pending(&state.otps, email).cloned())
    }

    async fn otp_verify_apply(
        &self,
        id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> Result<bool, Self::Error> {
        let mut state = self.lock();
        let Some(record) = state.otps.iter_mut().find(|r| r.id == id && !r.verified) else {
            return Ok(false);
        };
        record.verified = true;
        record.verified_at = Some(verified_at);
        Ok(true)
    }

    async fn categories_page(
        &self,
        skip: u64,
        limit: i64,
    ) -> Result<(Vec<Category>, u64), Self::Error> {
        let state = self.lock();
        let total = state.categories.len() as u64;
        let page = state
            .categories
            .iter()
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

/// A delivered message captured by [`RecordingSender`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notification sender that records every message instead of delivering it.
#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages captured so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("recording sender mutex poisoned").clone()
    }
}

impl NotificationSender for RecordingSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("recording sender mutex poisoned")
            .push(SentMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}

/// Notification sender that fails every delivery, for exercising the
/// best-effort path.
#[derive(Clone, Default)]
pub struct FailingSender;

impl NotificationSender for FailingSender {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("delivery disabled".to_string()))
    }
}
