//! User Store
//!
//! `UserStore` is the persistence seam for user records. Role changes go
//! through `update_role_if`, a compare-and-update that applies the new role
//! only while the stored role still satisfies the caller's precondition.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::debug;

use crate::shared::error::Result;
use crate::user::entity::{normalize_email, ProfileUpdate, User, UserId, UserRole};

/// Precondition on a user's stored role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCondition {
    /// No constraint
    Any,
    /// Stored role must equal the given role
    Is(UserRole),
    /// Stored role must differ from the given role
    IsNot(UserRole),
}

impl RoleCondition {
    pub fn matches(&self, role: UserRole) -> bool {
        match self {
            Self::Any => true,
            Self::Is(expected) => role == *expected,
            Self::IsNot(excluded) => role != *excluded,
        }
    }

    /// Filter clause for the `role` field, or `None` when unconstrained.
    ///
    /// Documents without a `role` field read as `user`, so conditions naming
    /// `user` also consider a missing field.
    fn to_filter(self) -> Option<Bson> {
        match self {
            Self::Any => None,
            Self::Is(UserRole::User) => Some(Bson::Document(doc! {
                "$in": [UserRole::User.as_str(), Bson::Null]
            })),
            Self::Is(role) => Some(Bson::String(role.as_str().to_string())),
            Self::IsNot(UserRole::User) => Some(Bson::Document(doc! {
                "$nin": [UserRole::User.as_str(), Bson::Null]
            })),
            Self::IsNot(role) => Some(Bson::Document(doc! { "$ne": role.as_str() })),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All users, ordered by email.
    async fn find_all(&self) -> Result<Vec<User>>;

    async fn insert(&self, user: &User) -> Result<()>;

    /// Set `role` on the record identified by `id` if its current role
    /// satisfies `condition`. Returns the updated record, or `None` when no
    /// record matched (absent, or condition not met).
    async fn update_role_if(
        &self,
        id: &UserId,
        condition: RoleCondition,
        role: UserRole,
    ) -> Result<Option<User>>;

    /// Apply the provided profile fields. Returns the updated record, or
    /// `None` when the record does not exist.
    async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<Option<User>>;

    /// Readiness check against the backing store.
    async fn ping(&self) -> Result<()>;
}

// ============================================================================
// MongoDB User Repository
// ============================================================================

pub struct MongoUserRepository {
    db: Database,
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection(collection_name),
        }
    }

    /// Unique index on `email`; session resolution depends on it.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(model).await?;
        Ok(())
    }

    fn profile_set(update: &ProfileUpdate) -> Document {
        let mut set = Document::new();
        if let Some(name) = &update.name {
            set.insert("name", name.as_str());
        }
        if let Some(image) = &update.image {
            set.insert("image", image.as_str());
        }
        if let Some(phone) = &update.phone {
            set.insert("phone", phone.as_str());
        }
        if let Some(street) = &update.street_address {
            set.insert("streetAddress", street.as_str());
        }
        if let Some(postal) = &update.postal_code {
            set.insert("postalCode", postal.as_str());
        }
        if let Some(city) = &update.city {
            set.insert("city", city.as_str());
        }
        if let Some(country) = &update.country {
            set.insert("country", country.as_str());
        }
        set.insert("updatedAt", bson::DateTime::from_chrono(Utc::now()));
        set
    }
}

#[async_trait]
impl UserStore for MongoUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": *id.as_object_id() }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": normalize_email(email) }).await?)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let cursor = self.collection
            .find(doc! {})
            .sort(doc! { "email": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(user).await?;
        Ok(())
    }

    async fn update_role_if(
        &self,
        id: &UserId,
        condition: RoleCondition,
        role: UserRole,
    ) -> Result<Option<User>> {
        let mut filter = doc! { "_id": *id.as_object_id() };
        if let Some(role_filter) = condition.to_filter() {
            filter.insert("role", role_filter);
        }
        let update = doc! {
            "$set": {
                "role": role.as_str(),
                "updatedAt": bson::DateTime::from_chrono(Utc::now()),
            }
        };

        debug!(user_id = %id, ?condition, role = %role, "Conditional role update");

        Ok(self.collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<Option<User>> {
        Ok(self.collection
            .find_one_and_update(
                doc! { "_id": *id.as_object_id() },
                doc! { "$set": Self::profile_set(update) },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_condition_matches() {
        assert!(RoleCondition::Any.matches(UserRole::Courier));
        assert!(RoleCondition::Is(UserRole::Admin).matches(UserRole::Admin));
        assert!(!RoleCondition::Is(UserRole::Admin).matches(UserRole::Manager));
        assert!(RoleCondition::IsNot(UserRole::Admin).matches(UserRole::User));
        assert!(!RoleCondition::IsNot(UserRole::Admin).matches(UserRole::Admin));
        assert!(RoleCondition::IsNot(UserRole::User).matches(UserRole::Courier));
        assert!(!RoleCondition::IsNot(UserRole::User).matches(UserRole::User));
    }

    #[test]
    fn test_role_condition_filters() {
        assert_eq!(RoleCondition::Any.to_filter(), None);
        assert_eq!(
            RoleCondition::Is(UserRole::Admin).to_filter(),
            Some(Bson::String("admin".to_string()))
        );
        assert_eq!(
            RoleCondition::IsNot(UserRole::Admin).to_filter(),
            Some(Bson::Document(doc! { "$ne": "admin" }))
        );
        // A missing role field reads as `user`
        assert_eq!(
            RoleCondition::Is(UserRole::User).to_filter(),
            Some(Bson::Document(doc! { "$in": ["user", Bson::Null] }))
        );
        assert_eq!(
            RoleCondition::IsNot(UserRole::User).to_filter(),
            Some(Bson::Document(doc! { "$nin": ["user", Bson::Null] }))
        );
    }

    #[test]
    fn test_profile_set_only_includes_provided_fields() {
        let update = ProfileUpdate {
            name: Some("Mario".to_string()),
            postal_code: Some("80100".to_string()),
            ..Default::default()
        };
        let set = MongoUserRepository::profile_set(&update);

        assert_eq!(set.get_str("name").unwrap(), "Mario");
        assert_eq!(set.get_str("postalCode").unwrap(), "80100");
        assert!(set.get("phone").is_none());
        assert!(set.get("email").is_none());
        assert!(set.get("role").is_none());
        assert!(set.get_datetime("updatedAt").is_ok());
    }
}
