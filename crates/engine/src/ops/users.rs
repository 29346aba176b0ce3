use std::sync::Arc;

use crate::{EngineError, NewUser, ResultEngine, User};

use super::{Engine, store};

impl Engine {
    /// Resolve an external (identity provider) id to the internal user.
    ///
    /// Successful lookups are memoized for the user cache TTL; a missing user
    /// is not remembered so a fresh sign-up is visible right away.
    pub async fn lookup_user(&self, external_id: &str) -> ResultEngine<Arc<User>> {
        if external_id.is_empty() {
            return Err(EngineError::NotFound("User".to_string()));
        }

        let key = external_id.to_string();
        self.users
            .get_or_try_insert_with(&key, || async {
                tracing::debug!(external_id, "user cache miss");
                store::find_unique_user(&self.database, external_id)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("User".to_string()))
            })
            .await
    }

    /// Create the user on first sign-in.
    ///
    /// Calling it again for the same external id returns the stored record
    /// untouched.
    pub async fn register_user(&self, new: NewUser) -> ResultEngine<Arc<User>> {
        let candidate = User::new(new)?;

        store::insert_user_if_absent(&self.database, &candidate).await?;
        let user = store::find_unique_user(&self.database, &candidate.external_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("User".to_string()))?;

        if user.id == candidate.id {
            tracing::info!(external_id = user.external_id.as_str(), "user registered");
        }

        Ok(self.users.insert(user.external_id.clone(), user))
    }
}
