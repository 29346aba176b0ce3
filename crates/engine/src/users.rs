//! Users table.
//!
//! A user row is created on first sign-in and is keyed internally by a UUID;
//! `external_id` is the identifier issued by the identity provider and is
//! unique.

use api_types::user::UserView;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile data received from the identity provider on first sign-in.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl User {
    pub fn new(new: NewUser) -> ResultEngine<Self> {
        let external_id = new.external_id.trim();
        if external_id.is_empty() {
            return Err(EngineError::Validation(
                "external id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            email: new.email.trim().to_string(),
            name: new.name,
            image_url: new.image_url,
            created_at: Utc::now(),
        })
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.to_string(),
            external_id: self.external_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: ActiveValue::Set(user.id.to_string()),
            external_id: ActiveValue::Set(user.external_id.clone()),
            email: ActiveValue::Set(user.email.clone()),
            name: ActiveValue::Set(user.name.clone()),
            image_url: ActiveValue::Set(user.image_url.clone()),
            created_at: ActiveValue::Set(user.created_at),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("User".to_string()))?,
            external_id: model.external_id,
            email: model.email,
            name: model.name,
            image_url: model.image_url,
            created_at: model.created_at,
        })
    }
}
