//! Monthly budget of a user.

use api_types::budget::BudgetView;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Debug, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: MoneyCents,
    pub last_alert_sent: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(user_id: Uuid, amount: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            last_alert_sent: None,
            created_at: Utc::now(),
        }
    }

    pub fn view(&self) -> BudgetView {
        BudgetView {
            id: self.id.to_string(),
            user_id: self.user_id.to_string(),
            amount: self.amount.to_f64(),
            last_alert_sent: self.last_alert_sent,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub last_alert_sent: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.to_string()),
            amount_minor: ActiveValue::Set(budget.amount.cents()),
            last_alert_sent: ActiveValue::Set(budget.last_alert_sent),
            created_at: ActiveValue::Set(budget.created_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("Budget".to_string()))?,
            user_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::NotFound("User".to_string()))?,
            amount: MoneyCents::new(model.amount_minor),
            last_alert_sent: model.last_alert_sent,
            created_at: model.created_at,
        })
    }
}
