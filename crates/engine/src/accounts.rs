//! The module contains `Account` struct and its implementation.

use api_types::account::{AccountType as ApiAccountType, AccountView};
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccountType {
    #[default]
    Current,
    Savings,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Savings => "SAVINGS",
        }
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CURRENT" => Ok(Self::Current),
            "SAVINGS" => Ok(Self::Savings),
            other => Err(EngineError::Validation(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

impl From<ApiAccountType> for AccountType {
    fn from(value: ApiAccountType) -> Self {
        match value {
            ApiAccountType::Current => Self::Current,
            ApiAccountType::Savings => Self::Savings,
        }
    }
}

impl From<AccountType> for ApiAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Current => Self::Current,
            AccountType::Savings => Self::Savings,
        }
    }
}

/// An account.
///
/// An account is a place where money is kept (a current account, a savings
/// account). Exactly one account per user is the default one once the user
/// owns at least one account.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub balance: MoneyCents,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        user_id: Uuid,
        name: String,
        account_type: AccountType,
        balance: MoneyCents,
        is_default: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            account_type,
            balance,
            is_default,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transport view of the account.
    pub fn view(&self, transaction_count: u64) -> AccountView {
        AccountView {
            id: self.id.to_string(),
            user_id: self.user_id.to_string(),
            name: self.name.clone(),
            account_type: self.account_type.into(),
            balance: self.balance.to_f64(),
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
            transaction_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub account_type: String,
    pub balance_minor: i64,
    pub is_default: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            user_id: ActiveValue::Set(account.user_id.to_string()),
            name: ActiveValue::Set(account.name.clone()),
            account_type: ActiveValue::Set(account.account_type.as_str().to_string()),
            balance_minor: ActiveValue::Set(account.balance.cents()),
            is_default: ActiveValue::Set(account.is_default),
            created_at: ActiveValue::Set(account.created_at),
            updated_at: ActiveValue::Set(account.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("Account".to_string()))?,
            user_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::NotFound("User".to_string()))?,
            name: model.name,
            account_type: AccountType::try_from(model.account_type.as_str())?,
            balance: MoneyCents::new(model.balance_minor),
            is_default: model.is_default,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_converts_balance_to_float() {
        let account = Account::new(
            Uuid::new_v4(),
            "Main".to_string(),
            AccountType::Savings,
            MoneyCents::new(123_45),
            true,
        );
        let view = account.view(3);
        assert_eq!(view.balance, 123.45);
        assert_eq!(view.transaction_count, 3);
        assert_eq!(view.account_type, ApiAccountType::Savings);
        assert!(view.is_default);
    }

    #[test]
    fn model_round_trip_keeps_exact_cents() {
        let account = Account::new(
            Uuid::new_v4(),
            "Main".to_string(),
            AccountType::Current,
            MoneyCents::new(-5_01),
            false,
        );
        let active: ActiveModel = (&account).into();
        let model = Model {
            id: active.id.unwrap(),
            user_id: active.user_id.unwrap(),
            name: active.name.unwrap(),
            account_type: active.account_type.unwrap(),
            balance_minor: active.balance_minor.unwrap(),
            is_default: active.is_default.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };
        assert_eq!(Account::try_from(model).unwrap(), account);
    }

    #[test]
    fn unknown_account_type_is_rejected() {
        assert!(AccountType::try_from("CREDIT").is_err());
    }
}
