#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use api_types::account::{AccountNew, AccountType};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Budget, CacheSettings, Engine, MoneyCents, NewUser, Transaction, TransactionType, User,
    budgets, transactions,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_caches(CacheSettings::default()).await
}

pub async fn engine_with_caches(caches: CacheSettings) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .caches(caches)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn short_dashboard_ttl() -> CacheSettings {
    CacheSettings {
        dashboard_ttl: Duration::from_millis(50),
        ..CacheSettings::default()
    }
}

pub async fn register(engine: &Engine, external_id: &str) -> Arc<User> {
    engine
        .register_user(NewUser {
            external_id: external_id.to_string(),
            email: format!("{external_id}@example.com"),
            ..NewUser::default()
        })
        .await
        .unwrap()
}

pub fn account_new(name: &str, balance: &str, is_default: bool) -> AccountNew {
    AccountNew {
        name: name.to_string(),
        account_type: AccountType::Current,
        balance: balance.to_string(),
        is_default,
    }
}

pub async fn insert_transaction(
    db: &DatabaseConnection,
    user: &User,
    account_id: &str,
    transaction_type: TransactionType,
    amount: &str,
    date: DateTime<Utc>,
) -> Transaction {
    let tx = Transaction::new(
        user.id,
        Uuid::parse_str(account_id).unwrap(),
        transaction_type,
        amount.parse::<MoneyCents>().unwrap(),
        date,
    );
    transactions::ActiveModel::from(&tx).insert(db).await.unwrap();
    tx
}

pub async fn insert_budget(db: &DatabaseConnection, user: &User, amount: &str) -> Budget {
    let budget = Budget::new(user.id, amount.parse::<MoneyCents>().unwrap());
    budgets::ActiveModel::from(&budget).insert(db).await.unwrap();
    budget
}
