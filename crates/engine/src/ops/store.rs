//! Store round-trips used by the engine operations.
//!
//! Every function takes any connection so the same query can run on the pool
//! or inside a transaction.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    Account, Budget, MoneyCents, ResultEngine, Transaction, TransactionType, User, accounts,
    budgets, transactions, users,
};

use super::MonthRange;

pub(super) async fn find_unique_user<C: ConnectionTrait>(
    db: &C,
    external_id: &str,
) -> ResultEngine<Option<User>> {
    users::Entity::find()
        .filter(users::Column::ExternalId.eq(external_id))
        .one(db)
        .await?
        .map(User::try_from)
        .transpose()
}

/// Inserts the user unless a row with the same external id already exists.
pub(super) async fn insert_user_if_absent<C: ConnectionTrait>(
    db: &C,
    user: &User,
) -> ResultEngine<()> {
    users::Entity::insert(users::ActiveModel::from(user))
        .on_conflict(
            OnConflict::column(users::Column::ExternalId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Accounts of the user, newest first, each with its transaction count.
pub(super) async fn list_accounts<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> ResultEngine<Vec<(Account, u64)>> {
    let user_id = user_id.to_string();

    let models = accounts::Entity::find()
        .filter(accounts::Column::UserId.eq(user_id.clone()))
        .order_by_desc(accounts::Column::CreatedAt)
        .order_by_desc(accounts::Column::Id)
        .all(db)
        .await?;

    let counts: HashMap<String, i64> = transactions::Entity::find()
        .select_only()
        .column(transactions::Column::AccountId)
        .column_as(Expr::col(transactions::Column::Id).count(), "transaction_count")
        .filter(transactions::Column::UserId.eq(user_id))
        .group_by(transactions::Column::AccountId)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    models
        .into_iter()
        .map(|model| {
            let count = counts.get(&model.id).copied().unwrap_or(0).max(0) as u64;
            Ok((Account::try_from(model)?, count))
        })
        .collect()
}

pub(super) async fn count_accounts<C: ConnectionTrait>(db: &C, user_id: Uuid) -> ResultEngine<u64> {
    Ok(accounts::Entity::find()
        .filter(accounts::Column::UserId.eq(user_id.to_string()))
        .count(db)
        .await?)
}

/// The `limit` most recent transactions of the user, by date descending.
pub(super) async fn list_recent_transactions<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    limit: u64,
) -> ResultEngine<Vec<Transaction>> {
    transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user_id.to_string()))
        .order_by_desc(transactions::Column::Date)
        .order_by_desc(transactions::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(Transaction::try_from)
        .collect()
}

/// The budget consulted for the dashboard.
///
/// Users are expected to have a single budget; if several exist the most
/// recently created one wins so the answer is stable across calls.
pub(super) async fn find_first_budget<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> ResultEngine<Option<Budget>> {
    budgets::Entity::find()
        .filter(budgets::Column::UserId.eq(user_id.to_string()))
        .order_by_desc(budgets::Column::CreatedAt)
        .order_by_desc(budgets::Column::Id)
        .one(db)
        .await?
        .map(Budget::try_from)
        .transpose()
}

/// Sum of `EXPENSE` amounts on one account within `range`.
pub(super) async fn aggregate_expense_sum<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    account_id: Uuid,
    range: MonthRange,
) -> ResultEngine<MoneyCents> {
    let total: Option<Option<i64>> = transactions::Entity::find()
        .select_only()
        .column_as(Expr::col(transactions::Column::AmountMinor).sum(), "total")
        .filter(transactions::Column::UserId.eq(user_id.to_string()))
        .filter(transactions::Column::AccountId.eq(account_id.to_string()))
        .filter(transactions::Column::TransactionType.eq(TransactionType::Expense.as_str()))
        .filter(transactions::Column::Date.gte(range.start()))
        .filter(transactions::Column::Date.lt(range.end_exclusive()))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?;

    Ok(MoneyCents::new(total.flatten().unwrap_or(0)))
}

/// Drops the default flag from every account of the user.
pub(super) async fn clear_default_accounts<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> ResultEngine<u64> {
    let result = accounts::Entity::update_many()
        .col_expr(accounts::Column::IsDefault, Expr::value(false))
        .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(accounts::Column::UserId.eq(user_id.to_string()))
        .filter(accounts::Column::IsDefault.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub(super) async fn insert_account<C: ConnectionTrait>(db: &C, account: &Account) -> ResultEngine<()> {
    accounts::ActiveModel::from(account).insert(db).await?;
    Ok(())
}
