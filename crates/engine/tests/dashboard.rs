mod common;

use std::{sync::Arc, time::Duration};

use chrono::{Duration as ChronoDuration, Utc};
use engine::{EngineError, MonthRange, NewUser, RECENT_TRANSACTIONS_LIMIT, TransactionType};

use common::{
    account_new, engine_with_caches, engine_with_db, insert_budget, insert_transaction, register,
    short_dashboard_ttl,
};

#[tokio::test]
async fn unknown_user_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.lookup_user("nobody").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("User".to_string()));

    let err = engine.lookup_user("").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("User".to_string()));

    let err = engine.dashboard_snapshot("nobody").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("User".to_string()));
}

#[tokio::test]
async fn missing_user_is_visible_after_registration() {
    let (engine, _db) = engine_with_db().await;

    assert!(engine.lookup_user("late").await.is_err());
    register(&engine, "late").await;
    assert_eq!(engine.lookup_user("late").await.unwrap().external_id, "late");
}

#[tokio::test]
async fn register_user_is_idempotent() {
    let (engine, _db) = engine_with_db().await;

    let first = register(&engine, "user_1").await;
    let second = engine
        .register_user(NewUser {
            external_id: "user_1".to_string(),
            email: "changed@example.com".to_string(),
            ..NewUser::default()
        })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.email, "user_1@example.com");

    let err = engine.register_user(NewUser::default()).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn user_lookup_is_memoized() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "user_1").await;

    let a = engine.lookup_user("user_1").await.unwrap();
    let b = engine.lookup_user("user_1").await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(engine.user_cache_stats().hits >= 2);
}

#[tokio::test]
async fn empty_dashboard_for_new_user() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "user_1").await;

    let snapshot = engine.dashboard_snapshot("user_1").await.unwrap();
    assert!(snapshot.accounts.is_empty());
    assert!(snapshot.transactions.is_empty());
    assert_eq!(snapshot.budget, None);
    assert_eq!(snapshot.current_expenses, 0.0);
}

#[tokio::test]
async fn current_expenses_sums_month_expenses_of_default_account() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    let main = engine
        .create_account(&user, account_new("Main", "1000", true))
        .await
        .unwrap();
    let savings = engine
        .create_account(&user, account_new("Savings", "50", false))
        .await
        .unwrap();
    insert_budget(&db, &user, "500").await;

    let month = MonthRange::containing(Utc::now());
    let in_month = month.start() + ChronoDuration::hours(1);

    insert_transaction(&db, &user, &main.id, TransactionType::Expense, "12.50", month.start()).await;
    insert_transaction(&db, &user, &main.id, TransactionType::Expense, "7.25", in_month).await;
    insert_transaction(&db, &user, &main.id, TransactionType::Income, "900", in_month).await;
    insert_transaction(&db, &user, &savings.id, TransactionType::Expense, "40", in_month).await;
    insert_transaction(
        &db,
        &user,
        &main.id,
        TransactionType::Expense,
        "99",
        month.start() - ChronoDuration::seconds(1),
    )
    .await;
    insert_transaction(
        &db,
        &user,
        &main.id,
        TransactionType::Expense,
        "99",
        month.end_exclusive(),
    )
    .await;

    engine.invalidate_dashboard("user_1");
    let summary = engine.budget_summary("user_1").await.unwrap();
    assert_eq!(summary.budget.as_ref().map(|b| b.amount), Some(500.0));
    assert_eq!(summary.current_expenses, 19.75);

    let accounts = engine.user_accounts("user_1").await.unwrap();
    let main_view = accounts.iter().find(|a| a.id == main.id).unwrap();
    assert_eq!(main_view.transaction_count, 5);
}

#[tokio::test]
async fn current_expenses_is_zero_without_budget() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;
    let main = engine
        .create_account(&user, account_new("Main", "0", true))
        .await
        .unwrap();
    insert_transaction(&db, &user, &main.id, TransactionType::Expense, "30", Utc::now()).await;

    engine.invalidate_dashboard("user_1");
    let summary = engine.budget_summary("user_1").await.unwrap();
    assert_eq!(summary.budget, None);
    assert_eq!(summary.current_expenses, 0.0);
}

#[tokio::test]
async fn current_expenses_is_zero_without_default_account() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;
    insert_budget(&db, &user, "100").await;

    let summary = engine.budget_summary("user_1").await.unwrap();
    assert!(summary.budget.is_some());
    assert_eq!(summary.current_expenses, 0.0);
}

#[tokio::test]
async fn recent_list_is_capped_but_expenses_are_not() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;
    let main = engine
        .create_account(&user, account_new("Main", "0", true))
        .await
        .unwrap();
    insert_budget(&db, &user, "1000").await;

    let base = MonthRange::containing(Utc::now()).start();
    for minute in 0..55 {
        insert_transaction(
            &db,
            &user,
            &main.id,
            TransactionType::Expense,
            "1.10",
            base + ChronoDuration::minutes(minute),
        )
        .await;
    }

    engine.invalidate_dashboard("user_1");
    let snapshot = engine.dashboard_snapshot("user_1").await.unwrap();
    assert_eq!(snapshot.transactions.len() as u64, RECENT_TRANSACTIONS_LIMIT);
    assert!(
        snapshot
            .transactions
            .windows(2)
            .all(|pair| pair[0].date >= pair[1].date)
    );
    assert_eq!(snapshot.transactions[0].amount, 1.1);
    assert!((snapshot.current_expenses - 60.5).abs() < 1e-9);
}

#[tokio::test]
async fn latest_budget_wins_when_several_exist() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;
    insert_budget(&db, &user, "100").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let latest = insert_budget(&db, &user, "250").await;

    for _ in 0..3 {
        engine.invalidate_dashboard("user_1");
        let summary = engine.budget_summary("user_1").await.unwrap();
        assert_eq!(summary.budget.map(|b| b.id), Some(latest.id.to_string()));
    }
}

#[tokio::test]
async fn snapshot_is_served_from_cache_until_invalidated() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;
    let main = engine
        .create_account(&user, account_new("Main", "0", true))
        .await
        .unwrap();

    let first = engine.dashboard_snapshot("user_1").await.unwrap();
    let second = engine.dashboard_snapshot("user_1").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    insert_transaction(&db, &user, &main.id, TransactionType::Income, "5", Utc::now()).await;
    let cached = engine.recent_transactions("user_1").await.unwrap();
    assert!(cached.is_empty());

    engine.invalidate_dashboard("user_1");
    let fresh = engine.recent_transactions("user_1").await.unwrap();
    assert_eq!(fresh.len(), 1);
}

#[tokio::test]
async fn snapshot_refreshes_after_ttl() {
    let (engine, db) = engine_with_caches(short_dashboard_ttl()).await;
    let user = register(&engine, "user_1").await;
    let main = engine
        .create_account(&user, account_new("Main", "0", true))
        .await
        .unwrap();

    assert!(engine.recent_transactions("user_1").await.unwrap().is_empty());
    insert_transaction(&db, &user, &main.id, TransactionType::Expense, "5", Utc::now()).await;

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(engine.recent_transactions("user_1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn account_creation_refreshes_dashboard() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    assert!(engine.user_accounts("user_1").await.unwrap().is_empty());
    engine
        .create_account(&user, account_new("Main", "3", false))
        .await
        .unwrap();
    assert_eq!(engine.user_accounts("user_1").await.unwrap().len(), 1);
}
