mod common;

use api_types::account::AccountType;
use engine::EngineError;

use common::{account_new, engine_with_db, register};

#[tokio::test]
async fn first_account_is_always_default() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    let created = engine
        .create_account(&user, account_new("Main", "1234.50", false))
        .await
        .unwrap();

    assert!(created.is_default);
    assert_eq!(created.balance, 1234.5);
    assert_eq!(created.account_type, AccountType::Current);
    assert_eq!(created.user_id, user.id.to_string());
    assert_eq!(created.transaction_count, 0);
}

#[tokio::test]
async fn new_default_account_clears_previous_default() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    let first = engine
        .create_account(&user, account_new("First", "10", false))
        .await
        .unwrap();
    let second = engine
        .create_account(&user, account_new("Second", "20", false))
        .await
        .unwrap();
    assert!(first.is_default);
    assert!(!second.is_default);

    let third = engine
        .create_account(&user, account_new("Third", "30", true))
        .await
        .unwrap();
    assert!(third.is_default);

    let accounts = engine.user_accounts(&user.external_id).await.unwrap();
    assert_eq!(accounts.len(), 3);
    let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, third.id);
}

#[tokio::test]
async fn defaults_are_scoped_per_user() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    engine
        .create_account(&alice, account_new("Alice", "1", true))
        .await
        .unwrap();
    let bobs = engine
        .create_account(&bob, account_new("Bob", "1", false))
        .await
        .unwrap();
    assert!(bobs.is_default);

    let alice_accounts = engine.user_accounts("alice").await.unwrap();
    assert_eq!(alice_accounts.len(), 1);
    assert!(alice_accounts[0].is_default);
}

#[tokio::test]
async fn malformed_balance_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    for balance in ["abc", "", "NaN", "Infinity", "12abc"] {
        let err = engine
            .create_account(&user, account_new("Main", balance, false))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("Invalid balance amount".to_string()),
            "balance {balance:?}"
        );
    }

    let accounts = engine.user_accounts("user_1").await.unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn blank_account_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    let err = engine
        .create_account(&user, account_new("   ", "5", false))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn negative_balance_is_accepted() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    let created = engine
        .create_account(&user, account_new("Overdraft", "-12.05", false))
        .await
        .unwrap();
    assert_eq!(created.balance, -12.05);
}

#[tokio::test]
async fn finite_balances_are_rounded_to_cents() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "user_1").await;

    for (balance, expected) in [("1e3", 1000.0), ("1.234", 1.23), ("1.235", 1.24), (".5", 0.5)] {
        let created = engine
            .create_account(&user, account_new("Main", balance, false))
            .await
            .unwrap();
        assert_eq!(created.balance, expected, "balance {balance:?}");
    }

    assert_eq!(engine.user_accounts("user_1").await.unwrap().len(), 4);
}
