use api_types::account::{AccountNew, AccountView};
use sea_orm::TransactionTrait;

use crate::{Account, EngineError, MoneyCents, ResultEngine, User};

use super::{Engine, normalize_required_name, store, with_tx};

impl Engine {
    /// Add a new account for `user`.
    ///
    /// The first account of a user is always the default one. When the new
    /// account is the default, the flag is removed from every other account
    /// in the same DB transaction, so at most one default exists at any time.
    ///
    /// The user's memoized dashboard is dropped on success.
    pub async fn create_account(&self, user: &User, input: AccountNew) -> ResultEngine<AccountView> {
        let balance: MoneyCents = input
            .balance
            .parse()
            .map_err(|_| EngineError::Validation("Invalid balance amount".to_string()))?;
        let name = normalize_required_name(&input.name, "account")?;

        let account: ResultEngine<Account> = with_tx!(self, |db_tx| {
            let existing = store::count_accounts(&db_tx, user.id).await?;
            let is_default = existing == 0 || input.is_default;

            if is_default {
                let cleared = store::clear_default_accounts(&db_tx, user.id).await?;
                tracing::debug!(cleared, "default flag moved to new account");
            }

            let account = Account::new(
                user.id,
                name,
                input.account_type.into(),
                balance,
                is_default,
            );
            store::insert_account(&db_tx, &account).await?;
            Ok(account)
        });
        let account = account?;

        self.invalidate_dashboard(&user.external_id);
        tracing::info!(
            account_id = %account.id,
            is_default = account.is_default,
            "account created"
        );

        Ok(account.view(0))
    }
}
