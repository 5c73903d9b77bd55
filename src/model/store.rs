/// The account and character store used by the game server. Owns the connection pool and hands out
/// a connection per call. Only `push_npcs` and `create_player` span more than one statement.
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::config::DatabaseConfiguration;
use crate::model::entity::{Account, ItemTemplate, Npc, Pc};
use crate::model::repository::account::{self, KeyColumn};
use crate::model::repository::{item_template, npc, player};
use crate::{OldentideError, Result};

/// Result of a checked player creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCreation {
    Created(i32),
    NameTaken,
    NoSlotsLeft,
}

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Store { pool }
    }

    /// Creates the connection pool for the configured database.
    pub async fn connect(config: &DatabaseConfiguration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url())
            .await?;
        Ok(Store::new(pool))
    }

    pub async fn account_exists(&self, accountname: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        account::exists(&mut conn, accountname).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        account::email_exists(&mut conn, email).await
    }

    pub async fn player_first_name_taken(&self, firstname: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        player::is_first_name_taken(&mut conn, firstname).await
    }

    /// Creates an account that still needs to be activated. Uniqueness of the name, email and keys
    /// isn't checked beforehand; a violation makes the insert fail. Returns false if the account
    /// wasn't created.
    pub async fn create_account(
        &self,
        accountname: &str,
        email: &str,
        verify_key: &str,
        hashed_key: &str,
        salt_key: &str,
    ) -> bool {
        let result = async {
            let mut conn = self.pool.acquire().await?;
            account::create(&mut conn, accountname, email, verify_key, hashed_key, salt_key).await
        }
        .await;

        match result {
            Ok(account) => {
                info!("Created account {} with ID {}", account.accountname, account.id);
                true
            }
            Err(e) => {
                error!("Can't create account {}: {:?}", accountname, e);
                false
            }
        }
    }

    /// Marks an account as validated. Also returns true if no account with that name exists.
    pub async fn activate_account(&self, accountname: &str) -> bool {
        let result = async {
            let mut conn = self.pool.acquire().await?;
            account::activate(&mut conn, accountname).await
        }
        .await;
        report_update("activate", accountname, result)
    }

    /// Bans an account. Also returns true if no account with that name exists.
    pub async fn ban_account(&self, accountname: &str) -> bool {
        let result = async {
            let mut conn = self.pool.acquire().await?;
            account::ban(&mut conn, accountname).await
        }
        .await;
        report_update("ban", accountname, result)
    }

    /// Generates a verify key that no account uses yet.
    pub async fn generate_unique_verify(&self, length: usize) -> Result<String> {
        let mut conn = self.pool.acquire().await?;
        account::generate_unique_key(&mut conn, KeyColumn::Verify, length).await
    }

    /// Generates a salt that no account uses yet.
    pub async fn generate_unique_salt(&self, length: usize) -> Result<String> {
        let mut conn = self.pool.acquire().await?;
        account::generate_unique_key(&mut conn, KeyColumn::Salt, length).await
    }

    /// Returns the name of the account owning the verify key, or an empty string.
    pub async fn get_account_name_from_verify_key(&self, verify_key: &str) -> Result<String> {
        let mut conn = self.pool.acquire().await?;
        Ok(account::get_name_by_verify_key(&mut conn, verify_key)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_account(&self, accountname: &str) -> Result<Option<Account>> {
        let mut conn = self.pool.acquire().await?;
        match account::get_by_name(&mut conn, accountname).await {
            Ok(account) => Ok(Some(account)),
            Err(e) => match e.downcast_ref::<sqlx::Error>() {
                Some(sqlx::Error::RowNotFound) => Ok(None),
                Some(..) | None => Err(e),
            },
        }
    }

    pub async fn get_account_salt(&self, accountname: &str) -> Result<Option<String>> {
        let mut conn = self.pool.acquire().await?;
        account::get_salt(&mut conn, accountname).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut conn = self.pool.acquire().await?;
        account::list(&mut conn).await
    }

    pub async fn pull_pcs(&self) -> Result<Vec<Pc>> {
        let mut conn = self.pool.acquire().await?;
        player::list(&mut conn).await
    }

    pub async fn pull_npcs(&self) -> Result<Vec<Npc>> {
        let mut conn = self.pool.acquire().await?;
        npc::list(&mut conn).await
    }

    pub async fn pull_item_templates(&self) -> Result<Vec<ItemTemplate>> {
        let mut conn = self.pool.acquire().await?;
        item_template::list(&mut conn).await
    }

    /// Writes the state of all given NPCs back to the database in one transaction.
    pub async fn push_npcs(&self, npcs: &[Npc]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for n in npcs {
            if npc::update(&mut *tx, n).await? == 0 {
                warn!("NPC {} with ID {} has no row to update", n.firstname, n.id);
            }
        }
        tx.commit().await?;
        Ok(())
    }

    /// Inserts a player character without checking the name or the free slots of the account.
    pub async fn add_new_player(&self, pc: &Pc) -> Result<i32> {
        let mut conn = self.pool.acquire().await?;
        player::create(&mut conn, pc).await
    }

    /// Returns how many more characters the account may create. Negative if the account is over
    /// the limit.
    pub async fn get_remaining_player_slots(&self, accountname: &str, max_slots: i64) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        let count = player::get_count_by_account_name(&mut conn, accountname).await?;
        Ok(max_slots - count)
    }

    /// Checks the name and the free slots and inserts the player character inside one transaction.
    /// The account row stays locked until the commit, so concurrent creations for the same account
    /// see each other's players.
    /// The account ID of `pc` is replaced by the ID of the named account.
    pub async fn create_player(
        &self,
        accountname: &str,
        pc: &Pc,
        max_slots: i64,
    ) -> Result<PlayerCreation> {
        let mut tx = self.pool.begin().await?;

        let owner = match account::get_by_name_for_update(&mut *tx, accountname).await {
            Ok(owner) => owner,
            Err(e) => {
                return match e.downcast_ref::<sqlx::Error>() {
                    Some(sqlx::Error::RowNotFound) => {
                        Err(OldentideError::AccountNotFound(accountname.to_string()).into())
                    }
                    Some(..) | None => Err(e),
                }
            }
        };

        if player::is_first_name_taken(&mut *tx, &pc.firstname).await? {
            return Ok(PlayerCreation::NameTaken);
        }
        if max_slots - player::get_count_by_account_name(&mut *tx, accountname).await? <= 0 {
            return Ok(PlayerCreation::NoSlotsLeft);
        }

        let pc = Pc {
            account_id: owner.id,
            ..pc.clone()
        };
        let id = match player::create(&mut *tx, &pc).await {
            Ok(id) => id,
            Err(e) => {
                return match e.downcast_ref::<sqlx::Error>() {
                    Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                        Ok(PlayerCreation::NameTaken)
                    }
                    Some(..) | None => Err(e),
                }
            }
        };
        tx.commit().await?;

        info!("Created player {} with ID {} for account {}", pc.firstname, id, accountname);
        Ok(PlayerCreation::Created(id))
    }
}

fn report_update(action: &str, accountname: &str, result: Result<u64>) -> bool {
    match result {
        Ok(0) => {
            warn!("Can't {} account {}: no such account", action, accountname);
            true
        }
        Ok(..) => {
            info!("Account {} updated: {}", accountname, action);
            true
        }
        Err(e) => {
            error!("Can't {} account {}: {:?}", action, accountname, e);
            false
        }
    }
}
