/// Handles the accounts of the player.
use anyhow::bail;
use sqlx::PgConnection;
use tracing::debug;

use crate::crypt::random_letters;
use crate::model::entity::Account;
use crate::{OldentideError, Result};

/// Key columns of the account table that have to be unique.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyColumn {
    Verify,
    Salt,
}

impl KeyColumn {
    fn exists_query(self) -> &'static str {
        match self {
            KeyColumn::Verify => r#"SELECT EXISTS(SELECT 1 FROM "accounts" WHERE "verify" = $1)"#,
            KeyColumn::Salt => r#"SELECT EXISTS(SELECT 1 FROM "accounts" WHERE "salt" = $1)"#,
        }
    }
}

/// Creates a new, not yet validated account.
pub async fn create(
    conn: &mut PgConnection,
    accountname: &str,
    email: &str,
    verify_key: &str,
    hashed_key: &str,
    salt_key: &str,
) -> Result<Account> {
    Ok(sqlx::query_as::<_, Account>(
        r#"INSERT INTO "accounts" ("valid", "banned", "accountname", "email", "gamesession", "playing", "verify", "hash", "salt")
        VALUES (FALSE, FALSE, $1, $2, 0, FALSE, $3, $4, $5)
        RETURNING *"#,
    )
    .bind(accountname)
    .bind(email)
    .bind(verify_key)
    .bind(hashed_key)
    .bind(salt_key)
    .fetch_one(conn)
    .await?)
}

/// Checks if an account with the given name exists.
pub async fn exists(conn: &mut PgConnection, accountname: &str) -> Result<bool> {
    let (found,): (bool,) =
        sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM "accounts" WHERE "accountname" = $1)"#)
            .bind(accountname)
            .fetch_one(conn)
            .await?;
    Ok(found)
}

/// Checks if the email is already used by an account.
pub async fn email_exists(conn: &mut PgConnection, email: &str) -> Result<bool> {
    let (found,): (bool,) =
        sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM "accounts" WHERE "email" = $1)"#)
            .bind(email)
            .fetch_one(conn)
            .await?;
    Ok(found)
}

/// Checks if the key is already used by an account in the given column.
pub async fn key_exists(conn: &mut PgConnection, column: KeyColumn, key: &str) -> Result<bool> {
    let (found,): (bool,) = sqlx::query_as(column.exists_query())
        .bind(key)
        .fetch_one(conn)
        .await?;
    Ok(found)
}

/// Generates a random letter key of the given length that isn't used in the given column yet.
/// Keeps trying until a free key is found.
pub async fn generate_unique_key(
    conn: &mut PgConnection,
    column: KeyColumn,
    length: usize,
) -> Result<String> {
    if length == 0 {
        bail!(OldentideError::InvalidKeyLength);
    }

    loop {
        let key = random_letters(length);
        if !key_exists(conn, column, &key).await? {
            return Ok(key);
        }
        debug!("Generated {:?} key collided, retrying", column);
    }
}

/// Finds an account by name.
pub async fn get_by_name(conn: &mut PgConnection, accountname: &str) -> Result<Account> {
    Ok(
        sqlx::query_as::<_, Account>(r#"SELECT * FROM "accounts" WHERE "accountname" = $1"#)
            .bind(accountname)
            .fetch_one(conn)
            .await?,
    )
}

/// Finds an account by name and locks its row until the surrounding transaction ends.
/// Serializes the writers that depend on the state of one account, like the player slot count.
pub async fn get_by_name_for_update(conn: &mut PgConnection, accountname: &str) -> Result<Account> {
    Ok(sqlx::query_as::<_, Account>(
        r#"SELECT * FROM "accounts" WHERE "accountname" = $1 FOR UPDATE"#,
    )
    .bind(accountname)
    .fetch_one(conn)
    .await?)
}

/// Finds the name of the account that owns the given verify key.
pub async fn get_name_by_verify_key(conn: &mut PgConnection, verify_key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as(r#"SELECT "accountname" FROM "accounts" WHERE "verify" = $1"#)
            .bind(verify_key)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(accountname,)| accountname))
}

/// Returns the salt of an account.
pub async fn get_salt(conn: &mut PgConnection, accountname: &str) -> Result<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as(r#"SELECT "salt" FROM "accounts" WHERE "accountname" = $1"#)
            .bind(accountname)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(salt,)| salt))
}

/// Lists all accounts ordered by their name.
pub async fn list(conn: &mut PgConnection) -> Result<Vec<Account>> {
    Ok(
        sqlx::query_as::<_, Account>(r#"SELECT * FROM "accounts" ORDER BY "accountname""#)
            .fetch_all(conn)
            .await?,
    )
}

/// Marks the account as validated. Returns the number of affected rows.
pub async fn activate(conn: &mut PgConnection, accountname: &str) -> Result<u64> {
    let result = sqlx::query(r#"UPDATE "accounts" SET "valid" = TRUE WHERE "accountname" = $1"#)
        .bind(accountname)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Bans the account. Returns the number of affected rows.
pub async fn ban(conn: &mut PgConnection, accountname: &str) -> Result<u64> {
    let result = sqlx::query(r#"UPDATE "accounts" SET "banned" = TRUE WHERE "accountname" = $1"#)
        .bind(accountname)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
pub mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::model::tests::db_test;

    #[test]
    fn test_create_account() -> Result<()> {
        // FIXME into an async closure once stable
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;

            let account = create(&mut conn, "alice", "a@x.com", "VKEY", "HHH", "SSS").await?;

            assert!(account.id > 0);
            assert_eq!(account.accountname, "alice");
            assert_eq!(account.email, "a@x.com");
            assert_eq!(account.verify, "VKEY");
            assert_eq!(account.hash, "HHH");
            assert_eq!(account.salt, "SSS");
            assert!(!account.valid);
            assert!(!account.banned);
            assert!(!account.playing);
            assert_eq!(account.gamesession, 0);
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_create_duplicate_account() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;

            create(&mut conn, "alice", "a@x.com", "VKEY1", "HHH", "SSS1").await?;
            let duplicate = create(&mut conn, "alice", "b@x.com", "VKEY2", "HHH", "SSS2").await;

            match duplicate {
                Ok(..) => panic!("Duplicate account name was accepted"),
                Err(e) => match e.downcast_ref::<sqlx::Error>() {
                    Some(sqlx::Error::Database(db_err)) => assert!(db_err.is_unique_violation()),
                    Some(..) | None => return Err(e),
                },
            }
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_exists() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;

            assert!(!exists(&mut conn, "alice").await?);
            assert!(!email_exists(&mut conn, "a@x.com").await?);

            create(&mut conn, "alice", "a@x.com", "VKEY", "HHH", "SSS").await?;

            assert!(exists(&mut conn, "alice").await?);
            assert!(email_exists(&mut conn, "a@x.com").await?);
            assert!(!exists(&mut conn, "bob").await?);
            assert!(!email_exists(&mut conn, "b@x.com").await?);
            // Parameter binding keeps quotes inert.
            assert!(!exists(&mut conn, "' OR '1'='1").await?);
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_get_name_by_verify_key() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            create(&mut conn, "alice", "a@x.com", "VKEY", "HHH", "SSS").await?;

            assert_eq!(
                get_name_by_verify_key(&mut conn, "VKEY").await?,
                Some("alice".to_string())
            );
            assert_eq!(get_name_by_verify_key(&mut conn, "UNKNOWN").await?, None);
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_activate_and_ban() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            create(&mut conn, "alice", "a@x.com", "VKEY", "HHH", "SSS").await?;

            assert_eq!(activate(&mut conn, "alice").await?, 1);
            let account = get_by_name(&mut conn, "alice").await?;
            assert!(account.valid);
            assert!(!account.banned);

            assert_eq!(ban(&mut conn, "alice").await?, 1);
            let account = get_by_name(&mut conn, "alice").await?;
            assert!(account.valid);
            assert!(account.banned);

            assert_eq!(activate(&mut conn, "nobody").await?, 0);
            assert_eq!(ban(&mut conn, "nobody").await?, 0);
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_get_by_name_not_found() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;

            match get_by_name(&mut conn, "nobody").await {
                Ok(..) => panic!("Found account that was never created"),
                Err(e) => match e.downcast_ref::<sqlx::Error>() {
                    Some(sqlx::Error::RowNotFound) => { /* Expected result */ }
                    Some(..) | None => return Err(e),
                },
            }
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_get_by_name_for_update() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            let account = create(&mut conn, "alice", "a@x.com", "VKEY", "HHH", "SSS").await?;

            let mut tx = pool.begin().await?;
            let locked = get_by_name_for_update(&mut *tx, "alice").await?;
            assert_eq!(locked.id, account.id);
            assert_eq!(locked.accountname, "alice");

            match get_by_name_for_update(&mut *tx, "nobody").await {
                Ok(..) => panic!("Found account that was never created"),
                Err(e) => match e.downcast_ref::<sqlx::Error>() {
                    Some(sqlx::Error::RowNotFound) => { /* Expected result */ }
                    Some(..) | None => return Err(e),
                },
            }
            tx.rollback().await?;
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_get_salt() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            create(&mut conn, "alice", "a@x.com", "VKEY", "HHH", "SSS").await?;

            assert_eq!(get_salt(&mut conn, "alice").await?, Some("SSS".to_string()));
            assert_eq!(get_salt(&mut conn, "nobody").await?, None);
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_list() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            assert!(list(&mut conn).await?.is_empty());

            for name in ["carol", "alice", "bob"].iter() {
                create(
                    &mut conn,
                    name,
                    &format!("{}@x.com", name),
                    &format!("verify-{}", name),
                    "HHH",
                    &format!("salt-{}", name),
                )
                .await?;
            }

            let names: Vec<String> = list(&mut conn)
                .await?
                .into_iter()
                .map(|a| a.accountname)
                .collect();
            assert_eq!(names, vec!["alice", "bob", "carol"]);
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_generate_unique_key() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;

            let verify = generate_unique_key(&mut conn, KeyColumn::Verify, 12).await?;
            let salt = generate_unique_key(&mut conn, KeyColumn::Salt, 12).await?;
            assert_eq!(verify.len(), 12);
            assert_eq!(salt.len(), 12);
            assert!(verify.chars().all(|c| c.is_ascii_alphabetic()));

            create(&mut conn, "alice", "a@x.com", &verify, "HHH", &salt).await?;
            assert!(key_exists(&mut conn, KeyColumn::Verify, &verify).await?);
            assert!(key_exists(&mut conn, KeyColumn::Salt, &salt).await?);
            assert!(!key_exists(&mut conn, KeyColumn::Salt, &verify).await?);

            for _ in 0..20 {
                let key = generate_unique_key(&mut conn, KeyColumn::Verify, 12).await?;
                assert_ne!(key, verify);
            }
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_generate_unique_key_with_exhausted_space() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;

            // Occupy all but one of the 52 single letter keys.
            let letters: Vec<char> = ('a'..='z').chain('A'..='Y').collect();
            for (i, letter) in letters.iter().enumerate() {
                create(
                    &mut conn,
                    &format!("user-{}", i),
                    &format!("user-{}@x.com", i),
                    &letter.to_string(),
                    "HHH",
                    &format!("salt-{}", i),
                )
                .await?;
            }

            let key = generate_unique_key(&mut conn, KeyColumn::Verify, 1).await?;
            assert_eq!(key, "Z");
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_generate_unique_key_rejects_zero_length() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;

            let err = generate_unique_key(&mut conn, KeyColumn::Salt, 0)
                .await
                .expect_err("zero length keys can't be unique");
            assert!(matches!(
                err.downcast_ref::<OldentideError>(),
                Some(OldentideError::InvalidKeyLength)
            ));
            Ok(())
        }
        db_test(test)
    }
}
