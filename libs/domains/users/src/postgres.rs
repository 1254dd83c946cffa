use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, SqlErr, Statement,
};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::password_reset::{PasswordReset, PasswordResetRepository, hash_token};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    name: String,
    username: String,
    phone: i64,
    birthday: NaiveDate,
    email: String,
    email_verified_at: Option<DateTime<Utc>>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            username: row.username,
            phone: row.phone,
            birthday: row.birthday,
            email: row.email,
            email_verified_at: row.email_verified_at,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct ExistsRow {
    exists: bool,
}

/// Unique index violations become field errors; everything else stays a database error.
fn map_write_err(err: DbErr) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("username") => {
            UserError::AlreadyTaken("username")
        }
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            UserError::AlreadyTaken("email")
        }
        _ => UserError::Database(err),
    }
}

const USER_COLUMNS: &str = "id, name, username, phone, birthday, email, email_verified_at, \
                            password_hash, created_at, updated_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.name.into(),
                user.username.into(),
                user.phone.into(),
                user.birthday.into(),
                user.email.into(),
                user.email_verified_at.into(),
                user.password_hash.into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(map_write_err)?
            .ok_or_else(|| UserError::Internal("Insert returned no row".to_string()))?;

        tracing::info!(user_id = %row.id, "Created user");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [(limit as i64).into(), (offset as i64).into()],
        );

        let rows = UserRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> UserResult<u64> {
        let stmt = Statement::from_string(DbBackend::Postgres, "SELECT COUNT(*) AS count FROM users");

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map_or(0, |r| r.count as u64))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = $2, username = $3, phone = $4, birthday = $5, email = $6,
                email_verified_at = $7, password_hash = $8, updated_at = $9
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let id = user.id;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.name.into(),
                user.username.into(),
                user.phone.into(),
                user.birthday.into(),
                user.email.into(),
                user.email_verified_at.into(),
                user.password_hash.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(map_write_err)?;

        row.map(Into::into).ok_or(UserError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            ) AS "exists"
            "#,
            [email.into(), exclude.into()],
        );

        let row = ExistsRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.is_some_and(|r| r.exists))
    }

    async fn username_exists(&self, username: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2)
            ) AS "exists"
            "#,
            [username.into(), exclude.into()],
        );

        let row = ExistsRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.is_some_and(|r| r.exists))
    }
}

/// `password_resets` table, one row per email
#[derive(Clone)]
pub struct PostgresPasswordResetRepository {
    db: DatabaseConnection,
}

impl PostgresPasswordResetRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct PasswordResetRow {
    email: String,
    token_hash: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PasswordResetRepository for PostgresPasswordResetRepository {
    async fn upsert(&self, reset: PasswordReset) -> UserResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO password_resets (email, token_hash, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET token_hash = EXCLUDED.token_hash, created_at = EXCLUDED.created_at
            "#,
            [
                reset.email.into(),
                reset.token_hash.into(),
                reset.created_at.into(),
            ],
        );

        self.db.execute_raw(stmt).await?;
        Ok(())
    }

    async fn find(&self, email: &str) -> UserResult<Option<PasswordReset>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT email, token_hash, created_at FROM password_resets WHERE email = LOWER($1)",
            [email.into()],
        );

        let row = PasswordResetRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| PasswordReset {
            email: r.email,
            token_hash: r.token_hash,
            created_at: r.created_at,
        }))
    }

    async fn consume(&self, email: &str, token: &str) -> UserResult<Option<PasswordReset>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            DELETE FROM password_resets
            WHERE email = LOWER($1) AND token_hash = $2
            RETURNING email, token_hash, created_at
            "#,
            [email.into(), hash_token(token).into()],
        );

        let row = PasswordResetRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| PasswordReset {
            email: r.email,
            token_hash: r.token_hash,
            created_at: r.created_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_utils::{TestDataBuilder, TestDatabase};

    fn user(builder: &TestDataBuilder, suffix: &str) -> User {
        User::new(
            builder.name("User", suffix),
            builder.username(suffix),
            5512345678,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            builder.email(suffix),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_create_get_update_delete() {
        let db = TestDatabase::empty().await;
        let repo = PostgresUserRepository::new(db.connection());
        let builder = TestDataBuilder::from_test_name("pg_users_crud");

        let created = repo.create(user(&builder, "ada")).await.unwrap();
        let fetched = repo
            .get_by_email(&created.email.to_uppercase())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, created.id);

        let mut changed = fetched.clone();
        changed.name = "Renamed".to_string();
        let updated = repo.update(changed).await.unwrap();
        assert_eq!(updated.name, "Renamed");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unique_violations_map_to_fields() {
        let db = TestDatabase::empty().await;
        let repo = PostgresUserRepository::new(db.connection());
        let builder = TestDataBuilder::from_test_name("pg_users_unique");

        let first = repo.create(user(&builder, "ada")).await.unwrap();

        let mut same_email = user(&builder, "grace");
        same_email.email = first.email.clone();
        assert!(matches!(
            repo.create(same_email).await,
            Err(UserError::AlreadyTaken("email"))
        ));

        let mut same_username = user(&builder, "linus");
        same_username.username = first.username.clone();
        assert!(matches!(
            repo.create(same_username).await,
            Err(UserError::AlreadyTaken("username"))
        ));

        assert!(repo.email_exists(&first.email, None).await.unwrap());
        assert!(!repo.email_exists(&first.email, Some(first.id)).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_email_uniqueness_ignores_case() {
        let db = TestDatabase::empty().await;
        let repo = PostgresUserRepository::new(db.connection());
        let builder = TestDataBuilder::from_test_name("pg_users_email_case");

        let first = repo.create(user(&builder, "ada")).await.unwrap();

        let mut shouting = user(&builder, "grace");
        shouting.email = first.email.to_uppercase();
        assert!(matches!(
            repo.create(shouting).await,
            Err(UserError::AlreadyTaken("email"))
        ));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_list_pages_newest_first() {
        let db = TestDatabase::empty().await;
        let repo = PostgresUserRepository::new(db.connection());
        let builder = TestDataBuilder::from_test_name("pg_users_list");
        let base = Utc::now();

        for i in 0..25 {
            let mut u = user(&builder, &format!("u{}", i));
            u.created_at = base + Duration::seconds(i);
            repo.create(u).await.unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 25);
        let last = repo.list(10, 20).await.unwrap();
        assert_eq!(last.len(), 5);
        assert_eq!(last[0].username, builder.username("u4"));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_password_reset_upsert_find_consume() {
        let db = TestDatabase::empty().await;
        let repo = PostgresPasswordResetRepository::new(db.connection());

        repo.upsert(PasswordReset::new("ada@example.com", "one")).await.unwrap();
        repo.upsert(PasswordReset::new("ada@example.com", "two")).await.unwrap();

        let stored = repo.find("Ada@Example.com").await.unwrap().unwrap();
        assert!(stored.matches("two"));

        assert!(repo.consume("ada@example.com", "one").await.unwrap().is_none());
        assert!(repo.consume("ADA@example.com", "two").await.unwrap().is_some());
        assert!(repo.consume("ada@example.com", "two").await.unwrap().is_none());
        assert!(repo.find("ada@example.com").await.unwrap().is_none());
    }
}
