use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    db::{AccountStore, CatalogStore, ProfileStore},
    error::{AppError, AppResult},
    models::{Account, AgeLimit, Movie, MovieType, NewProfile, Profile, Video},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const ACCOUNT_COLUMNS: &str = "a.id, a.username, a.password_hash, a.created_at";

const PROFILE_COLUMNS: &str = "p.id, p.uuid, p.name, p.age_limit";

const MOVIE_COLUMNS: &str = "\
    m.id, m.uuid, m.title, m.description, m.created, \
    m.movie_type, m.image, m.age_limit";

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: i64,
    uuid: Uuid,
    name: String,
    age_limit: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> AppResult<Self> {
        Ok(Profile {
            id: row.id,
            uuid: row.uuid,
            name: row.name,
            age_limit: parse_column::<AgeLimit>(&row.age_limit)?,
        })
    }
}

#[derive(FromRow)]
struct MovieRow {
    id: i64,
    uuid: Uuid,
    title: String,
    description: Option<String>,
    created: DateTime<Utc>,
    movie_type: String,
    image: String,
    age_limit: String,
}

impl TryFrom<MovieRow> for Movie {
    type Error = AppError;

    fn try_from(row: MovieRow) -> AppResult<Self> {
        Ok(Movie {
            id: row.id,
            uuid: row.uuid,
            title: row.title,
            description: row.description,
            created: row.created,
            movie_type: parse_column::<MovieType>(&row.movie_type)?,
            image: row.image,
            age_limit: parse_column::<AgeLimit>(&row.age_limit)?,
        })
    }
}

#[derive(FromRow)]
struct VideoRow {
    id: i64,
    title: String,
    file: String,
}

fn parse_column<T>(value: &str) -> AppResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| AppError::Internal(format!("Corrupt column value: {}", e)))
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, username: &str, password_hash: &str) -> AppResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            "INSERT INTO accounts (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::InvalidInput(format!("username already taken: {}", username))
            }
            other => AppError::Database(other),
        })?;

        Ok(row.into())
    }

    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.username = $1");
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Account::from))
    }

    async fn create_session(
        &self,
        token_hash: &str,
        account_id: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();
        if pruned > 0 {
            tracing::debug!(pruned, "Expired sessions removed");
        }

        sqlx::query(
            "INSERT INTO sessions (token_hash, account_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(token_hash)
        .bind(account_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session_account(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Account>> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM sessions s \
             JOIN accounts a ON a.id = s.account_id \
             WHERE s.token_hash = $1 AND s.expires_at > $2"
        );
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        if row.is_none() {
            sqlx::query("DELETE FROM sessions WHERE token_hash = $1 AND expires_at <= $2")
                .bind(token_hash)
                .bind(now)
                .execute(&self.pool)
                .await?;
        }

        Ok(row.map(Account::from))
    }

    async fn delete_session(&self, token_hash: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgStore {
    async fn list_profiles(&self, account_id: i64) -> AppResult<Vec<Profile>> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p \
             JOIN account_profiles ap ON ap.profile_id = p.id \
             WHERE ap.account_id = $1 ORDER BY p.id"
        );
        let rows = sqlx::query_as::<_, ProfileRow>(&query)
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    async fn create_profile(&self, account_id: i64, profile: &NewProfile) -> AppResult<Profile> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            "INSERT INTO profiles (uuid, name, age_limit) VALUES ($1, $2, $3) \
             RETURNING id, uuid, name, age_limit",
        )
        .bind(Uuid::new_v4())
        .bind(&profile.name)
        .bind(profile.age_limit.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO account_profiles (account_id, profile_id) VALUES ($1, $2)")
            .bind(account_id)
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Profile::try_from(row)
    }

    async fn find_profile(&self, uuid: Uuid) -> AppResult<Option<Profile>> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.uuid = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&query)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn owns_profile(&self, account_id: i64, profile_id: i64) -> AppResult<bool> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (\
                SELECT 1 FROM account_profiles \
                WHERE account_id = $1 AND profile_id = $2\
             )",
        )
        .bind(account_id)
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgStore {
    async fn find_movie(&self, uuid: Uuid) -> AppResult<Option<Movie>> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies m WHERE m.uuid = $1");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Movie::try_from).transpose()
    }

    async fn list_movie_videos(&self, movie_id: i64) -> AppResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, VideoRow>(
            "SELECT v.id, v.title, v.file FROM videos v \
             JOIN movie_videos mv ON mv.video_id = v.id \
             WHERE mv.movie_id = $1 ORDER BY v.id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Video {
                id: row.id,
                title: row.title,
                file: row.file,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_accepts_stored_values() {
        assert_eq!(parse_column::<AgeLimit>("Kids").unwrap(), AgeLimit::Kids);
        assert_eq!(
            parse_column::<MovieType>("seasonal").unwrap(),
            MovieType::Seasonal
        );
    }

    #[test]
    fn test_parse_column_rejects_corrupt_values() {
        let result = parse_column::<AgeLimit>("Teens");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
