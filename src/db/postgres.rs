use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        Activity, MarkOutcome, PageRequest, Title, TitleFilter, UserList, UserTitle, UserTitleRow,
    },
};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled schema migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Catalog backed by PostgreSQL
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Newest first; `seq` keeps insertion order among equal timestamps
const ACTIVITY_FEED_SQL: &str = r#"
    SELECT a.id, a."timestamp", a.activity, t.title
    FROM activities a
    JOIN titles t ON t.id = a.title_id
    WHERE a.user_id = $1
    ORDER BY a."timestamp" DESC, a.seq DESC
    LIMIT $2 OFFSET $3
"#;

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: Uuid,
    timestamp: DateTime<Utc>,
    activity: String,
    title: String,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(Activity {
            id: row.id,
            timestamp: row.timestamp,
            activity: row.activity.parse().map_err(AppError::Internal)?,
            title: row.title,
        })
    }
}

/// Pushes the title columns plus the caller's `favorited` / `watch_later` flags
fn push_user_title_columns<'a>(qb: &mut QueryBuilder<'a, Postgres>, user: &'a str) {
    qb.push(
        "SELECT t.id, t.title, t.synopsis, t.released, t.genre, \
         EXISTS (SELECT 1 FROM favorites f WHERE f.title_id = t.id AND f.user_id = ",
    );
    qb.push_bind(user);
    qb.push(
        ") AS favorited, \
         EXISTS (SELECT 1 FROM watchlater w WHERE w.title_id = t.id AND w.user_id = ",
    );
    qb.push_bind(user);
    qb.push(") AS watch_later FROM titles t");
}

/// Appends the filter as a WHERE clause on alias `t`
fn push_title_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &TitleFilter) {
    qb.push(" WHERE t.released >= ");
    qb.push_bind(filter.min_year);
    qb.push(" AND t.released <= ");
    qb.push_bind(filter.max_year);

    if let Some(pattern) = filter.like_pattern() {
        qb.push(" AND t.title ILIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\'");
    }

    if let Some(genres) = &filter.genres {
        qb.push(" AND t.genre = ANY(");
        qb.push_bind(genres.iter().cloned().collect::<Vec<String>>());
        qb.push(")");
    }
}

fn push_page<'a>(qb: &mut QueryBuilder<'a, Postgres>, page: PageRequest) {
    qb.push(" LIMIT ");
    qb.push_bind(page.limit());
    qb.push(" OFFSET ");
    qb.push_bind(page.offset());
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_genres(&self) -> AppResult<Vec<String>> {
        let genres = sqlx::query_scalar::<_, String>(
            r#"SELECT genre FROM titles GROUP BY genre ORDER BY genre COLLATE "C""#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(genres)
    }

    async fn search_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
        user: &str,
    ) -> AppResult<Vec<UserTitle>> {
        let mut qb = QueryBuilder::new("");
        push_user_title_columns(&mut qb, user);
        push_title_filter(&mut qb, filter);
        qb.push(r#" ORDER BY t.title COLLATE "C", t.id"#);
        push_page(&mut qb, page);

        let rows = qb
            .build_query_as::<UserTitleRow>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            rows = rows.len(),
            page = page.page,
            "Catalog search executed"
        );

        Ok(rows.into_iter().map(UserTitle::from).collect())
    }

    async fn list_marked(
        &self,
        list: UserList,
        page: PageRequest,
        user: &str,
    ) -> AppResult<Vec<UserTitle>> {
        let mut qb = QueryBuilder::new("");
        push_user_title_columns(&mut qb, user);
        qb.push(format!(
            " JOIN {} m ON m.title_id = t.id AND m.user_id = ",
            list.table()
        ));
        qb.push_bind(user);
        qb.push(r#" ORDER BY t.released, t.title COLLATE "C", t.id"#);
        push_page(&mut qb, page);

        let rows = qb
            .build_query_as::<UserTitleRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UserTitle::from).collect())
    }

    async fn title_exists(&self, title_id: Uuid) -> AppResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM titles WHERE id = $1)")
                .bind(title_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn add_mark(
        &self,
        list: UserList,
        title_id: Uuid,
        user: &str,
    ) -> AppResult<MarkOutcome> {
        let mut tx = self.pool.begin().await?;

        let insert = format!(
            "INSERT INTO {} (title_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            list.table()
        );
        let inserted = sqlx::query(&insert)
            .bind(title_id)
            .bind(user)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(MarkOutcome::AlreadyPresent);
        }

        sqlx::query(
            r#"
            INSERT INTO activities (id, "timestamp", activity, title_id, user_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Utc::now())
        .bind(list.activity().as_str())
        .bind(title_id)
        .bind(user)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(MarkOutcome::Added)
    }

    async fn remove_mark(&self, list: UserList, title_id: Uuid, user: &str) -> AppResult<bool> {
        let delete = format!(
            "DELETE FROM {} WHERE title_id = $1 AND user_id = $2",
            list.table()
        );
        let deleted = sqlx::query(&delete)
            .bind(title_id)
            .bind(user)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list_activities(&self, page: PageRequest, user: &str) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, ActivityRow>(ACTIVITY_FEED_SQL)
        .bind(user)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Activity::try_from).collect()
    }

    async fn count_titles(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM titles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn insert_titles(&self, titles: &[Title]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for title in titles {
            inserted += sqlx::query(
                r#"
                INSERT INTO titles (id, title, synopsis, released, genre)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(title.id)
            .bind(&title.title)
            .bind(&title.synopsis)
            .bind(title.released)
            .bind(&title.genre)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
