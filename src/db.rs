use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{any::AnyPoolOptions, pool::PoolConnection, Any, AnyConnection, AnyPool, FromRow};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::{DashboardError, Result};

/// Synthetic category that disables filtering.
pub const ALL_CATEGORIES: &str = "All";

const COLUMNS: &str = "slug, headline, last_published_at, summary, url, hero_image_s3_key";

const RECENT_SLUGS: &str = r#"
    SELECT slug FROM articles
    WHERE summary != '' AND last_published_at > $1
    ORDER BY last_published_at DESC, slug ASC
"#;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Article {
    pub slug: String,
    pub headline: String,
    pub last_published_at: i64,
    pub summary: String,
    pub url: String,
    pub hero_image_s3_key: Option<String>,
}

/// Which categories an article query is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Prefixes(Vec<String>),
}

impl CategoryFilter {
    /// An empty selection, or one containing `All`, means no filtering.
    pub fn from_selection<S: AsRef<str>>(selected: &[S]) -> Self {
        if selected.is_empty() || selected.iter().any(|c| c.as_ref() == ALL_CATEGORIES) {
            return Self::All;
        }
        Self::Prefixes(selected.iter().map(|c| c.as_ref().to_string()).collect())
    }

    /// Builds the article query for this filter. Category patterns take
    /// `$1..$n` and the cutoff is always the last placeholder.
    pub fn sql(&self) -> String {
        let category_clause = match self {
            Self::All => String::new(),
            Self::Prefixes(categories) if categories.len() == 1 => {
                " AND LOWER(slug) LIKE $1 ESCAPE '\\'".to_string()
            }
            Self::Prefixes(categories) => {
                let predicates: Vec<String> = (1..=categories.len())
                    .map(|i| format!("LOWER(slug) LIKE ${} ESCAPE '\\'", i))
                    .collect();
                format!(" AND ({})", predicates.join(" OR "))
            }
        };

        format!(
            "SELECT {} FROM articles WHERE summary != ''{} AND last_published_at > ${} \
             ORDER BY last_published_at DESC, slug ASC",
            COLUMNS,
            category_clause,
            self.patterns().len() + 1
        )
    }

    /// Lowercased `LIKE` prefix patterns, in placeholder order.
    pub fn patterns(&self) -> Vec<String> {
        match self {
            Self::All => Vec::new(),
            Self::Prefixes(categories) => categories.iter().map(|c| like_prefix(c)).collect(),
        }
    }
}

/// `LIKE` pattern matching `category` literally as a lowercase prefix.
///
/// The category is folded with full Unicode rules, matching Postgres `LOWER`.
/// SQLite's `LOWER` folds ASCII only, so a slug with uppercase non-ASCII
/// letters matches on Postgres but not on a SQLite store.
fn like_prefix(category: &str) -> String {
    let mut pattern = String::with_capacity(category.len() + 1);
    for ch in category.to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Read access to the article table.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Slugs of publishable articles newer than `cutoff_millis`, newest first.
    async fn recent_slugs(&self, cutoff_millis: i64) -> Result<Vec<String>>;

    /// Publishable articles newer than `cutoff_millis` matching `filter`, newest first.
    async fn recent_articles(
        &self,
        cutoff_millis: i64,
        filter: &CategoryFilter,
    ) -> Result<Vec<Article>>;
}

pub struct Database {
    pool: AnyPool,
    query_timeout: Duration,
}

impl Database {
    /// Connects eagerly, failing if the store cannot be reached.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let url = config.connection_url()?;
        let pool = Self::pool_options(config)
            .connect(&url)
            .await
            .map_err(DashboardError::Connection)?;

        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }

    /// Defers connecting until the first query, so an unreachable store
    /// surfaces per request rather than at startup.
    pub fn new_lazy(config: &DatabaseConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let url = config.connection_url()?;
        let pool = Self::pool_options(config)
            .connect_lazy(&url)
            .map_err(DashboardError::Connection)?;

        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }

    fn pool_options(config: &DatabaseConfig) -> AnyPoolOptions {
        AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
    }

    async fn acquire(&self) -> Result<PoolConnection<Any>> {
        self.pool.acquire().await.map_err(DashboardError::Connection)
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(DashboardError::Query),
            Err(_) => Err(DashboardError::Timeout(self.query_timeout)),
        }
    }
}

#[async_trait]
impl ArticleStore for Database {
    async fn recent_slugs(&self, cutoff_millis: i64) -> Result<Vec<String>> {
        let mut conn = self.acquire().await?;
        let conn: &mut AnyConnection = &mut conn;

        let rows: Vec<(String,)> = self
            .bounded(
                sqlx::query_as(RECENT_SLUGS)
                    .bind(cutoff_millis)
                    .fetch_all(conn),
            )
            .await?;

        debug!("Fetched {} recent slugs (cutoff {})", rows.len(), cutoff_millis);
        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }

    async fn recent_articles(
        &self,
        cutoff_millis: i64,
        filter: &CategoryFilter,
    ) -> Result<Vec<Article>> {
        let sql = filter.sql();
        let mut query = sqlx::query_as::<_, Article>(&sql);
        for pattern in filter.patterns() {
            query = query.bind(pattern);
        }
        query = query.bind(cutoff_millis);

        let mut conn = self.acquire().await?;
        let conn: &mut AnyConnection = &mut conn;
        let articles = self.bounded(query.fetch_all(conn)).await?;

        debug!(
            "Fetched {} articles for {:?} (cutoff {})",
            articles.len(),
            filter,
            cutoff_millis
        );
        Ok(articles)
    }
}
