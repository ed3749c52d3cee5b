use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::clock::{cutoff_millis, Clock};
use crate::db::{Article, ArticleStore, CategoryFilter, ALL_CATEGORIES};
use crate::error::Result;
use crate::format::{category_of, format_published_time, ImageResolver};

/// An article with its display strings precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleCard {
    pub slug: String,
    pub category: String,
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub image_url: Option<String>,
    pub display_time: String,
    pub last_published_at: i64,
}

/// The read-and-format pipeline behind every page render.
pub struct Dashboard {
    store: Arc<dyn ArticleStore>,
    clock: Arc<dyn Clock>,
    images: ImageResolver,
}

impl Dashboard {
    pub fn new(store: Arc<dyn ArticleStore>, clock: Arc<dyn Clock>, images: ImageResolver) -> Self {
        Self {
            store,
            clock,
            images,
        }
    }

    /// Categories present in the current window, sorted, with `All` first.
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let slugs = self.store.recent_slugs(cutoff_millis(&*self.clock)).await?;

        let categories: BTreeSet<String> = slugs.iter().map(|slug| category_of(slug)).collect();

        let mut list = Vec::with_capacity(categories.len() + 1);
        list.push(ALL_CATEGORIES.to_string());
        list.extend(categories);
        Ok(list)
    }

    pub async fn fetch_articles<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<Article>> {
        let filter = CategoryFilter::from_selection(selected);
        let articles = self
            .store
            .recent_articles(cutoff_millis(&*self.clock), &filter)
            .await?;

        info!("Loaded {} articles for {:?}", articles.len(), filter);
        Ok(articles)
    }

    pub fn card(&self, article: Article) -> ArticleCard {
        ArticleCard {
            category: category_of(&article.slug),
            image_url: self.images.resolve(article.hero_image_s3_key.as_deref()),
            display_time: format_published_time(article.last_published_at, &*self.clock),
            slug: article.slug,
            headline: article.headline,
            summary: article.summary,
            url: article.url,
            last_published_at: article.last_published_at,
        }
    }

    pub async fn fetch_cards<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<ArticleCard>> {
        let articles = self.fetch_articles(selected).await?;
        Ok(articles.into_iter().map(|a| self.card(a)).collect())
    }
}
