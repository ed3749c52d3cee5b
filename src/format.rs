//! Display helpers for article cards.

use chrono::DateTime;
use chrono_tz::Asia::Dhaka;

use crate::clock::Clock;

/// Turns relative storage keys into absolute image URLs.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
}

impl ImageResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Appends `key` to the base URL verbatim. `None` means the card is
    /// rendered without an image.
    pub fn resolve(&self, key: Option<&str>) -> Option<String> {
        key.map(|key| format!("{}{}", self.base_url, key))
    }
}

/// Uppercased category prefix of a slug, i.e. everything before the first `/`.
pub fn category_of(slug: &str) -> String {
    slug.split('/').next().unwrap_or_default().to_uppercase()
}

/// Publication time as shown on a card: minutes or hours ago within the last
/// day, otherwise the absolute Dhaka wall-clock time.
pub fn format_published_time(epoch_millis: i64, clock: &dyn Clock) -> String {
    let Some(published) = DateTime::from_timestamp_millis(epoch_millis) else {
        return "unknown".to_string();
    };

    // Timestamps ahead of the clock count as just published.
    let elapsed = (clock.now() - published).num_seconds().max(0);

    if elapsed < 3_600 {
        format!("{} mins ago", elapsed / 60)
    } else if elapsed < 86_400 {
        format!("{} hours ago", elapsed / 3_600)
    } else {
        published
            .with_timezone(&Dhaka)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}
