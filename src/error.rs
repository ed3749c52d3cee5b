use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by the data-access layer.
///
/// A missing hero image is not represented here; it is a valid `None`.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("missing required database setting `{0}`")]
    ConfigMissing(&'static str),

    #[error("article store unavailable: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("article query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("article query timed out after {0:?}")]
    Timeout(Duration),
}

impl DashboardError {
    /// True when the store could not be reached at all, as opposed to a
    /// query that reached it and failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_names_the_setting() {
        let err = DashboardError::ConfigMissing("db_host");
        assert_eq!(err.to_string(), "missing required database setting `db_host`");
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(DashboardError::Connection(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(DashboardError::Timeout(Duration::from_secs(5)).is_unavailable());
        assert!(!DashboardError::Query(sqlx::Error::RowNotFound).is_unavailable());
        assert!(!DashboardError::ConfigMissing("db_name").is_unavailable());
    }
}
