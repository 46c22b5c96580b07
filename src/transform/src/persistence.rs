use async_trait::async_trait;
use dashboard_api::dashboard::{Dashboard, SaveError, SavedDashboard, Severity};

use crate::error::TransformError;
use crate::overlay;

/// Storage backend that accepts a complete dashboard document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn save(&self, dashboard: &Dashboard, overwrite: bool)
    -> Result<SavedDashboard, SaveError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SaveDashboardError {
    #[error("Failed to prepare dashboard: {0}")]
    Prepare(#[from] TransformError),
    #[error("Dashboard rejected: {0}")]
    Rejected(#[from] SaveError),
}

/// Rebuild offset overlays, then hand the document to `store`.
pub async fn save_dashboard<S>(
    store: &S,
    dashboard: &Dashboard,
    overwrite: bool,
) -> Result<SavedDashboard, SaveDashboardError>
where
    S: DashboardStore + ?Sized,
{
    let prepared = overlay::prepare_for_save(dashboard)?;

    match store.save(&prepared, overwrite).await {
        Ok(saved) => {
            tracing::info!("Saved dashboard {}", saved.id);
            Ok(saved)
        }
        Err(err) => {
            match err.severity() {
                Severity::Warning => tracing::warn!("{}: {}", err.title(), err.message),
                Severity::Error => tracing::error!("{}: {}", err.title(), err.message),
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dashboard() -> Dashboard {
        serde_json::from_value(json!({
            "with_offset": true,
            "offsets": ["1d"],
            "rows": [{"panels": [{"type": "graph", "targets": [{"query": "A"}]}]}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_receives_prepared_document() {
        let mut store = MockDashboardStore::new();
        store
            .expect_save()
            .withf(|dashboard, overwrite| {
                let targets = &dashboard.rows[0].panels[0].targets;
                *overwrite && targets.len() == 2 && targets[1].auto_created
            })
            .times(1)
            .returning(|_, _| {
                Ok(SavedDashboard {
                    id: "42".to_string(),
                    slug: Some("hosts".to_string()),
                    version: Some(1),
                })
            });

        let saved = save_dashboard(&store, &dashboard(), true).await.unwrap();

        assert_eq!(saved.id, "42");
    }

    #[tokio::test]
    async fn test_store_error_is_returned_unchanged() {
        let mut store = MockDashboardStore::new();
        store
            .expect_save()
            .returning(|_, _| Err(SaveError::new("A dashboard with the same name exists", 412)));

        let err = save_dashboard(&store, &dashboard(), false)
            .await
            .unwrap_err();

        match err {
            SaveDashboardError::Rejected(err) => {
                assert_eq!(err.status, 412);
                assert_eq!(err.severity(), Severity::Warning);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_offset_never_reaches_store() {
        let mut store = MockDashboardStore::new();
        store.expect_save().never();

        let mut doc = dashboard();
        doc.offsets = vec!["soon".to_string()];

        let err = save_dashboard(&store, &doc, false).await.unwrap_err();

        assert!(matches!(
            err,
            SaveDashboardError::Prepare(TransformError::MalformedOffsetSpec(_))
        ));
    }
}
