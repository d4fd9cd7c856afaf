//! Operator bus/route assignment.

use fleetsync_core::{DriverPatch, DriverStore, UserId};

use crate::error::SyncError;
use crate::synchronizer::DriverSynchronizer;

impl<S: DriverStore + ?Sized> DriverSynchronizer<S> {
    /// Set the bus number and route on every driver document for
    /// `driver_id`. Absent values are written as empty strings.
    ///
    /// Fails with [`SyncError::InvalidArgument`] for an empty id and
    /// [`SyncError::NotFound`] when no document matches.
    pub async fn assign(
        &self,
        driver_id: &UserId,
        bus_number: Option<&str>,
        route: Option<&str>,
    ) -> Result<usize, SyncError> {
        if driver_id.is_empty() {
            return Err(SyncError::InvalidArgument(
                "driverId is required".to_string(),
            ));
        }

        let docs = self.store().find_drivers(driver_id).await?;
        if docs.is_empty() {
            return Err(SyncError::NotFound("Driver not found".to_string()));
        }

        let patch = DriverPatch {
            assigned_bus_number: Some(bus_number.unwrap_or_default().to_string()),
            assigned_route: Some(route.unwrap_or_default().to_string()),
            ..DriverPatch::default()
        };
        let written = self.update_all(&docs, &patch).await?;
        tracing::info!(
            driver_id = %driver_id,
            bus = bus_number.unwrap_or_default(),
            route = route.unwrap_or_default(),
            records = written,
            "driver assignment updated"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fleetsync_core::{DriverProfile, InMemoryStore, NewDriver};

    use super::*;

    fn setup() -> (Arc<InMemoryStore>, DriverSynchronizer<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (Arc::clone(&store), DriverSynchronizer::new(store))
    }

    #[tokio::test]
    async fn assign_missing_driver_is_not_found() {
        let (store, sync) = setup();
        let err = sync
            .assign(&UserId::from("u1"), Some("B12"), Some("R7"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)), "got: {err}");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn assign_empty_id_is_invalid() {
        let (_store, sync) = setup();
        let err = sync
            .assign(&UserId::from(""), Some("B12"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument(_)));
        assert!(err.to_string().contains("driverId is required"));
    }

    #[tokio::test]
    async fn assign_defaults_absent_route_to_empty() {
        let (store, sync) = setup();
        let uid = UserId::from("u1");
        sync.ensure_created(&uid, &DriverProfile::default())
            .await
            .unwrap();
        sync.assign(&uid, Some("B12"), Some("R7")).await.unwrap();
        sync.assign(&uid, Some("B14"), None).await.unwrap();

        let docs = store.find_drivers(&uid).await.unwrap();
        assert_eq!(docs[0].record.assigned_bus_number, "B14");
        assert_eq!(docs[0].record.assigned_route, "");
    }

    #[tokio::test]
    async fn assign_writes_every_duplicate() {
        let (store, sync) = setup();
        let uid = UserId::from("u1");
        store
            .insert_raw_driver(NewDriver::active(uid.clone(), DriverProfile::default()))
            .await;
        store
            .insert_raw_driver(NewDriver::active(uid.clone(), DriverProfile::default()))
            .await;

        assert_eq!(sync.assign(&uid, Some("B12"), Some("R7")).await.unwrap(), 2);
        let docs = store.find_drivers(&uid).await.unwrap();
        assert!(docs
            .iter()
            .all(|d| d.record.assigned_bus_number == "B12" && d.record.assigned_route == "R7"));
    }
}
