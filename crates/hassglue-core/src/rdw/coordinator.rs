// ── Vehicle coordinator ──
//
// Polls the vehicle service for one license plate and publishes the
// latest record on a `watch` channel. Entities never call the service
// themselves.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hassglue_api::{RdwClient, Vehicle};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RdwConfig;
use crate::error::CoreError;

/// Where a coordinator gets vehicle records from.
pub trait VehicleSource: Send + Sync + 'static {
    fn fetch(&self, license_plate: &str) -> impl Future<Output = Result<Vehicle, CoreError>> + Send;
}

impl VehicleSource for RdwClient {
    async fn fetch(&self, license_plate: &str) -> Result<Vehicle, CoreError> {
        Ok(self.vehicle(license_plate).await?)
    }
}

/// Shared handle to the polling state of one license plate.
pub struct VehicleCoordinator<S: VehicleSource> {
    inner: Arc<CoordinatorInner<S>>,
}

impl<S: VehicleSource> Clone for VehicleCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<S> {
    source: S,
    license_plate: String,
    scan_interval: Duration,
    data: watch::Sender<Option<Arc<Vehicle>>>,
    last_update_success: AtomicBool,
    /// Running refresh task and the token that stops it. Each `start`
    /// gets a fresh token so the coordinator can be restarted.
    task: Mutex<Option<(JoinHandle<()>, CancellationToken)>>,
}

impl VehicleCoordinator<RdwClient> {
    /// Coordinator backed by the RDW open-data service.
    pub fn from_config(config: &RdwConfig) -> Result<Self, CoreError> {
        let client = RdwClient::new(config.base_url.clone(), &config.transport())?;
        Ok(Self::new(client, &config.license_plate, config.scan_interval))
    }
}

impl<S: VehicleSource> VehicleCoordinator<S> {
    /// Create a coordinator. Does NOT fetch anything: call
    /// [`first_refresh()`](Self::first_refresh) before building entities.
    pub fn new(source: S, license_plate: impl Into<String>, scan_interval: Duration) -> Self {
        let (data, _) = watch::channel(None);
        Self {
            inner: Arc::new(CoordinatorInner {
                source,
                license_plate: license_plate.into(),
                scan_interval,
                data,
                last_update_success: AtomicBool::new(false),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn license_plate(&self) -> &str {
        &self.inner.license_plate
    }

    /// Latest successfully fetched record.
    pub fn data(&self) -> Option<Arc<Vehicle>> {
        self.inner.data.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Vehicle>>> {
        self.inner.data.subscribe()
    }

    /// Whether the most recent refresh succeeded.
    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }

    /// Fetch the vehicle once. On failure the previous record is kept.
    pub async fn refresh(&self) -> Result<Arc<Vehicle>, CoreError> {
        match self.inner.source.fetch(&self.inner.license_plate).await {
            Ok(vehicle) => {
                let vehicle = Arc::new(vehicle);
                self.inner.data.send_replace(Some(Arc::clone(&vehicle)));
                self.inner.last_update_success.store(true, Ordering::Release);
                debug!(license_plate = %self.inner.license_plate, "vehicle data refreshed");
                Ok(vehicle)
            }
            Err(e) => {
                self.inner.last_update_success.store(false, Ordering::Release);
                warn!(
                    license_plate = %self.inner.license_plate,
                    error = %e,
                    "vehicle refresh failed"
                );
                Err(e)
            }
        }
    }

    /// Initial fetch during setup. Errors propagate so setup can be retried.
    pub async fn first_refresh(&self) -> Result<(), CoreError> {
        self.refresh().await.map(|_| ())
    }

    /// Spawn the periodic refresh task. A zero scan interval disables it.
    pub async fn start(&self) {
        if self.inner.scan_interval.is_zero() {
            return;
        }
        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            return;
        }
        info!(
            license_plate = %self.inner.license_plate,
            interval_secs = self.inner.scan_interval.as_secs(),
            "starting vehicle coordinator"
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(refresh_task(
            self.clone(),
            self.inner.scan_interval,
            cancel.clone(),
        ));
        *task = Some((handle, cancel));
    }

    /// Stop the refresh task and wait for it to finish. A later
    /// [`start()`](Self::start) spawns a new task.
    pub async fn shutdown(&self) {
        let running = self.inner.task.lock().await.take();
        if let Some((handle, cancel)) = running {
            cancel.cancel();
            let _ = handle.await;
            info!(license_plate = %self.inner.license_plate, "vehicle coordinator stopped");
        }
    }
}

async fn refresh_task<S: VehicleSource>(
    coordinator: VehicleCoordinator<S>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Failures are logged by `refresh` and retried next tick.
                let _ = coordinator.refresh().await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    /// Returns a vehicle on odd calls and an error on even calls.
    struct FlakySource {
        calls: AtomicUsize,
    }

    impl VehicleSource for FlakySource {
        async fn fetch(&self, license_plate: &str) -> Result<Vehicle, CoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n % 2 == 0 {
                return Err(CoreError::Api {
                    message: "down".into(),
                    status: Some(503),
                });
            }
            Ok(Vehicle {
                license_plate: license_plate.to_owned(),
                brand: "SKODA".into(),
                ..Vehicle::default()
            })
        }
    }

    fn coordinator(interval: Duration) -> VehicleCoordinator<FlakySource> {
        VehicleCoordinator::new(
            FlakySource {
                calls: AtomicUsize::new(0),
            },
            "11ZKZ3",
            interval,
        )
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_data() {
        let coord = coordinator(Duration::ZERO);
        assert!(coord.data().is_none());

        coord.first_refresh().await.unwrap();
        assert!(coord.last_update_success());

        assert!(coord.refresh().await.is_err());
        assert!(!coord.last_update_success());
        assert_eq!(coord.data().unwrap().brand, "SKODA");
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_refreshes_on_interval() {
        let coord = coordinator(Duration::from_secs(3600));
        let mut rx = coord.subscribe();
        coord.start().await;

        tokio::time::sleep(Duration::from_secs(3601)).await;
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        coord.shutdown().await;
        assert_eq!(coord.inner.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_shutdown_resumes_polling() {
        let coord = coordinator(Duration::from_secs(3600));
        coord.start().await;
        coord.shutdown().await;

        let mut rx = coord.subscribe();
        coord.start().await;
        tokio::time::sleep(Duration::from_secs(3601)).await;
        rx.changed().await.unwrap();
        assert_eq!(coord.inner.source.calls.load(Ordering::SeqCst), 1);

        coord.shutdown().await;
        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert_eq!(coord.inner.source.calls.load(Ordering::SeqCst), 1);
    }
}
