//! Scheduler (spec §4.6): the fixed-interval driver. Each cycle
//! enumerates `Registry ∩ locationsInUse()`, dispatches one job per
//! location onto a bounded worker pool, and upserts at most one
//! `LocationConditions` row per location. Per-location mutual exclusion
//! forbids a new cycle from overlapping a job still in flight for the
//! same location (spec §4.6, §5).

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::adapters;
use crate::fetcher::Fetcher;
use crate::models::PartialConditions;
use crate::normalizer;
use crate::registry::Registry;
use crate::repository::Repository;

pub struct Scheduler {
    registry: Arc<Registry>,
    repository: Arc<Repository>,
    fetcher: Arc<Fetcher>,
    cycle_interval: Duration,
    max_concurrent: usize,
    in_flight: Arc<Mutex<HashSet<String>>>,
    shutting_down: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<Registry>,
        repository: Arc<Repository>,
        fetcher: Arc<Fetcher>,
        cycle_interval: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            registry,
            repository,
            fetcher,
            cycle_interval,
            max_concurrent,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cooperative shutdown signal: in-flight jobs stop starting new
    /// fetches, but a job already in its persist phase runs to
    /// completion (spec §5).
    pub fn request_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.cycle_interval);
        loop {
            interval.tick().await;
            if self.shutting_down.load(Ordering::SeqCst) {
                info!("scheduler shutting down, skipping further cycles");
                return;
            }
            self.clone().run_cycle().await;
        }
    }

    async fn run_cycle(self: Arc<Self>) {
        let in_use = match self.repository.locations_in_use().await {
            Ok(names) => names,
            Err(e) => {
                error!(error = %e, "failed to read locations in use, skipping cycle");
                return;
            }
        };

        let active: Vec<String> = self
            .registry
            .active_locations(&in_use)
            .into_iter()
            .map(|loc| loc.name.clone())
            .collect();

        info!(count = active.len(), "starting ingestion cycle");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::new();

        for name in active {
            let already_running = {
                let mut in_flight = self.in_flight.lock().await;
                !in_flight.insert(name.clone())
            };
            if already_running {
                warn!(location = %name, "prior job still in flight, skipping this cycle");
                continue;
            }

            let this = self.clone();
            let semaphore = semaphore.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore not closed");
                this.run_location_job(&name).await;
                this.in_flight.lock().await.remove(&name);
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }

    /// State machine: Idle -> Fetching -> Normalizing -> Persisting ->
    /// Idle. `NoPrimaryNoFallback` loops back to Idle without writing
    /// (spec §4.6).
    async fn run_location_job(&self, name: &str) {
        let Some(location) = self.registry.get(name) else {
            return;
        };

        if self.shutting_down.load(Ordering::SeqCst) {
            info!(location = %name, "shutdown in progress, not starting new job");
            return;
        }

        let mut partials: Vec<PartialConditions> = Vec::new();

        // Fetching: waves, then wind, each in strict priority order,
        // stopping a class early once its required field is satisfied.
        self.fetch_class(&location.wave_urls, &mut partials, |p| p.wave_height_m.is_some())
            .await;
        self.fetch_class(&location.wind_urls, &mut partials, |p| p.wind_speed_mps.is_some())
            .await;

        // Normalizing.
        let conditions = match normalizer::normalize(&partials) {
            Ok(c) => c,
            Err(e) => {
                warn!(location = %name, error = %e, "normalization insufficient, keeping prior row");
                return;
            }
        };

        // Persisting: once started, runs to completion even mid-shutdown.
        if let Err(e) = self.repository.write_location_conditions(name, &conditions).await {
            error!(location = %name, error = %e, "failed to persist location conditions");
        } else {
            info!(location = %name, "wrote location conditions");
        }
    }

    async fn fetch_class(
        &self,
        urls: &[String],
        partials: &mut Vec<PartialConditions>,
        satisfied: impl Fn(&PartialConditions) -> bool,
    ) {
        for url in urls {
            if self.shutting_down.load(Ordering::SeqCst) {
                return;
            }
            match self.fetcher.fetch(url).await {
                Ok(resp) => match adapters::parse(url, &resp.body, chrono::Utc::now()) {
                    Ok(partial) => {
                        let done = satisfied(&partial);
                        partials.push(partial);
                        if done {
                            return;
                        }
                    }
                    Err(e) => warn!(url, error = %e, "adapter failed for this source"),
                },
                Err(e) => warn!(url, error = %e, "fetch failed for this source"),
            }
        }
    }
}
