// Background loops
// Subscription expiry sweep and payment reconciliation

use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::services::{ReconcileReport, SubscriptionService};

/// Spawns both loops; they stop once `shutdown` flips to `true`
pub fn spawn_all(
    service: SubscriptionService,
    sweep_every: Duration,
    reconcile_every: Duration,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let sweep_service = service.clone();
    let sweep = tokio::spawn(run_every(
        "subscription_sweep",
        sweep_every,
        shutdown.clone(),
        move || {
            let service = sweep_service.clone();
            async move {
                let expired = service.expire_lapsed(Utc::now()).await?;
                if expired > 0 {
                    tracing::info!(expired, "expired lapsed subscriptions");
                }
                Ok(())
            }
        },
    ));

    let reconcile = tokio::spawn(run_every(
        "payment_reconcile",
        reconcile_every,
        shutdown,
        move || {
            let service = service.clone();
            async move {
                let report = service.reconcile_payments(Utc::now()).await?;
                if report != ReconcileReport::default() {
                    tracing::info!(
                        activated = report.activated,
                        cancelled = report.cancelled,
                        expired = report.expired,
                        "reconciled pending payments"
                    );
                }
                Ok(())
            }
        },
    ));

    vec![sweep, reconcile]
}

/// Runs `tick` on a fixed interval until shutdown
///
/// A failing tick is logged and the loop carries on.
async fn run_every<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = crate::domain::errors::AppResult<()>>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(job = name, period_secs = period.as_secs(), "background job started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tracing::debug!(job = name, "tick");
                if let Err(e) = tick().await {
                    tracing::error!(job = name, error = %e, "background job tick failed");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::info!(job = name, "background job stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn loop_survives_failures_and_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let handle = tokio::spawn(run_every("test", Duration::from_millis(5), rx, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(crate::domain::errors::AppError::internal("boom"))
            }
        }));

        tokio::time::sleep(Duration::from_millis(40)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();
        assert!(ticks.load(Ordering::SeqCst) >= 2);
    }
}
