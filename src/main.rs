use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rollcall::report::SessionReport;
use rollcall::{
    AttendanceError, AttendanceHistory, AttendanceWorkflow, Catalog, Clock, Coordinate, ErrorCode, RollcallConfig,
    SessionRegistry, SimulatedLocationProvider, SystemClock, spawn_rotation_task,
};
use tokio::time::Duration;

const DEMO_CLASS: &str = "1";
const DEMO_LOCATION: &str = "40.712800, -74.006000";
const DEMO_CHECK_INS: usize = 8;
const LOCATION_DELAY_MS: u64 = 2000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run(RollcallConfig::from_env()).await {
        tracing::error!(error = %e, code = e.error_code(), "demo session failed");
        std::process::exit(1);
    }
}

/// Run one simulated classroom session end to end.
async fn run(config: RollcallConfig) -> Result<(), AttendanceError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry = SessionRegistry::new(Catalog::demo(), config.session, clock);

    let session = registry.start_session(DEMO_CLASS, DEMO_LOCATION, config.default_radius_meters).await?;
    let rotation = spawn_rotation_task(registry.clone(), config.tick_interval, config.ended_retention);

    let center: Coordinate = DEMO_LOCATION.parse()?;
    let provider = SimulatedLocationProvider::new(center, config.default_radius_meters, StdRng::from_os_rng())?
        .with_delay(Duration::from_millis(LOCATION_DELAY_MS));
    let workflow = AttendanceWorkflow::new(registry.clone(), Arc::new(provider)).with_scan_delay(config.scan_delay);

    let students: Vec<String> = registry
        .catalog()
        .get(DEMO_CLASS)
        .map(|c| c.students.iter().take(DEMO_CHECK_INS).cloned().collect())
        .unwrap_or_default();

    let mut check_ins = Vec::with_capacity(students.len());
    for student_id in students {
        let workflow = workflow.clone();
        let registry = registry.clone();
        let session_id = session.id;
        check_ins.push(tokio::spawn(async move {
            let snapshot = match registry.snapshot(session_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(%student_id, error = %e, "session snapshot unavailable");
                    return;
                }
            };
            let code = snapshot.current_token.unwrap_or_default();
            let mut history = AttendanceHistory::new(config.history_cap);
            match workflow.submit_via_scan(session_id, &student_id, &code, &mut history).await {
                Ok(result) => tracing::info!(
                    %student_id,
                    outcome = ?result.outcome(),
                    message = %result.message,
                    "check-in resolved"
                ),
                Err(e) => tracing::warn!(%student_id, error = %e, "check-in rejected"),
            }
        }));
    }
    for handle in check_ins {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "check-in task failed");
        }
    }

    // Let at least one rotation (and its simulated check-ins) happen.
    tokio::time::sleep(config.tick_interval * config.session.token_ttl_secs).await;
    rotation.abort();

    let summary = registry.end_session(session.id).await?;
    let report = SessionReport::from_summary(&summary);
    match serde_json::to_string(&report) {
        Ok(json) => tracing::info!(report = %json, "session report"),
        Err(e) => tracing::warn!(error = %e, "session report could not be encoded"),
    }
    Ok(())
}
