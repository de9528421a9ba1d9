//! Telemetry logic.
//! Support logging and metrics.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install a global `tracing` subscriber.
///
/// Reads `RUST_LOG` and falls back to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        eprintln!("tracing subscriber already installed: {err}");
    }
}

/// Describe every metric emitted by the crate.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "warden_login_attempts_total",
        "Login attempts, labelled by outcome."
    );
    metrics::describe_counter!(
        "warden_lockouts_total",
        "Logins refused because the account is locked."
    );
    metrics::describe_counter!(
        "warden_password_resets_total",
        "Password resets, labelled by stage."
    );
    metrics::describe_counter!(
        "warden_past_passwords_pruned_total",
        "Past password records deleted by history pruning."
    );
}

pub(crate) fn record_login_attempt(successful: bool) {
    let outcome = if successful { "success" } else { "failure" };
    metrics::counter!("warden_login_attempts_total", "outcome" => outcome)
        .increment(1);
}

pub(crate) fn record_lockout() {
    metrics::counter!("warden_lockouts_total").increment(1);
}

pub(crate) fn record_password_reset(stage: &'static str) {
    metrics::counter!("warden_password_resets_total", "stage" => stage)
        .increment(1);
}

pub(crate) fn record_pruned(count: u64) {
    metrics::counter!("warden_past_passwords_pruned_total").increment(count);
}
