use std::time::Duration;

// Timing knobs for the background reaper. Values come from the service
// configuration layer; tests construct them directly.
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// Pause between reconciliation passes.
    pub tick_interval: Duration,
    /// How long a probed connection has to answer before it counts as silent.
    pub probe_timeout: Duration,
    /// Age past which poison message records are dropped.
    pub poison_retention: Duration,
}
