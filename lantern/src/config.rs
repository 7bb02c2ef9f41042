//! Manager configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Default grace period before a pending animation is force-completed.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default buffer size of each signal hub channel.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 64;

/// Configuration for an [`OverlayManager`](crate::OverlayManager).
///
/// Can be built in code or loaded from JSON:
///
/// ```ignore
/// let config = ManagerConfig::from_json(r#"{ "transition_timeout_ms": 250 }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// How long to wait for an animation-complete signal before advancing anyway.
    #[serde(
        rename = "transition_timeout_ms",
        deserialize_with = "deserialize_millis"
    )]
    pub transition_timeout: Duration,

    /// Skip the animator entirely; every transition completes immediately.
    pub reduce_motion: bool,

    /// Buffer size of each signal hub channel.
    pub signal_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            transition_timeout: DEFAULT_TRANSITION_TIMEOUT,
            reduce_motion: false,
            signal_capacity: DEFAULT_SIGNAL_CAPACITY,
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the animation grace period.
    pub fn transition_timeout(mut self, timeout: Duration) -> Self {
        self.transition_timeout = timeout;
        self
    }

    /// Enable or disable reduced motion.
    pub fn reduce_motion(mut self, enabled: bool) -> Self {
        self.reduce_motion = enabled;
        self
    }

    /// Set the signal hub channel capacity (minimum 1).
    pub fn signal_capacity(mut self, capacity: usize) -> Self {
        self.signal_capacity = capacity.max(1);
        self
    }
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
