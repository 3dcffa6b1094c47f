//! Field names observed in device telemetry records.
//!
//! The protocol layer treats every value as an opaque string; these names
//! exist so consumers and the typed views on [`Record`](crate::Record) agree
//! on spelling.

/// Day/night state machine position: `DAYTIME`, `NIGHTTIME`, `TIME_UNSET`.
pub const STATE: &str = "state";

/// Device wall-clock time as reported by the controller.
pub const CURRENT_TIME: &str = "current_time";

/// Accumulated darkness history counter.
pub const DARK_HISTORY: &str = "dark_history";

/// Grow-light relay state: `"1"` on, `"0"` off.
pub const LIGHT_ON: &str = "light_on";

/// Raw photoresistor reading.
pub const LIGHT_LEVEL: &str = "light_level";
