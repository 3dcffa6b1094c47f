use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fields;

/// One decoded telemetry record: a flat string-keyed field set.
///
/// Keys are unique (last write wins) and insertion order carries no meaning.
/// Values are opaque strings at this layer; the typed accessors below are
/// views for the consumer-facing fields and never fail the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

/// Day/night position reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Daytime,
    Nighttime,
    /// The device clock has not been set since power-up.
    TimeUnset,
    /// Anything else, including an absent field.
    Unknown,
}

impl Record {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. A duplicate key overwrites the earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Whether the record carries a field.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record carries no fields at all.
    ///
    /// Empty records are legal wire traffic (a delimiter directly following
    /// another) and are still delivered to the consumer.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The day/night state, [`DeviceState::Unknown`] for anything unexpected.
    pub fn state(&self) -> DeviceState {
        match self.get(fields::STATE) {
            Some("DAYTIME") => DeviceState::Daytime,
            Some("NIGHTTIME") => DeviceState::Nighttime,
            Some("TIME_UNSET") => DeviceState::TimeUnset,
            _ => DeviceState::Unknown,
        }
    }

    /// Grow-light state; `None` when absent or not `"0"`/`"1"`.
    pub fn light_on(&self) -> Option<bool> {
        match self.get(fields::LIGHT_ON) {
            Some("1") => Some(true),
            Some("0") => Some(false),
            _ => None,
        }
    }

    /// Device wall-clock time, verbatim.
    pub fn current_time(&self) -> Option<&str> {
        self.get(fields::CURRENT_TIME)
    }

    /// Darkness history counter, verbatim.
    pub fn dark_history(&self) -> Option<&str> {
        self.get(fields::DARK_HISTORY)
    }

    /// Photoresistor reading, verbatim.
    pub fn light_level(&self) -> Option<&str> {
        self.get(fields::LIGHT_LEVEL)
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_last_write_wins() {
        let mut record = Record::new();
        record.insert("light_level", "100");
        record.insert("light_level", "200");

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("light_level"), Some("200"));
    }

    #[test]
    fn state_view_maps_known_values() {
        let mut record = Record::new();
        assert_eq!(record.state(), DeviceState::Unknown);

        for (raw, expected) in [
            ("DAYTIME", DeviceState::Daytime),
            ("NIGHTTIME", DeviceState::Nighttime),
            ("TIME_UNSET", DeviceState::TimeUnset),
            ("REBOOTING", DeviceState::Unknown),
        ] {
            record.insert(fields::STATE, raw);
            assert_eq!(record.state(), expected, "state {raw:?}");
        }
    }

    #[test]
    fn light_on_view_is_strict() {
        let mut record = Record::new();
        assert_eq!(record.light_on(), None);

        record.insert(fields::LIGHT_ON, "1");
        assert_eq!(record.light_on(), Some(true));
        record.insert(fields::LIGHT_ON, "0");
        assert_eq!(record.light_on(), Some(false));
        record.insert(fields::LIGHT_ON, "yes");
        assert_eq!(record.light_on(), None);
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut record = Record::new();
        record.insert("state", "DAYTIME");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"state": "DAYTIME"}));

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
