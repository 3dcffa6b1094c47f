use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::addr::BtAddr;
use crate::error::Result;

/// A device previously paired with the local adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondedDevice {
    /// Human-readable device name; empty when the stack recorded none.
    pub name: String,
    /// Hardware address.
    pub addr: BtAddr,
}

/// Source of bonded-device information.
///
/// The seam between device selection and the platform Bluetooth stack; tests
/// substitute a fixed list.
pub trait DeviceRegistry {
    /// Enumerate devices bonded with the local adapter.
    fn bonded_devices(&self) -> Result<Vec<BondedDevice>>;
}

/// Select the first device whose name contains `pattern`, case-insensitively.
pub fn select_device(devices: &[BondedDevice], pattern: &str) -> Option<BtAddr> {
    let pattern = pattern.to_lowercase();
    devices
        .iter()
        .find(|device| device.name.to_lowercase().contains(&pattern))
        .map(|device| device.addr)
}

/// Bonded-device registry backed by the BlueZ persistent store.
///
/// BlueZ keeps one directory per adapter under `/var/lib/bluetooth`, with one
/// subdirectory per bonded device (named by hardware address) containing an
/// `info` file whose `[General]` section records the device name. Reading the
/// store directly avoids a daemon round-trip; it requires read access to the
/// store, which interactive sessions on the target hardware have.
pub struct BluezRegistry {
    root: PathBuf,
}

impl BluezRegistry {
    /// Default BlueZ storage root.
    pub const DEFAULT_ROOT: &'static str = "/var/lib/bluetooth";

    /// Registry over the system store.
    pub fn new() -> Self {
        Self::with_root(Self::DEFAULT_ROOT)
    }

    /// Registry over an explicit store root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root this registry reads.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for BluezRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry for BluezRegistry {
    fn bonded_devices(&self) -> Result<Vec<BondedDevice>> {
        let mut devices = Vec::new();

        for adapter_entry in std::fs::read_dir(&self.root)? {
            let adapter_dir = match adapter_entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable adapter entry");
                    continue;
                }
            };
            if !is_addr_dir(&adapter_dir) {
                continue;
            }

            let device_entries = match std::fs::read_dir(&adapter_dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(adapter = ?adapter_dir, error = %err, "skipping unreadable adapter");
                    continue;
                }
            };

            for device_entry in device_entries {
                let device_dir = match device_entry {
                    Ok(entry) => entry.path(),
                    Err(err) => {
                        warn!(error = %err, "skipping unreadable device entry");
                        continue;
                    }
                };
                let Some(addr) = dir_addr(&device_dir) else {
                    continue;
                };

                let name = match std::fs::read_to_string(device_dir.join("info")) {
                    Ok(contents) => parse_device_name(&contents).unwrap_or_default(),
                    Err(err) => {
                        warn!(device = %addr, error = %err, "bonded device without readable info");
                        String::new()
                    }
                };

                debug!(device = %addr, name = %name, "found bonded device");
                devices.push(BondedDevice { name, addr });
            }
        }

        Ok(devices)
    }
}

fn is_addr_dir(path: &Path) -> bool {
    dir_addr(path).is_some()
}

fn dir_addr(path: &Path) -> Option<BtAddr> {
    if !path.is_dir() {
        return None;
    }
    path.file_name()?.to_str()?.parse().ok()
}

/// Extract `Name=` from the `[General]` section of a BlueZ `info` file.
fn parse_device_name(contents: &str) -> Option<String> {
    let mut in_general = false;
    for line in contents.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_general = line == "[General]";
            continue;
        }
        if in_general {
            if let Some(name) = line.strip_prefix("Name=") {
                return Some(name.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, addr: &str) -> BondedDevice {
        BondedDevice {
            name: name.to_string(),
            addr: addr.parse().unwrap(),
        }
    }

    #[test]
    fn select_matches_substring_case_insensitively() {
        let devices = vec![
            device("Headset", "11:22:33:44:55:66"),
            device("FireFly-A752", "00:06:66:03:A7:52"),
            device("firefly-spare", "00:06:66:03:A7:53"),
        ];

        let selected = select_device(&devices, "firefly").unwrap();
        assert_eq!(selected, "00:06:66:03:A7:52".parse().unwrap());
    }

    #[test]
    fn select_returns_none_without_match() {
        let devices = vec![device("Headset", "11:22:33:44:55:66")];
        assert!(select_device(&devices, "firefly").is_none());
        assert!(select_device(&[], "firefly").is_none());
    }

    #[test]
    fn nameless_devices_never_match() {
        let devices = vec![device("", "11:22:33:44:55:66")];
        assert!(select_device(&devices, "firefly").is_none());
    }

    #[test]
    fn parse_name_from_general_section() {
        let contents = "[General]\nName=FireFly-A752\nClass=0x001f00\n";
        assert_eq!(parse_device_name(contents).as_deref(), Some("FireFly-A752"));
    }

    #[test]
    fn parse_name_ignores_other_sections() {
        let contents = "[LinkKey]\nName=NotTheName\n[General]\nAppearance=0x03c0\n";
        assert_eq!(parse_device_name(contents), None);
    }

    #[test]
    fn bluez_registry_walks_store() {
        let root = std::env::temp_dir().join(format!("bloomlink-bluez-{}", std::process::id()));
        let adapter = root.join("AA:BB:CC:DD:EE:FF");
        let bonded = adapter.join("00:06:66:03:A7:52");
        let ignored = adapter.join("cache");
        std::fs::create_dir_all(&bonded).unwrap();
        std::fs::create_dir_all(&ignored).unwrap();
        std::fs::write(bonded.join("info"), "[General]\nName=FireFly-A752\n").unwrap();

        let registry = BluezRegistry::with_root(&root);
        let devices = registry.bonded_devices().unwrap();

        assert_eq!(
            devices,
            vec![device("FireFly-A752", "00:06:66:03:A7:52")]
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn bluez_registry_keeps_nameless_devices() {
        let root =
            std::env::temp_dir().join(format!("bloomlink-bluez-noname-{}", std::process::id()));
        let bonded = root.join("AA:BB:CC:DD:EE:FF").join("11:22:33:44:55:66");
        std::fs::create_dir_all(&bonded).unwrap();

        let registry = BluezRegistry::with_root(&root);
        let devices = registry.bonded_devices().unwrap();

        assert_eq!(devices, vec![device("", "11:22:33:44:55:66")]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn bluez_registry_missing_root_errors() {
        let registry = BluezRegistry::with_root("/nonexistent/bloomlink-test-root");
        assert!(registry.bonded_devices().is_err());
    }
}
