use bloomlink_transport::{
    rfcomm_connect, select_device, BluezRegistry, BtAddr, DeviceRegistry, TransportError,
};
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::event::SessionEvent;
use crate::session::Session;

/// Discover the device and open a session with default configuration.
pub fn connect() -> Result<(Session, Receiver<SessionEvent>)> {
    connect_with_config(&BluezRegistry::new(), &SessionConfig::default())
}

/// Discover the device and open a session with explicit configuration.
///
/// Resolution order: first bonded device whose name matches the configured
/// pattern, then the fallback address, then failure. The connection attempt
/// itself is made once; a handshake failure is returned to the caller
/// without retrying.
pub fn connect_with_config(
    registry: &dyn DeviceRegistry,
    config: &SessionConfig,
) -> Result<(Session, Receiver<SessionEvent>)> {
    let addr = resolve_device(registry, config)?;
    info!(%addr, channel = config.rfcomm_channel, "connecting to garden monitor");
    let stream = rfcomm_connect(addr, config.rfcomm_channel)?;
    Session::spawn(stream, config)
}

fn resolve_device(registry: &dyn DeviceRegistry, config: &SessionConfig) -> Result<BtAddr> {
    let devices = match registry.bonded_devices() {
        Ok(devices) => devices,
        Err(err) => {
            // The fallback address exists precisely for an unhelpful local
            // stack; enumeration failure is not fatal on its own.
            warn!(error = %err, "bonded-device enumeration failed");
            Vec::new()
        }
    };

    if let Some(addr) = select_device(&devices, &config.device_pattern) {
        debug!(%addr, pattern = %config.device_pattern, "matched bonded device");
        return Ok(addr);
    }

    match config.fallback_addr {
        Some(addr) => {
            debug!(%addr, "no bonded device matched; using fallback address");
            Ok(addr)
        }
        None => Err(TransportError::NoDeviceFound.into()),
    }
}

#[cfg(test)]
mod tests {
    use bloomlink_transport::BondedDevice;

    use super::*;
    use crate::error::SessionError;

    struct FixedRegistry(Vec<BondedDevice>);

    impl DeviceRegistry for FixedRegistry {
        fn bonded_devices(&self) -> bloomlink_transport::Result<Vec<BondedDevice>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenRegistry;

    impl DeviceRegistry for BrokenRegistry {
        fn bonded_devices(&self) -> bloomlink_transport::Result<Vec<BondedDevice>> {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into())
        }
    }

    fn device(name: &str, addr: &str) -> BondedDevice {
        BondedDevice {
            name: name.to_string(),
            addr: addr.parse().unwrap(),
        }
    }

    fn config_with_fallback(fallback: Option<&str>) -> SessionConfig {
        SessionConfig {
            fallback_addr: fallback.map(|addr| addr.parse().unwrap()),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn name_match_beats_fallback() {
        let registry = FixedRegistry(vec![
            device("Headset", "11:22:33:44:55:66"),
            device("FireFly-A752", "00:06:66:03:A7:52"),
        ]);
        let config = config_with_fallback(Some("AA:AA:AA:AA:AA:AA"));

        let addr = resolve_device(&registry, &config).unwrap();
        assert_eq!(addr, "00:06:66:03:A7:52".parse().unwrap());
    }

    #[test]
    fn no_match_uses_fallback() {
        let registry = FixedRegistry(vec![device("Headset", "11:22:33:44:55:66")]);
        let config = config_with_fallback(Some("AA:AA:AA:AA:AA:AA"));

        let addr = resolve_device(&registry, &config).unwrap();
        assert_eq!(addr, "AA:AA:AA:AA:AA:AA".parse().unwrap());
    }

    #[test]
    fn no_match_no_fallback_is_no_device_found() {
        let registry = FixedRegistry(Vec::new());
        let config = config_with_fallback(None);

        let err = resolve_device(&registry, &config).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transport(TransportError::NoDeviceFound)
        ));
    }

    #[test]
    fn enumeration_failure_still_reaches_fallback() {
        let config = config_with_fallback(Some("AA:AA:AA:AA:AA:AA"));

        let addr = resolve_device(&BrokenRegistry, &config).unwrap();
        assert_eq!(addr, "AA:AA:AA:AA:AA:AA".parse().unwrap());
    }
}
