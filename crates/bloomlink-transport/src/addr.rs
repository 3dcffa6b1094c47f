use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Well-known serial-port service class identifier (SPP).
///
/// The device side advertises its serial channel under this UUID. Kept as a
/// protocol constant; see DESIGN.md for how the channel is resolved.
pub const SERIAL_PORT_UUID: &str = "00001101-0000-1000-8000-00805F9B34FB";

/// Hardware address of the known serial adapter, used when no bonded device
/// matches the expected name pattern.
pub const FALLBACK_DEVICE: BtAddr = BtAddr::new([0x00, 0x06, 0x66, 0x03, 0xA7, 0x52]);

/// A six-octet Bluetooth hardware address.
///
/// Octets are stored in display order (`00:06:66:03:A7:52` is
/// `[0x00, 0x06, 0x66, 0x03, 0xA7, 0x52]`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BtAddr([u8; 6]);

impl BtAddr {
    /// Create an address from octets in display order.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The octets in display order.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for BtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for BtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BtAddr({self})")
    }
}

impl FromStr for BtAddr {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in &mut octets {
            let part = parts
                .next()
                .ok_or_else(|| TransportError::InvalidAddress(s.to_string()))?;
            if part.len() != 2 {
                return Err(TransportError::InvalidAddress(s.to_string()));
            }
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| TransportError::InvalidAddress(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(TransportError::InvalidAddress(s.to_string()));
        }
        Ok(Self(octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_roundtrip() {
        let addr: BtAddr = "00:06:66:03:A7:52".parse().unwrap();
        assert_eq!(addr, FALLBACK_DEVICE);
        assert_eq!(addr.to_string(), "00:06:66:03:A7:52");
    }

    #[test]
    fn parse_accepts_lower_case() {
        let addr: BtAddr = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(addr.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in [
            "",
            "00:06:66:03:A7",
            "00:06:66:03:A7:52:11",
            "00-06-66-03-A7-52",
            "0:06:66:03:A7:52",
            "zz:06:66:03:A7:52",
        ] {
            let result = bad.parse::<BtAddr>();
            assert!(
                matches!(result, Err(TransportError::InvalidAddress(_))),
                "expected InvalidAddress for {bad:?}"
            );
        }
    }
}
