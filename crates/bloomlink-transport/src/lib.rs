//! Bluetooth RFCOMM serial transport for bloomlink.
//!
//! Provides device addressing, bonded-device discovery against the BlueZ
//! persistent store, and a blocking duplex [`SerialStream`] over an RFCOMM
//! socket. Discovery and connection are separate concerns: callers resolve a
//! [`BtAddr`] first (by name match or fallback), then open the stream.

pub mod addr;
pub mod discovery;
pub mod error;
pub mod rfcomm;
pub mod stream;

pub use addr::{BtAddr, FALLBACK_DEVICE, SERIAL_PORT_UUID};
pub use discovery::{select_device, BluezRegistry, BondedDevice, DeviceRegistry};
pub use error::{Result, TransportError};
pub use rfcomm::{rfcomm_connect, DEFAULT_RFCOMM_CHANNEL};
pub use stream::SerialStream;
