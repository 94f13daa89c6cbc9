/*!
 # Serial transport discovery

 Finds the sign's USB serial adapter by its human-readable product
 description. Matching is exact string equality against the enumerated
 port list; the first match wins. Ordering of the enumeration is up to
 the OS driver, so callers must not assume it is stable across reloads.
*/

use serialport::{SerialPortInfo, SerialPortType};
use tracing::{debug, error, instrument};

use crate::{Error, Result};

/// Finds the first port in `ports` whose USB product description equals
/// `descriptor`. Pure match over an already-enumerated list, so tests can
/// feed it fake port tables.
pub fn locate(ports: &[SerialPortInfo], descriptor: &str) -> Result<SerialPortInfo> {
    for port in ports {
        if let SerialPortType::UsbPort(usb) = &port.port_type {
            if usb.product.as_deref() == Some(descriptor) {
                debug!("Matched serial device {} ({})", port.port_name, descriptor);
                return Ok(port.clone());
            }
        }
    }
    error!("No serial device matching \"{}\" found", descriptor);
    Err(Error::DeviceNotFound(descriptor.to_string()))
}

/// Enumerates the live serial ports and locates the sign by descriptor
#[instrument]
pub fn discover(descriptor: &str) -> Result<SerialPortInfo> {
    debug!("Enumerating serial ports");
    let ports = serialport::available_ports()
        .map_err(|e| Error::SignCommunication(format!("port enumeration failed: {e}")))?;
    debug!("Found {} serial ports", ports.len());
    locate(&ports, descriptor)
}
