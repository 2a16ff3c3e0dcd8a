use hvac_common::{Command, DeviceSnapshot};

/// Connection to a climate control unit.
///
/// Setter calls are fire-and-forget: they return once the command has been
/// handed to the transport, not when the unit has applied it.
pub trait Device {
    /// Latest raw property map reported by the unit.
    fn snapshot(&self) -> DeviceSnapshot;

    fn set(&self, command: Command, value: i64);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The unit has accepted the connection
    Connected,
    /// Full raw property map, sent every polling cycle
    Status(DeviceSnapshot),
    /// The unit acknowledged a change; carries its name
    Update(String),
    /// The transport lost the unit
    Disconnected,
}
