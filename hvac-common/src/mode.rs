//! The synthetic `off` mode.
//!
//! The device only has a meaningful mode while it is powered on. On the bus,
//! power and mode are folded into one value where `off` means "powered off".
//!
//! Selecting a mode on a unit that is off powers it on first. The unit is
//! assumed to ignore mode changes while it is off, so the power call always
//! precedes the mode call.

use compact_str::CompactString;

use crate::{Command, DeviceSnapshot, PropertyRegistry, SetterCall, codec, codec::CodecError};

/// Mode value published while the unit is powered off.
pub const OFF: &str = "off";

const POWER_ON: &str = "on";
const POWER_OFF: &str = "off";

/// Mode as published on the bus for the given snapshot.
pub fn resolve(
    registry: &PropertyRegistry,
    snapshot: &DeviceSnapshot,
) -> Result<CompactString, CodecError> {
    if is_powered_on(registry, snapshot)? {
        codec::encode(registry.get(Command::Mode), snapshot)
    } else {
        Ok(CompactString::const_new(OFF))
    }
}

/// Anything other than the "on" encoding, including a missing value, counts as off.
fn is_powered_on(
    registry: &PropertyRegistry,
    snapshot: &DeviceSnapshot,
) -> Result<bool, CodecError> {
    let power = registry.get(Command::Power);
    let on = codec::decode(power, POWER_ON)?;

    Ok(snapshot.get(power.code()) == Some(on))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Power the unit off, leaving its mode untouched
    PowerOff { power: i64 },
    /// Select a mode, powering the unit on first if it is off
    Select { power_on: Option<i64>, mode: i64 },
}

impl ModeTransition {
    /// Works out the setter calls needed to apply an inbound mode payload.
    pub fn plan(
        registry: &PropertyRegistry,
        snapshot: &DeviceSnapshot,
        payload: &str,
    ) -> Result<Self, CodecError> {
        let power = registry.get(Command::Power);

        if payload.trim() == OFF {
            return Ok(ModeTransition::PowerOff { power: codec::decode(power, POWER_OFF)? });
        }

        let mode = codec::decode(registry.get(Command::Mode), payload)?;

        let power_on = match is_powered_on(registry, snapshot)? {
            true => None,
            false => Some(codec::decode(power, POWER_ON)?),
        };

        Ok(ModeTransition::Select { power_on, mode })
    }

    /// Setter calls in the order they must be issued.
    pub fn setter_calls(self) -> impl Iterator<Item = SetterCall> {
        let (first, second) = match self {
            ModeTransition::PowerOff { power } => {
                (Some(SetterCall::new(Command::Power, power)), None)
            }
            ModeTransition::Select { power_on, mode } => (
                power_on.map(|on| SetterCall::new(Command::Power, on)),
                Some(SetterCall::new(Command::Mode, mode)),
            ),
        };

        first.into_iter().chain(second)
    }
}
