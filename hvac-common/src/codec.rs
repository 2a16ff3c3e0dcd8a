//! Translation between device-encoded integers and the text carried on the bus.

use core::num::ParseIntError;

use compact_str::{CompactString, ToCompactString as _};

use crate::{Command, DeviceSnapshot, PropertyDefinition, PropertyKind};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{command}: device reported {value}, which has no symbolic name")]
    UnknownValue { command: Command, value: i64 },
    #[error("{command}: device snapshot has no `{code}` property")]
    MissingValue { command: Command, code: &'static str },
    #[error("{command}: `{symbol}` is not a registered value")]
    UnknownSymbol { command: Command, symbol: CompactString },
    #[error("{command}: `{input}` is not a valid number")]
    MalformedNumber {
        command: Command,
        input: CompactString,
        #[source]
        source: ParseIntError,
    },
}

/// Renders the snapshot's value for `def` as it is published on the bus.
pub fn encode(
    def: &PropertyDefinition,
    snapshot: &DeviceSnapshot,
) -> Result<CompactString, CodecError> {
    let value = snapshot
        .get(def.code())
        .ok_or(CodecError::MissingValue { command: def.command, code: def.code() })?;

    encode_value(def, value)
}

pub fn encode_value(def: &PropertyDefinition, value: i64) -> Result<CompactString, CodecError> {
    match &def.kind {
        PropertyKind::Numeric => Ok(value.to_compact_string()),
        PropertyKind::Enumerated(map) => map
            .symbol(value)
            .map(CompactString::const_new)
            .ok_or(CodecError::UnknownValue { command: def.command, value }),
    }
}

/// Parses a bus payload into the integer the device expects for `def`.
///
/// Surrounding whitespace is ignored; symbols are case sensitive.
pub fn decode(def: &PropertyDefinition, payload: &str) -> Result<i64, CodecError> {
    let payload = payload.trim();

    match &def.kind {
        PropertyKind::Numeric => {
            payload.parse::<i64>().map_err(|source| CodecError::MalformedNumber {
                command: def.command,
                input: payload.into(),
                source,
            })
        }
        PropertyKind::Enumerated(map) => map.value(payload).ok_or_else(|| {
            CodecError::UnknownSymbol { command: def.command, symbol: payload.into() }
        }),
    }
}
