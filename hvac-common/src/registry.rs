use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};

use crate::Command;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{command}: symbol `{symbol}` is registered twice")]
    DuplicateSymbol { command: Command, symbol: &'static str },
    #[error("{command}: device value {value} is mapped by both `{first}` and `{second}`")]
    DuplicateValue {
        command: Command,
        value: i64,
        first: &'static str,
        second: &'static str,
    },
    #[error("{0} is defined more than once")]
    DuplicateCommand(Command),
    #[error("{0} has no definition")]
    MissingCommand(Command),
}

/// Bijection between the symbolic values of one property and the integers the
/// device uses for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMap {
    by_symbol: BTreeMap<&'static str, i64>,
    by_value: BTreeMap<i64, &'static str>,
}

impl ValueMap {
    pub fn new(
        command: Command,
        entries: &[(&'static str, i64)],
    ) -> Result<Self, RegistryError> {
        let mut by_symbol = BTreeMap::new();
        let mut by_value = BTreeMap::new();

        for &(symbol, value) in entries {
            if by_symbol.insert(symbol, value).is_some() {
                return Err(RegistryError::DuplicateSymbol { command, symbol });
            }

            if let Some(first) = by_value.insert(value, symbol) {
                return Err(RegistryError::DuplicateValue {
                    command,
                    value,
                    first,
                    second: symbol,
                });
            }
        }

        Ok(Self { by_symbol, by_value })
    }

    /// Device value registered for `symbol`.
    pub fn value(&self, symbol: &str) -> Option<i64> {
        self.by_symbol.get(symbol).copied()
    }

    /// Symbolic name registered for a device value.
    pub fn symbol(&self, value: i64) -> Option<&'static str> {
        self.by_value.get(&value).copied()
    }

    /// Entries in device value order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.by_value.iter().map(|(&value, &symbol)| (symbol, value))
    }

    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// Integer passed through unchanged (eg. target temperature)
    Numeric,
    /// One of a fixed set of named values
    Enumerated(ValueMap),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub command: Command,
    pub kind: PropertyKind,
}

impl PropertyDefinition {
    pub fn numeric(command: Command) -> Self {
        Self { command, kind: PropertyKind::Numeric }
    }

    pub fn enumerated(
        command: Command,
        entries: &[(&'static str, i64)],
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            command,
            kind: PropertyKind::Enumerated(ValueMap::new(command, entries)?),
        })
    }

    /// Key of this property in the device's raw property map.
    pub fn code(&self) -> &'static str {
        self.command.code()
    }

    pub fn value_map(&self) -> Option<&ValueMap> {
        match &self.kind {
            PropertyKind::Numeric => None,
            PropertyKind::Enumerated(map) => Some(map),
        }
    }

    /// Reverse lookup. Always `None` for numeric properties.
    pub fn symbol(&self, value: i64) -> Option<&'static str> {
        self.value_map().and_then(|map| map.symbol(value))
    }
}

const ON_OFF: &[(&str, i64)] = &[("off", 0), ("on", 1)];

const TABLES: &[(Command, &[(&str, i64)])] = &[
    (Command::Mode, &[("auto", 0), ("cool", 1), ("dry", 2), ("fan_only", 3), ("heat", 4)]),
    (Command::FanSpeed, &[
        ("auto", 0),
        ("low", 1),
        ("mediumLow", 2),
        ("medium", 3),
        ("mediumHigh", 4),
        ("high", 5),
    ]),
    (Command::SwingHor, &[
        ("default", 0),
        ("full", 1),
        ("fixedLeft", 2),
        ("fixedMidLeft", 3),
        ("fixedMid", 4),
        ("fixedMidRight", 5),
        ("fixedRight", 6),
        ("fullAlt", 7),
    ]),
    (Command::SwingVert, &[
        ("default", 0),
        ("full", 1),
        ("fixedTop", 2),
        ("fixedMidTop", 3),
        ("fixedMid", 4),
        ("fixedMidBottom", 5),
        ("fixedBottom", 6),
        ("swingBottom", 7),
        ("swingMidBottom", 8),
        ("swingMid", 9),
        ("swingMidTop", 10),
        ("swingTop", 11),
    ]),
    (Command::Power, ON_OFF),
    (Command::Health, ON_OFF),
    (Command::EnergySave, ON_OFF),
    (Command::Lights, ON_OFF),
    (Command::Quiet, &[("off", 0), ("mode1", 1), ("mode2", 2), ("mode3", 3)]),
    (Command::Blow, ON_OFF),
    (Command::Air, &[("off", 0), ("inside", 1), ("outside", 2), ("mode3", 3)]),
    (Command::Sleep, ON_OFF),
    (Command::Turbo, ON_OFF),
];

/// Immutable set of property definitions, one per [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRegistry {
    definitions: Box<[PropertyDefinition]>,
}

impl PropertyRegistry {
    /// Registry for the supported unit family.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut definitions = Vec::with_capacity(Command::ALL.len());
        definitions.push(PropertyDefinition::numeric(Command::Temperature));

        for &(command, entries) in TABLES {
            definitions.push(PropertyDefinition::enumerated(command, entries)?);
        }

        Self::from_definitions(definitions)
    }

    /// Builds a registry, requiring exactly one definition per command.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = PropertyDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut slots: Vec<Option<PropertyDefinition>> =
            Command::ALL.iter().map(|_| None).collect();

        for def in definitions {
            let slot = &mut slots[def.command.index()];
            if slot.is_some() {
                return Err(RegistryError::DuplicateCommand(def.command));
            }
            *slot = Some(def);
        }

        let definitions = slots
            .into_iter()
            .zip(Command::ALL)
            .map(|(def, &command)| def.ok_or(RegistryError::MissingCommand(command)))
            .collect::<Result<_, _>>()?;

        Ok(Self { definitions })
    }

    pub fn get(&self, command: Command) -> &PropertyDefinition {
        // every slot is filled by from_definitions
        &self.definitions[command.index()]
    }

    /// Looks up a definition by its command identifier (eg. `fanSpeed`).
    pub fn by_name(&self, name: &str) -> Option<&PropertyDefinition> {
        Command::from_name(name).map(|cmd| self.get(cmd))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.definitions.iter()
    }
}
