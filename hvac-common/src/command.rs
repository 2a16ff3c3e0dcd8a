use core::fmt::Display;

commands! {
    Temperature => { name: "temperature", code: "SetTem", topic: Some("temperature") },
    Mode => { name: "mode", code: "Mod", topic: Some("mode") },
    FanSpeed => { name: "fanSpeed", code: "WdSpd", topic: Some("fanspeed") },
    /// Registered so its values can be decoded, but deliberately not bound to
    /// any topic. Not every unit in the family has horizontal louvres.
    SwingHor => { name: "swingHor", code: "SwingLfRig", topic: None },
    SwingVert => { name: "swingVert", code: "SwUpDn", topic: Some("swingvert") },
    Power => { name: "power", code: "Pow", topic: Some("power") },
    Health => { name: "health", code: "HealthMode", topic: Some("health") },
    EnergySave => { name: "energySave", code: "SvSt", topic: Some("powersave") },
    Lights => { name: "lights", code: "Lig", topic: Some("lights") },
    Quiet => { name: "quiet", code: "Quiet", topic: Some("quiet") },
    Blow => { name: "blow", code: "Blo", topic: Some("blow") },
    Air => { name: "air", code: "Air", topic: Some("air") },
    Sleep => { name: "sleep", code: "SwhSlp", topic: Some("sleep") },
    Turbo => { name: "turbo", code: "Tur", topic: Some("turbo") },
}

impl Command {
    /// Commands that are bound to a topic pair, in publish order.
    pub fn tracked() -> impl Iterator<Item = Command> {
        Self::ALL.iter().copied().filter(|cmd| cmd.topic().is_some())
    }

    pub fn from_name(name: &str) -> Option<Command> {
        Self::ALL.iter().copied().find(|cmd| cmd.name() == name)
    }

    /// Resolves a topic segment such as `fanspeed` to its command.
    ///
    /// Unbound commands never resolve, even if their name is used as a topic.
    pub fn from_topic(topic: &str) -> Option<Command> {
        Self::tracked().find(|cmd| cmd.topic() == Some(topic))
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single device setter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetterCall {
    pub command: Command,
    pub value: i64,
}

impl SetterCall {
    pub const fn new(command: Command, value: i64) -> Self {
        Self { command, value }
    }
}
