//! Translates between device events and bus messages.
//!
//! The dispatcher keeps no copy of the device state. Every status event is
//! encoded from the snapshot it carries, and inbound mode changes query the
//! device for its current power state.

use hvac_common::{
    CodecError, Command, CompactString, DeviceSnapshot, Direction, PropertyRegistry, SetterCall,
    TopicPrefix, codec,
    mode::{self, ModeTransition},
};

use crate::{Bus, Device, DeviceEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Disconnected,
    Connected,
    /// Every `set` topic has been subscribed to
    Subscribed,
}

pub struct Dispatcher<B, D> {
    registry: PropertyRegistry,
    prefix: TopicPrefix,
    bus: B,
    device: D,
    state: BridgeState,
}

impl<B: Bus, D: Device> Dispatcher<B, D> {
    pub fn new(registry: PropertyRegistry, prefix: TopicPrefix, bus: B, device: D) -> Self {
        Self { registry, prefix, bus, device, state: BridgeState::Disconnected }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Connected => self.on_connected(),
            DeviceEvent::Status(snapshot) => {
                self.publish_status(&snapshot);
            }
            DeviceEvent::Update(name) => {
                tracing::debug!(device = %name, "Status updated");
            }
            DeviceEvent::Disconnected => {
                tracing::warn!("Device disconnected");
                self.state = BridgeState::Disconnected;
            }
        }
    }

    fn on_connected(&mut self) {
        tracing::info!("Device connected");
        self.state = BridgeState::Connected;

        for command in Command::tracked() {
            if let Some(topic) = self.prefix.command_topic(command, Direction::Set) {
                self.bus.subscribe(&topic);
            }
        }

        self.state = BridgeState::Subscribed;
    }

    /// Publishes every tracked property and returns how many were published.
    ///
    /// A property that cannot be encoded is skipped for this cycle only.
    pub fn publish_status(&self, snapshot: &DeviceSnapshot) -> usize {
        let mut published = 0;

        for command in Command::tracked() {
            let Some(topic) = self.prefix.command_topic(command, Direction::Get) else {
                continue;
            };

            match self.encode(command, snapshot) {
                Ok(payload) => {
                    self.bus.publish(&topic, &payload);
                    published += 1;
                }
                Err(e) => tracing::warn!(%topic, "Not publishing: {e}"),
            }
        }

        published
    }

    fn encode(
        &self,
        command: Command,
        snapshot: &DeviceSnapshot,
    ) -> Result<CompactString, CodecError> {
        match command {
            Command::Mode => mode::resolve(&self.registry, snapshot),
            command => codec::encode(self.registry.get(command), snapshot),
        }
    }

    /// Applies an inbound bus message, returning the setter calls issued.
    pub fn handle_message(&self, topic: &str, payload: &str) -> Vec<SetterCall> {
        tracing::info!("Message \"{payload}\" received for {topic}");

        let command = match self.prefix.parse(topic) {
            Ok(property) if property.direction == Direction::Set => {
                Command::from_topic(property.property)
            }
            Ok(_) => None,
            Err(reason) => {
                tracing::debug!(%topic, "Unexpected topic shape: {reason}");
                None
            }
        };

        let Some(command) = command else {
            tracing::info!("No handler for topic {topic}");
            return vec![];
        };

        let calls = match self.plan(command, payload) {
            Ok(calls) => calls,
            Err(e) => {
                tracing::warn!(%topic, "Dropping message: {e}");
                return vec![];
            }
        };

        for call in &calls {
            tracing::debug!(command = %call.command, value = call.value, "Calling device setter");
            self.device.set(call.command, call.value);
        }

        calls
    }

    fn plan(&self, command: Command, payload: &str) -> Result<Vec<SetterCall>, CodecError> {
        match command {
            Command::Mode => {
                let snapshot = self.device.snapshot();
                let transition = ModeTransition::plan(&self.registry, &snapshot, payload)?;
                Ok(transition.setter_calls().collect())
            }
            command => {
                let value = codec::decode(self.registry.get(command), payload)?;
                Ok(vec![SetterCall::new(command, value)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PREFIX, dispatcher, heating_snapshot};

    const TRACKED: usize = 13;

    fn set_topic(property: &str) -> String {
        format!("{PREFIX}/{property}/set")
    }

    #[test]
    fn connect_subscribes_to_every_set_topic() {
        let mut bridge = dispatcher(heating_snapshot());
        assert_eq!(bridge.state(), BridgeState::Disconnected);

        bridge.handle_device_event(DeviceEvent::Connected);

        assert_eq!(bridge.state(), BridgeState::Subscribed);
        assert_eq!(bridge.bus().subscribed(), [
            "temperature",
            "mode",
            "fanspeed",
            "swingvert",
            "power",
            "health",
            "powersave",
            "lights",
            "quiet",
            "blow",
            "air",
            "sleep",
            "turbo",
        ]
        .map(set_topic));
        assert!(bridge.bus().published().is_empty());
    }

    #[test]
    fn disconnect_resets_state() {
        let mut bridge = dispatcher(heating_snapshot());

        bridge.handle_device_event(DeviceEvent::Connected);
        bridge.handle_device_event(DeviceEvent::Update("living room".to_owned()));
        assert_eq!(bridge.state(), BridgeState::Subscribed);

        bridge.handle_device_event(DeviceEvent::Disconnected);
        assert_eq!(bridge.state(), BridgeState::Disconnected);
    }

    #[test]
    fn status_publishes_every_tracked_property() {
        let mut bridge = dispatcher(heating_snapshot());

        bridge.handle_device_event(DeviceEvent::Status(heating_snapshot()));

        let bus = bridge.bus();
        assert_eq!(bus.published().len(), TRACKED);
        assert_eq!(bus.published_to("temperature").unwrap(), "24");
        assert_eq!(bus.published_to("mode").unwrap(), "heat");
        assert_eq!(bus.published_to("fanspeed").unwrap(), "high");
        assert_eq!(bus.published_to("swingvert").unwrap(), "full");
        assert_eq!(bus.published_to("power").unwrap(), "on");
        assert_eq!(bus.published_to("powersave").unwrap(), "off");
        assert_eq!(bus.published_to("quiet").unwrap(), "mode2");
        assert_eq!(bus.published_to("air").unwrap(), "inside");
        assert_eq!(bus.published_to("swinghor"), None);
        assert!(bus.subscribed().is_empty());
    }

    #[test]
    fn unmapped_value_only_skips_its_own_topic() {
        let bridge = dispatcher(heating_snapshot());

        let mut snapshot = heating_snapshot();
        snapshot.insert("WdSpd", 17);

        assert_eq!(bridge.publish_status(&snapshot), TRACKED - 1);
        assert_eq!(bridge.bus().published().len(), TRACKED - 1);
        assert_eq!(bridge.bus().published_to("fanspeed"), None);
        assert_eq!(bridge.bus().published_to("turbo").unwrap(), "off");
    }

    #[test]
    fn powered_off_unit_publishes_off_mode() {
        let bridge = dispatcher(heating_snapshot());

        for mode in 0..=4 {
            let mut snapshot = heating_snapshot();
            snapshot.insert("Pow", 0);
            snapshot.insert("Mod", mode);

            assert_eq!(bridge.publish_status(&snapshot), TRACKED);
            assert_eq!(bridge.bus().published_to("mode").unwrap(), "off");
            assert_eq!(bridge.bus().published_to("power").unwrap(), "off");
        }
    }

    #[test]
    fn mode_on_powered_off_unit_powers_on_first() {
        let mut snapshot = heating_snapshot();
        snapshot.insert("Pow", 0);
        let bridge = dispatcher(snapshot);

        for _ in 0..100 {
            bridge.handle_message(&set_topic("mode"), "heat");
        }

        let calls = bridge.device().calls();
        assert_eq!(calls.len(), 200);
        for pair in calls.chunks(2) {
            assert_eq!(pair, [
                SetterCall::new(Command::Power, 1),
                SetterCall::new(Command::Mode, 4),
            ]);
        }
    }

    #[test]
    fn mode_on_powered_on_unit_only_sets_mode() {
        let bridge = dispatcher(heating_snapshot());

        let calls = bridge.handle_message(&set_topic("mode"), "cool");

        assert_eq!(calls, [SetterCall::new(Command::Mode, 1)]);
        assert_eq!(bridge.device().calls(), calls);
    }

    #[test]
    fn off_mode_only_powers_off() {
        for (power, mode) in [(1, 4), (1, 0), (0, 1)] {
            let mut snapshot = heating_snapshot();
            snapshot.insert("Pow", power);
            snapshot.insert("Mod", mode);
            let bridge = dispatcher(snapshot);

            bridge.handle_message(&set_topic("mode"), "off");

            assert_eq!(bridge.device().calls(), [SetterCall::new(Command::Power, 0)]);
        }
    }

    #[test]
    fn unknown_mode_is_dropped() {
        let mut snapshot = heating_snapshot();
        snapshot.insert("Pow", 0);
        let bridge = dispatcher(snapshot);

        assert!(bridge.handle_message(&set_topic("mode"), "warm").is_empty());
        assert!(bridge.device().calls().is_empty());
    }

    #[test]
    fn temperature_messages() {
        let bridge = dispatcher(heating_snapshot());

        assert_eq!(bridge.handle_message(&set_topic("temperature"), "21"), [
            SetterCall::new(Command::Temperature, 21)
        ]);
        assert!(bridge.handle_message(&set_topic("temperature"), "abc").is_empty());

        assert_eq!(bridge.device().calls(), [SetterCall::new(Command::Temperature, 21)]);
    }

    #[test]
    fn enumerated_messages() {
        let bridge = dispatcher(heating_snapshot());

        bridge.handle_message(&set_topic("fanspeed"), "mediumLow");
        bridge.handle_message(&set_topic("powersave"), "on");
        bridge.handle_message(&set_topic("swingvert"), "swingMid");
        bridge.handle_message(&set_topic("power"), "off");
        bridge.handle_message(&set_topic("lights"), "dim");

        assert_eq!(bridge.device().calls(), [
            SetterCall::new(Command::FanSpeed, 2),
            SetterCall::new(Command::EnergySave, 1),
            SetterCall::new(Command::SwingVert, 9),
            SetterCall::new(Command::Power, 0),
        ]);
    }

    #[test]
    fn unrecognised_topics_are_ignored() {
        let bridge = dispatcher(heating_snapshot());

        for topic in [
            set_topic("unknown"),
            set_topic("swinghor"),
            set_topic("swingHor"),
            format!("{PREFIX}/mode/get"),
            format!("{PREFIX}/mode"),
            "elsewhere/mode/set".to_owned(),
        ] {
            assert!(bridge.handle_message(&topic, "on").is_empty(), "{topic}");
        }

        assert!(bridge.device().calls().is_empty());
        assert!(bridge.bus().published().is_empty());
    }
}
