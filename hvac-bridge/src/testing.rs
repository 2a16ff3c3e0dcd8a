use std::sync::Mutex;

use hvac_common::{Command, DeviceSnapshot, PropertyRegistry, SetterCall, TopicPrefix};

use crate::{Bus, Device, Dispatcher};

pub const PREFIX: &str = "home/hvac";

#[derive(Debug, Default)]
pub struct RecordingBus {
    pub subscribed: Mutex<Vec<String>>,
    pub published: Mutex<Vec<(String, String)>>,
}

impl RecordingBus {
    pub fn subscribed(&self) -> Vec<String> {
        self.subscribed.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn published_to(&self, property: &str) -> Option<String> {
        let topic = format!("{PREFIX}/{property}/get");

        self.published()
            .into_iter()
            .rev()
            .find_map(|(t, payload)| (t == topic).then_some(payload))
    }
}

impl Bus for RecordingBus {
    fn subscribe(&self, topic: &str) {
        self.subscribed.lock().unwrap().push(topic.to_owned());
    }

    fn publish(&self, topic: &str, payload: &str) {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_owned(), payload.to_owned()));
    }
}

/// Device that records setter calls without applying them.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub snapshot: Mutex<DeviceSnapshot>,
    pub calls: Mutex<Vec<SetterCall>>,
}

impl RecordingDevice {
    pub fn with_snapshot(snapshot: DeviceSnapshot) -> Self {
        Self { snapshot: Mutex::new(snapshot), calls: Mutex::default() }
    }

    pub fn calls(&self) -> Vec<SetterCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Device for RecordingDevice {
    fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn set(&self, command: Command, value: i64) {
        self.calls.lock().unwrap().push(SetterCall::new(command, value));
    }
}

/// Unit powered on, heating to 24 degrees, every property mapped.
pub fn heating_snapshot() -> DeviceSnapshot {
    serde_json::from_value(serde_json::json!({
        "SetTem": 24,
        "Mod": 4,
        "WdSpd": 5,
        "SwingLfRig": 0,
        "SwUpDn": 1,
        "Pow": 1,
        "HealthMode": 0,
        "SvSt": 0,
        "Lig": 1,
        "Quiet": 2,
        "Blo": 0,
        "Air": 1,
        "SwhSlp": 0,
        "Tur": 0,
    }))
    .unwrap()
}

pub fn dispatcher(snapshot: DeviceSnapshot) -> Dispatcher<RecordingBus, RecordingDevice> {
    Dispatcher::new(
        PropertyRegistry::builtin().unwrap(),
        PREFIX.parse::<TopicPrefix>().unwrap(),
        RecordingBus::default(),
        RecordingDevice::with_snapshot(snapshot),
    )
}
