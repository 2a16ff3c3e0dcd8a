//! In-memory stand-in for a climate control unit.
//!
//! Setter calls are applied to the held snapshot immediately, followed by an
//! `Update` and a `Status` event, the same sequence a real unit produces when
//! it acknowledges a command. A status event is also sent on every polling
//! tick.

use std::{path::Path, sync::Arc, time::Duration};

use hvac_common::{Command, DeviceSnapshot, PropertyRegistry};
use tokio::sync::{
    mpsc::{UnboundedReceiver, UnboundedSender},
    watch,
};

use crate::{Device, DeviceEvent, Result};

#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    state: watch::Sender<DeviceSnapshot>,
    events: UnboundedSender<DeviceEvent>,
}

impl SimulatedDevice {
    /// Connects to the simulated unit and starts polling it.
    ///
    /// `Connected` and a first `Status` are queued before this returns.
    pub fn start(
        name: impl Into<String>,
        initial: DeviceSnapshot,
        poll_interval: Duration,
    ) -> (Self, UnboundedReceiver<DeviceEvent>) {
        let (events, rx) = tokio::sync::mpsc::unbounded_channel();
        let (state, _) = watch::channel(initial);

        let device = Self { inner: Arc::new(Inner { name: name.into(), state, events }) };

        tracing::info!(device = %device.inner.name, "Connected to simulated unit");
        device.emit(DeviceEvent::Connected);
        device.emit(DeviceEvent::Status(device.snapshot()));

        tokio::spawn({
            let device = device.clone();

            async move {
                let start = tokio::time::Instant::now() + poll_interval;
                let mut interval = tokio::time::interval_at(start, poll_interval);

                loop {
                    interval.tick().await;

                    if !device.emit(DeviceEvent::Status(device.snapshot())) {
                        break;
                    }
                }
            }
        });

        (device, rx)
    }

    /// Returns `false` once nobody is listening for events.
    fn emit(&self, event: DeviceEvent) -> bool {
        self.inner.events.send(event).is_ok()
    }
}

impl Device for SimulatedDevice {
    fn snapshot(&self) -> DeviceSnapshot {
        self.inner.state.borrow().clone()
    }

    fn set(&self, command: Command, value: i64) {
        tracing::info!(device = %self.inner.name, %command, value, "Applying command");

        self.inner.state.send_modify(|snapshot| {
            snapshot.insert(command.code(), value);
        });

        self.emit(DeviceEvent::Update(self.inner.name.clone()));
        self.emit(DeviceEvent::Status(self.snapshot()));
    }
}

/// Snapshot of a unit that is switched off in cooling mode at 24 degrees,
/// with every other property at its first registered value.
pub fn default_snapshot(registry: &PropertyRegistry) -> DeviceSnapshot {
    registry
        .iter()
        .map(|def| {
            let value = match def.command {
                Command::Temperature => 24,
                Command::Mode => 1,
                _ => def
                    .value_map()
                    .and_then(|map| map.iter().next())
                    .map_or(0, |(_, value)| value),
            };

            (def.code(), value)
        })
        .collect()
}

/// Reads a JSON object of property code to raw value.
pub fn load_snapshot(path: &Path) -> Result<DeviceSnapshot> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
