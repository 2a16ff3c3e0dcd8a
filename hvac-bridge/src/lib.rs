use core::convert::Infallible;

use hvac_common::RegistryError;
use hvac_mqtt::PublishEvent;
use tokio::sync::mpsc::UnboundedReceiver;

pub mod bus;
pub mod device;
pub mod dispatcher;
pub mod simulated;

#[cfg(test)]
mod testing;

pub use self::{
    bus::{Bus, MqttBus},
    device::{Device, DeviceEvent},
    dispatcher::{BridgeState, Dispatcher},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("mqtt error: {0}")]
    Mqtt(#[from] hvac_mqtt::Error),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("message bus connection closed")]
    BusClosed,
    #[error("device event stream ended")]
    DeviceClosed,
}

/// Feeds bus messages and device events to `dispatcher`, one at a time.
///
/// Only returns when either source fails or closes.
pub async fn run<B: Bus, D: Device>(
    dispatcher: &mut Dispatcher<B, D>,
    messages: &mut UnboundedReceiver<hvac_mqtt::Result<PublishEvent>>,
    device_events: &mut UnboundedReceiver<DeviceEvent>,
) -> Result<Infallible> {
    loop {
        tokio::select! {
            message = messages.recv() => match message {
                Some(Ok(PublishEvent { topic, payload })) => {
                    dispatcher.handle_message(&topic, &payload);
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(Error::BusClosed),
            },
            event = device_events.recv() => match event {
                Some(event) => dispatcher.handle_device_event(event),
                None => return Err(Error::DeviceClosed),
            },
        }
    }
}
