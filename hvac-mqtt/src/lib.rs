use core::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use mqtt_endpoint_tokio::mqtt_ep::{
    Endpoint,
    packet::v5_0,
    role,
    transport::{TcpTransport, connect_helper},
};
use mqtt_protocol_core::mqtt::packet::{
    Qos, SubEntry, SubOpts,
    v5_0::{Connack, Publish},
};

pub mod broker;
pub mod log;

pub use mqtt_endpoint_tokio::mqtt_ep;

pub use self::broker::{BrokerAddr, Credentials};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("mqtt transport error: {0}")]
    MqttTransport(#[from] mqtt_ep::TransportError),
    #[error("mqtt connection error: {0}")]
    MqttConnection(#[from] mqtt_ep::ConnectionError),
    #[error("mqtt packet field error: {0}")]
    MqttPacketField(&'static str),
    #[error("mqtt packet error: {0}")]
    MqttPacket(mqtt_ep::result_code::MqttError),
    #[error("bad broker url: {0}")]
    BadUrl(&'static str),
}

impl Error {
    /// Whether the connection to the broker is gone.
    ///
    /// Anything else was a problem with a single packet.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::MqttTransport(_) => true,
            Error::MqttConnection(e) => !matches!(e, mqtt_ep::ConnectionError::Mqtt(_)),
            Error::MqttPacketField(_) | Error::MqttPacket(_) | Error::BadUrl(_) => false,
        }
    }
}

impl From<mqtt_ep::result_code::MqttError> for Error {
    fn from(e: mqtt_ep::result_code::MqttError) -> Self {
        Error::MqttPacket(e)
    }
}

pub struct MqttConnection {
    endpoint: Endpoint<role::Client>,
    next_packet_id: AtomicU16,
}

impl MqttConnection {
    pub async fn connect(
        client_id: &str,
        broker: &BrokerAddr,
        credentials: Option<&Credentials>,
    ) -> Result<Arc<Self>> {
        let endpoint = mqtt_ep::endpoint::Endpoint::<role::Client>::new(mqtt_ep::Version::V5_0);

        let tcp_stream = connect_helper::connect_tcp(&broker.to_string(), None).await?;
        let transport = TcpTransport::from_stream(tcp_stream);
        endpoint
            .attach(transport, mqtt_ep::endpoint::Mode::Client)
            .await?;

        let mut connect = v5_0::Connect::builder().client_id(client_id)?;
        if let Some(credentials) = credentials {
            connect = connect
                .user_name(credentials.username.as_str())?
                .password(credentials.password.as_str())?;
        }

        endpoint.send(connect.build()?).await?;

        let packet = endpoint.recv().await?;
        let connack: Connack = packet.try_into().map_err(Error::MqttPacketField)?;
        tracing::debug!("Received CONNACK: {connack:?}");

        match credentials {
            Some(credentials) => {
                tracing::info!(%broker, username = %credentials.username, "Connected to broker")
            }
            None => tracing::info!(%broker, "Connected to broker"),
        }

        Ok(MqttConnection { endpoint, next_packet_id: AtomicU16::new(1) }.into())
    }

    fn next_packet_id(&self) -> u16 {
        loop {
            let id = self.next_packet_id.fetch_add(1, Ordering::Relaxed);

            if id != 0 {
                break id;
            }
        }
    }

    pub async fn recv_raw(&self) -> Result<mqtt_ep::packet::Packet> {
        let packet = self.endpoint.recv().await?;
        Ok(packet)
    }

    /// Waits for the next PUBLISH, skipping every other packet.
    pub async fn recv(&self) -> Result<PublishEvent> {
        loop {
            let packet = self.recv_raw().await?;

            let publish: Result<Publish, _> = packet.try_into();
            if let Ok(publish) = publish {
                let topic = publish.topic_name().to_owned();
                let payload = String::from_utf8_lossy(publish.payload().as_slice()).into_owned();

                break Ok(PublishEvent { topic, payload });
            }
        }
    }

    pub async fn subscribe(&self, topic: &str) -> Result<()> {
        let subscribe = v5_0::Subscribe::builder()
            .packet_id(self.next_packet_id())
            .entries(vec![SubEntry::new(
                topic.to_string(),
                SubOpts::new().set_qos(Qos::AtMostOnce),
            )?])
            .build()?;

        tracing::info!("Subscribing to topic '{topic}'");

        self.endpoint
            .register_packet_id(subscribe.packet_id())
            .await?;

        self.endpoint.send(subscribe).await?;

        Ok(())
    }

    pub async fn publish(&self, topic: &str, payload: &str, opts: PublishOpts) -> Result<()> {
        tracing::debug!("Publishing to topic {topic}: {payload}");

        let mut publish = v5_0::Publish::builder()
            .topic_name(topic.to_string())?
            .payload(payload.to_string())
            .qos(opts.qos)
            .retain(opts.retain);

        // QoS 0 publishes carry no packet identifier
        if !matches!(opts.qos, Qos::AtMostOnce) {
            let packet_id = self.next_packet_id();
            self.endpoint.register_packet_id(packet_id).await?;
            publish = publish.packet_id(packet_id);
        }

        self.endpoint.send(publish.build()?).await?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishEvent {
    pub topic: String,
    pub payload: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PublishOpts {
    pub qos: Qos,
    pub retain: bool,
}

impl PublishOpts {
    /// Periodic device state; superseded by the next status cycle.
    pub const fn state() -> Self {
        Self { qos: Qos::AtMostOnce, retain: false }
    }
}
