use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use hvac_bridge::{
    Dispatcher, MqttBus,
    simulated::{self, SimulatedDevice},
};
use hvac_common::{PropertyRegistry, TopicPrefix};
use hvac_mqtt::{BrokerAddr, Credentials, MqttConnection};

#[derive(Parser)]
#[command(about = "Bridges a climate control unit to per-property MQTT topics")]
struct Args {
    /// Address of the climate control unit
    #[arg(long)]
    hvac_host: String,

    /// MQTT broker, eg. mqtt://192.168.0.10:1883
    #[arg(long)]
    mqtt_broker_url: String,

    /// Prefix for the <prefix>/<property>/{get,set} topics, without wildcards
    #[arg(long)]
    mqtt_topic_prefix: TopicPrefix,

    /// Only used together with --mqtt-password
    #[arg(long)]
    mqtt_username: Option<String>,

    #[arg(long)]
    mqtt_password: Option<String>,

    #[arg(long, default_value = "hvac-mqtt-bridge")]
    mqtt_client_id: String,

    /// Seconds between status polls of the unit
    #[arg(long, default_value_t = 3)]
    status_interval: u64,

    /// JSON object of property code to raw value to start the unit from
    #[arg(long)]
    initial_state: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hvac_mqtt::log::init();

    let args = Args::parse();

    let registry = PropertyRegistry::builtin().context("invalid property tables")?;

    let broker: BrokerAddr = args
        .mqtt_broker_url
        .parse()
        .context("failed to parse --mqtt-broker-url")?;

    let credentials = match (args.mqtt_username, args.mqtt_password) {
        (Some(username), Some(password)) => Some(Credentials { username, password }),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("Both --mqtt-username and --mqtt-password are needed to authenticate");
            None
        }
        (None, None) => None,
    };

    let initial = match &args.initial_state {
        Some(path) => simulated::load_snapshot(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => simulated::default_snapshot(&registry),
    };

    let conn = MqttConnection::connect(&args.mqtt_client_id, &broker, credentials.as_ref())
        .await
        .context("failed to connect to mqtt broker")?;

    let (bus, mut messages) = MqttBus::start(conn);

    let (device, mut device_events) = SimulatedDevice::start(
        args.hvac_host,
        initial,
        Duration::from_secs(args.status_interval.max(1)),
    );

    let mut dispatcher = Dispatcher::new(registry, args.mqtt_topic_prefix, bus, device);

    let never = hvac_bridge::run(&mut dispatcher, &mut messages, &mut device_events)
        .await
        .context("bridge stopped")?;

    match never {}
}
