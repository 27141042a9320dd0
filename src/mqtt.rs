use std::time::Duration;

use log::{debug, error, info};
use rumqttc::{MqttOptions, QoS};
use serde::Serialize;

use crate::beacon::BeaconRegion;
use crate::config;
use crate::presenter::PresentationState;

#[derive(Debug, Clone)]
pub struct MqttClient {
    client: rumqttc::AsyncClient,
    publisher_id: String,
    topic_path: String,
}

#[derive(Debug, Serialize)]
struct StateMqttMessage {
    label: &'static str,
    background: String,
    scale: f64,
}

#[derive(Debug, Serialize)]
struct NoticeMqttMessage {
    uuid: String,
    major: u16,
    minor: u16,
    message: &'static str,
}

impl MqttClient {
    pub fn new(config: &config::MqttConfig) -> (Self, rumqttc::EventLoop) {
        let publisher_id = config
            .publisher_id
            .as_ref()
            .unwrap_or(&"beacon-rs".to_string())
            .to_string();

        let mut mqttoptions = MqttOptions::new(
            publisher_id.clone(),
            config.host.clone(),
            config.port.unwrap_or(1883),
        );

        mqttoptions.set_keep_alive(Duration::from_secs(config.keep_alive_seconds.unwrap_or(5)));

        if let (Some(username), Some(password)) =
            (config.username.as_ref(), config.password.as_ref())
        {
            mqttoptions.set_credentials(username.clone(), password.clone());
        }

        let (client, eventloop) = rumqttc::AsyncClient::new(mqttoptions, 10);

        (
            MqttClient {
                client,
                publisher_id,
                topic_path: config.topic_path.clone().unwrap_or("beacon".to_string()),
            },
            eventloop,
        )
    }

    /// Drives the connection; the client publishes nothing until this is
    /// being polled.
    pub async fn event_loop(eventloop: &mut rumqttc::EventLoop) {
        loop {
            match eventloop.poll().await {
                Ok(notification) => match notification {
                    rumqttc::Event::Incoming(rumqttc::Packet::ConnAck(_)) => {
                        debug!("Connection acknowledged");
                    }
                    rumqttc::Event::Incoming(rumqttc::Packet::PubAck(_)) => {
                        debug!("Publish acknowledged");
                    }
                    _ => {}
                },
                Err(e) => {
                    error!("Error polling MQTT event loop: {:?}", e);
                }
            }
        }
    }

    /// Publishes the state the presentation collaborator should render.
    pub async fn announce_state(
        &self,
        state: &PresentationState,
    ) -> Result<(), rumqttc::ClientError> {
        debug!(
            "Announcing presentation state {} (scale: {})",
            state.label, state.scale
        );
        let message = StateMqttMessage {
            label: state.label,
            background: state.background.hex(),
            scale: state.scale,
        };
        self.client
            .publish(
                format!("{}/{}/state", self.topic_path, self.publisher_id),
                QoS::AtMostOnce,
                false,
                serde_json::to_string(&message).unwrap(),
            )
            .await
    }

    /// Publishes the one-time "beacon detected" notice. Fired at most once
    /// per process; the retained flag keeps it visible to late subscribers.
    pub async fn announce_notice(&self, region: &BeaconRegion) -> Result<(), rumqttc::ClientError> {
        info!("Announcing first beacon detection for {:?}", region);
        let message = NoticeMqttMessage {
            uuid: region.uuid.to_string(),
            major: region.major,
            minor: region.minor,
            message: "Beacon detected",
        };
        self.client
            .publish(
                format!("{}/{}/notice", self.topic_path, self.publisher_id),
                QoS::AtLeastOnce,
                true,
                serde_json::to_string(&message).unwrap(),
            )
            .await
    }

    pub async fn disconnect(&self) -> Result<(), rumqttc::ClientError> {
        debug!("Disconnecting MQTT client");
        self.client.disconnect().await
    }
}
