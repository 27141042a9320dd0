use std::time::Duration;

use anyhow::Result;
use btleplug::api::{Central as _, CentralEvent, Peripheral as _, ScanFilter};
use futures::StreamExt as _;
use log::{debug, info, warn};

use crate::beacon::{APPLE_COMPANY_ID, BeaconObservation, BeaconRegion, parse_ibeacon};
use crate::presenter::Presenter;

pub struct Manager {
    adapter: btleplug::platform::Adapter,
    region: BeaconRegion,
    environment_factor: f64,
    ranging_interval: Duration,
    mqtt_client: crate::mqtt::MqttClient,
    mqtt_event_loop: rumqttc::EventLoop,
}

/// Consumes adapter events and a fixed ranging tick. Advertisements that
/// decode to a frame inside the configured region are buffered; each tick
/// drains the buffer into the presenter and publishes the result. The
/// select loop serializes everything, so the presenter needs no locking.
async fn handle_ranging_events(
    adapter: &btleplug::platform::Adapter,
    region: &BeaconRegion,
    environment_factor: f64,
    ranging_interval: Duration,
    mqtt_client: &crate::mqtt::MqttClient,
) -> Result<()> {
    let mut events = adapter.events().await?;
    let mut ticker = tokio::time::interval(ranging_interval);

    let mut presenter = Presenter::new();
    let mut observations: Vec<BeaconObservation> = Vec::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let levels: Vec<_> = observations
                    .iter()
                    .map(|o| o.level(environment_factor))
                    .collect();
                observations.clear();

                let (state, notify) = presenter.handle_cycle(&levels);
                if notify {
                    mqtt_client.announce_notice(region).await?;
                }
                mqtt_client.announce_state(&state).await?;
            }
            event = events.next() => {
                match event {
                    Some(CentralEvent::ManufacturerDataAdvertisement { id, manufacturer_data }) => {
                        let Some(frame) = manufacturer_data
                            .get(&APPLE_COMPANY_ID)
                            .and_then(|payload| parse_ibeacon(payload))
                        else {
                            continue;
                        };
                        if !region.matches(&frame) {
                            debug!("Ignoring beacon outside region: {:?}", frame);
                            continue;
                        }

                        let rssi = match adapter.peripheral(&id).await {
                            Ok(peripheral) => {
                                peripheral.properties().await?.and_then(|p| p.rssi)
                            }
                            Err(err) => {
                                warn!("No peripheral for advertisement {:?}: {:?}", id, err);
                                None
                            }
                        };
                        debug!("Beacon observed: {:?} (rssi: {:?})", frame, rssi);
                        observations.push(BeaconObservation { frame, rssi });
                    }
                    Some(_) => {}
                    None => {
                        info!("Adapter event stream closed");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

impl Manager {
    pub fn new(
        adapter: btleplug::platform::Adapter,
        region: BeaconRegion,
        environment_factor: f64,
        ranging_interval: Duration,
        mqtt_client: crate::mqtt::MqttClient,
        mqtt_event_loop: rumqttc::EventLoop,
    ) -> Self {
        Manager {
            adapter,
            region,
            environment_factor,
            ranging_interval,
            mqtt_client,
            mqtt_event_loop,
        }
    }

    pub async fn run_loop(self) -> Result<()> {
        let Manager {
            adapter,
            region,
            environment_factor,
            ranging_interval,
            mqtt_client,
            mut mqtt_event_loop,
        } = self;

        adapter.start_scan(ScanFilter::default()).await?;
        info!("Scanning for beacon region {:?}", region);

        tokio::task::spawn(async move {
            crate::mqtt::MqttClient::event_loop(&mut mqtt_event_loop).await;
        });

        handle_ranging_events(
            &adapter,
            &region,
            environment_factor,
            ranging_interval,
            &mqtt_client,
        )
        .await?;

        info!("Exiting manager event loop");
        mqtt_client.disconnect().await?;

        Ok(())
    }
}
