use serde_derive::Deserialize;

use crate::beacon::BeaconRegion;

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub mqtt: MqttConfig,
    pub beacon: BeaconRegion,
    pub scan: Option<ScanConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub publisher_id: Option<String>,
    pub topic_path: Option<String>,
    pub keep_alive_seconds: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ScanConfig {
    /// Seconds between ranging ticks; defaults to 1, matching the one
    /// update-per-second cadence of phone-side beacon ranging.
    pub ranging_interval_seconds: Option<u64>,
    /// Path loss exponent for RSSI-to-distance conversion.
    pub environment_factor: Option<f64>,
}

impl AppConfig {
    pub fn ranging_interval_seconds(&self) -> u64 {
        self.scan
            .as_ref()
            .and_then(|s| s.ranging_interval_seconds)
            .unwrap_or(1)
    }

    pub fn environment_factor(&self) -> f64 {
        self.scan
            .as_ref()
            .and_then(|s| s.environment_factor)
            .unwrap_or(crate::beacon::DEFAULT_ENVIRONMENT_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        let config_str = r#"
            [mqtt]
            host = "localhost"
            port = 1883
            username = "user"
            password = "pass"

            [beacon]
            uuid = "5a4bcfce-174e-4bac-a814-092e77f6b7e5"
            major = 123
            minor = 456

            [scan]
            ranging_interval_seconds = 2
            environment_factor = 2.5
        "#;
        let config: AppConfig = toml::de::from_str(&config_str).unwrap();
        assert!(config.mqtt.host == "localhost");
        assert!(config.beacon.major == 123);
        assert!(config.ranging_interval_seconds() == 2);
        assert!(config.environment_factor() == 2.5);
    }

    #[test]
    fn test_scan_defaults() {
        let config_str = r#"
            [mqtt]
            host = "localhost"

            [beacon]
            uuid = "5a4bcfce-174e-4bac-a814-092e77f6b7e5"
            major = 123
            minor = 456
        "#;
        let config: AppConfig = toml::de::from_str(&config_str).unwrap();
        assert!(config.scan.is_none());
        assert!(config.ranging_interval_seconds() == 1);
        assert!(config.environment_factor() == 2.0);
    }
}
