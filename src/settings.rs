//! # Settings Module
//!
//! ## Purpose
//! Run-time parameters of the alpha-chain network: the fuel isotope, the energy increment of
//! the numerical energy derivative, the code unit system of the host and the location of the
//! nuclear data table. Parameters are kept in a JSON file; missing keys take their defaults.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "NISOfuel": 1,
//!   "alphanet_epsder": 1e-5,
//!   "unit_density": 1.0,
//!   "unit_length_in_cm": 1.0,
//!   "unit_vel_in_cms": 1.0,
//!   "nuclear_data_path": "alpnet.dat"
//! }
//! ```
//!
//! ## Derived units
//! | quantity | formula |
//! |----------|---------|
//! | time, s | `unit_length_in_cm / unit_vel_in_cms` |
//! | energy density, erg/cm^3 | `unit_density * unit_vel_in_cms^2` |

use crate::NuclearNetwork::isotopes::NISO;
use crate::NuclearNetwork::network_driver::NetworkError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;

/// Parameters of the network read from the host's parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// index of the fuel isotope reported by `fuel_consumption_rate`
    #[serde(rename = "NISOfuel")]
    pub niso_fuel: usize,
    /// relative energy increment of the numerical energy derivative
    pub alphanet_epsder: f64,
    /// g/cm^3 per code density unit
    pub unit_density: f64,
    pub unit_length_in_cm: f64,
    pub unit_vel_in_cms: f64,
    pub nuclear_data_path: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            niso_fuel: 1,
            alphanet_epsder: 1.0e-5,
            unit_density: 1.0,
            unit_length_in_cm: 1.0,
            unit_vel_in_cms: 1.0,
            nuclear_data_path: "alpnet.dat".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Loads the configuration from a JSON file and validates it.
    pub fn from_json_file(path: &str) -> Result<Self, NetworkError> {
        let content = fs::read_to_string(path)?;
        let config: NetworkConfig = serde_json::from_str(&content)?;
        config.validate()?;
        info!("Network configuration loaded from '{}'", path);
        Ok(config)
    }

    pub fn save_config(&self, path: &str) -> Result<(), NetworkError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.niso_fuel >= NISO {
            return Err(NetworkError::Config(format!(
                "NISOfuel = {} is not an isotope index (0..{})",
                self.niso_fuel, NISO
            )));
        }
        let positive = [
            ("alphanet_epsder", self.alphanet_epsder),
            ("unit_density", self.unit_density),
            ("unit_length_in_cm", self.unit_length_in_cm),
            ("unit_vel_in_cms", self.unit_vel_in_cms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(NetworkError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.alphanet_epsder >= 1.0 {
            return Err(NetworkError::Config(format!(
                "alphanet_epsder = {} must be smaller than 1",
                self.alphanet_epsder
            )));
        }
        Ok(())
    }

    /// seconds per code time unit
    pub fn unit_time_in_s(&self) -> f64 {
        self.unit_length_in_cm / self.unit_vel_in_cms
    }

    /// erg/cm^3 per code energy density unit
    pub fn unit_energy_density_in_cgs(&self) -> f64 {
        self.unit_density * self.unit_vel_in_cms * self.unit_vel_in_cms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.niso_fuel, 1);
        assert_eq!(config.alphanet_epsder, 1.0e-5);
        assert_eq!(config.unit_time_in_s(), 1.0);
        assert_eq!(config.unit_energy_density_in_cgs(), 1.0);
        assert_eq!(config.nuclear_data_path, "alpnet.dat");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"NISOfuel": 2, "unit_length_in_cm": 1e9, "unit_vel_in_cms": 1e8}"#)
            .unwrap();
        let config = NetworkConfig::from_json_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.niso_fuel, 2);
        assert_eq!(config.unit_density, 1.0);
        assert_eq!(config.unit_time_in_s(), 10.0);
        assert_eq!(config.unit_energy_density_in_cgs(), 1e16);
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let config = NetworkConfig {
            unit_density: 1e7,
            nuclear_data_path: "tables/alpnet.dat".to_string(),
            ..Default::default()
        };
        config.save_config(path).unwrap();
        let loaded = NetworkConfig::from_json_file(path).unwrap();
        assert_eq!(loaded, config);
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("\"NISOfuel\""));
    }

    #[test]
    fn test_validation() {
        let bad_fuel = NetworkConfig {
            niso_fuel: 13,
            ..Default::default()
        };
        assert!(matches!(bad_fuel.validate(), Err(NetworkError::Config(_))));
        let bad_unit = NetworkConfig {
            unit_vel_in_cms: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad_unit.validate(), Err(NetworkError::Config(_))));
        let bad_eps = NetworkConfig {
            alphanet_epsder: f64::NAN,
            ..Default::default()
        };
        assert!(bad_eps.validate().is_err());
        let large_eps = NetworkConfig {
            alphanet_epsder: 1.5,
            ..Default::default()
        };
        assert!(large_eps.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ NISOfuel: ").unwrap();
        let err = NetworkConfig::from_json_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, NetworkError::Serde(_)));
        let err = NetworkConfig::from_json_file("no/such/config.json").unwrap_err();
        assert!(matches!(err, NetworkError::Io(_)));
    }
}
