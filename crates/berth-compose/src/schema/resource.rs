//! Named volume and network definitions of structured documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::shape::{ShapeError, ShapeResult, dict, entry_text, flag, text};
use crate::error::{ComposeError, Result};
use crate::value::RawValue;

/// Marks a volume or network as created outside the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct External {
    /// Whether the resource is external.
    pub external: bool,
    /// Name of the external resource, when it differs from the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl External {
    fn read(value: &RawValue) -> ShapeResult<Self> {
        match value {
            RawValue::Scalar(_) => Ok(Self {
                external: flag(value)?,
                name: None,
            }),
            RawValue::Mapping(entries) => {
                if entries.keys().any(|k| k != "name") {
                    return Err(ShapeError::Expected("a boolean or a mapping with a name"));
                }
                Ok(Self {
                    external: true,
                    name: entry_text(entries, "name")?,
                })
            }
            RawValue::Sequence(_) => Err(ShapeError::Expected("a boolean or a mapping with a name")),
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A named volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Volume driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// Driver options.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub driver_opts: BTreeMap<String, String>,
    /// External volume marker.
    #[serde(skip_serializing_if = "External::is_default")]
    pub external: External,
}

/// One IPAM address pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpamPool {
    /// Subnet in CIDR form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    /// Range to allocate container addresses from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<String>,
    /// Gateway address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Auxiliary addresses used by the network driver.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aux_addresses: BTreeMap<String, String>,
}

/// IP address management settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipam {
    /// IPAM driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// Address pools.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config: Vec<IpamPool>,
}

impl Ipam {
    fn read(value: &RawValue) -> ShapeResult<Self> {
        const EXPECTED: ShapeError = ShapeError::Expected("a mapping with driver and config");
        let entries = value.as_mapping().ok_or(EXPECTED)?;
        let mut ipam = Self::default();
        for (key, item) in entries {
            match key.as_str() {
                "driver" => ipam.driver = text(item)?,
                "config" => {
                    ipam.config = item
                        .as_sequence()
                        .ok_or(EXPECTED)?
                        .iter()
                        .map(read_pool)
                        .collect::<ShapeResult<_>>()?;
                }
                _ => return Err(EXPECTED),
            }
        }
        Ok(ipam)
    }
}

fn read_pool(value: &RawValue) -> ShapeResult<IpamPool> {
    const EXPECTED: ShapeError = ShapeError::Expected("a list of address pools");
    let entries = value.as_mapping().ok_or(EXPECTED)?;
    let mut pool = IpamPool::default();
    for (key, item) in entries {
        match key.as_str() {
            "subnet" => pool.subnet = text(item)?,
            "ip_range" => pool.ip_range = text(item)?,
            "gateway" => pool.gateway = text(item)?,
            "aux_addresses" => pool.aux_addresses = dict(item)?,
            _ => return Err(EXPECTED),
        }
    }
    Ok(pool)
}

/// A named network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// Driver options.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub driver_opts: BTreeMap<String, String>,
    /// External network marker.
    #[serde(skip_serializing_if = "External::is_default")]
    pub external: External,
    /// Address management.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipam: Option<Ipam>,
    /// Restrict external access.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub internal: bool,
    /// Network labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

fn entries_of<'a>(
    kind: &'static str,
    name: &str,
    value: &'a RawValue,
) -> Result<Option<&'a BTreeMap<String, RawValue>>> {
    match value {
        RawValue::Mapping(entries) => Ok(Some(entries)),
        RawValue::Scalar(s) if s.is_empty() => Ok(None),
        _ => Err(ComposeError::InvalidFieldType {
            service: name.to_owned(),
            field: kind.to_owned(),
            expected: "a mapping",
        }),
    }
}

/// Coerces a raw `volumes` entry.
///
/// # Errors
///
/// Returns an error for unknown keys or mismatched shapes.
pub fn coerce_volume(name: &str, value: &RawValue) -> Result<VolumeConfig> {
    let mut volume = VolumeConfig::default();
    let Some(entries) = entries_of("volume", name, value)? else {
        return Ok(volume);
    };
    for (key, item) in entries {
        let read = match key.as_str() {
            "driver" => text(item).map(|v| volume.driver = v),
            "driver_opts" => dict(item).map(|v| volume.driver_opts = v),
            "external" => External::read(item).map(|v| volume.external = v),
            _ => {
                return Err(ComposeError::UnsupportedResourceField {
                    kind: "volume",
                    name: name.to_owned(),
                    field: key.clone(),
                });
            }
        };
        read.map_err(|e| e.at(name, key))?;
    }
    Ok(volume)
}

/// Coerces a raw `networks` entry.
///
/// # Errors
///
/// Returns an error for unknown keys or mismatched shapes.
pub fn coerce_network(name: &str, value: &RawValue) -> Result<NetworkConfig> {
    let mut network = NetworkConfig::default();
    let Some(entries) = entries_of("network", name, value)? else {
        return Ok(network);
    };
    for (key, item) in entries {
        let read = match key.as_str() {
            "driver" => text(item).map(|v| network.driver = v),
            "driver_opts" => dict(item).map(|v| network.driver_opts = v),
            "external" => External::read(item).map(|v| network.external = v),
            "ipam" => Ipam::read(item).map(|v| network.ipam = Some(v)),
            "internal" => flag(item).map(|v| network.internal = v),
            "labels" => dict(item).map(|v| network.labels = v),
            _ => {
                return Err(ComposeError::UnsupportedResourceField {
                    kind: "network",
                    name: name.to_owned(),
                    field: key.clone(),
                });
            }
        };
        read.map_err(|e| e.at(name, key))?;
    }
    Ok(network)
}
