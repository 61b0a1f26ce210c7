//! Canonical service model and its field table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::shape::{
    Reader, ShapeError, ShapeResult, Writer, byte_size, command, dict, dict_raw, flag, flag_raw,
    colon_list, list, list_raw, number, number_raw, set, string_or_list, text, text_raw,
    unique_list,
};
use crate::value::RawValue;

/// Build instructions for a service image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build context: a local path or a remote source.
    pub context: String,
    /// Alternate Dockerfile, relative to the context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
    /// Build-time arguments.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,
}

impl BuildConfig {
    fn read(value: &RawValue) -> ShapeResult<Option<Self>> {
        const EXPECTED: ShapeError = ShapeError::Expected("a string or a mapping");
        match value {
            RawValue::Scalar(context) => Ok(Some(Self {
                context: context.clone(),
                ..Self::default()
            })),
            RawValue::Mapping(entries) => {
                let mut build = Self::default();
                for (key, item) in entries {
                    match key.as_str() {
                        "context" => build.context = text(item)?.unwrap_or_default(),
                        "dockerfile" => build.dockerfile = text(item)?,
                        "args" => build.args = dict(item)?,
                        _ => return Err(EXPECTED),
                    }
                }
                Ok(Some(build))
            }
            RawValue::Sequence(_) => Err(EXPECTED),
        }
    }

    /// A bare context is written as a string, anything richer as a mapping.
    fn write(&self) -> RawValue {
        if self.dockerfile.is_none() && self.args.is_empty() {
            return RawValue::scalar(self.context.as_str());
        }
        let mut entries = BTreeMap::new();
        let _ = entries.insert("context".to_owned(), RawValue::scalar(self.context.as_str()));
        if let Some(dockerfile) = &self.dockerfile {
            let _ = entries.insert("dockerfile".to_owned(), RawValue::scalar(dockerfile.as_str()));
        }
        if let Some(args) = dict_raw(&self.args) {
            let _ = entries.insert("args".to_owned(), args);
        }
        RawValue::Mapping(entries)
    }
}

/// Logging driver selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Driver name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// Driver options.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl LogConfig {
    fn read(value: &RawValue) -> ShapeResult<Option<Self>> {
        const EXPECTED: ShapeError = ShapeError::Expected("a mapping");
        let entries = value.as_mapping().ok_or(EXPECTED)?;
        let mut logging = Self::default();
        for (key, item) in entries {
            match key.as_str() {
                "driver" => logging.driver = text(item)?,
                "options" => logging.options = dict(item)?,
                _ => return Err(EXPECTED),
            }
        }
        Ok(Some(logging))
    }

    fn write(&self) -> RawValue {
        let mut entries = BTreeMap::new();
        if let Some(driver) = text_raw(self.driver.as_deref()) {
            let _ = entries.insert("driver".to_owned(), driver);
        }
        if let Some(options) = dict_raw(&self.options) {
            let _ = entries.insert("options".to_owned(), options);
        }
        RawValue::Mapping(entries)
    }
}

/// A resource limit with soft and hard values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ulimit {
    /// Soft limit.
    pub soft: i64,
    /// Hard limit.
    pub hard: i64,
}

fn read_ulimits(value: &RawValue) -> ShapeResult<BTreeMap<String, Ulimit>> {
    const EXPECTED: ShapeError = ShapeError::Expected("a mapping");
    let entries = value.as_mapping().ok_or(EXPECTED)?;
    entries
        .iter()
        .map(|(name, item)| {
            let limit = match item {
                RawValue::Scalar(_) => {
                    let single = number(item)?.unwrap_or_default();
                    Ulimit {
                        soft: single,
                        hard: single,
                    }
                }
                RawValue::Mapping(bounds) => Ulimit {
                    soft: bounds.get("soft").map_or(Ok(None), number)?.unwrap_or_default(),
                    hard: bounds.get("hard").map_or(Ok(None), number)?.unwrap_or_default(),
                },
                RawValue::Sequence(_) => return Err(EXPECTED),
            };
            Ok((name.clone(), limit))
        })
        .collect()
}

fn write_ulimits(limits: &BTreeMap<String, Ulimit>) -> Option<RawValue> {
    if limits.is_empty() {
        return None;
    }
    let entries = limits
        .iter()
        .map(|(name, limit)| {
            let value = if limit.soft == limit.hard {
                RawValue::Scalar(limit.soft.to_string())
            } else {
                let mut bounds = BTreeMap::new();
                let _ = bounds.insert("soft".to_owned(), RawValue::Scalar(limit.soft.to_string()));
                let _ = bounds.insert("hard".to_owned(), RawValue::Scalar(limit.hard.to_string()));
                RawValue::Mapping(bounds)
            };
            (name.clone(), value)
        })
        .collect();
    Some(RawValue::Mapping(entries))
}

/// Per-network settings of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceNetwork {
    /// Extra host names on this network.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Static IPv4 address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    /// Static IPv6 address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
}

impl ServiceNetwork {
    fn is_plain(&self) -> bool {
        self.aliases.is_empty() && self.ipv4_address.is_none() && self.ipv6_address.is_none()
    }
}

fn read_networks(value: &RawValue) -> ShapeResult<BTreeMap<String, ServiceNetwork>> {
    const EXPECTED: ShapeError = ShapeError::Expected("an array or a mapping");
    match value {
        RawValue::Sequence(_) => Ok(list(value)
            .map_err(|_| EXPECTED)?
            .into_iter()
            .map(|name| (name, ServiceNetwork::default()))
            .collect()),
        RawValue::Mapping(entries) => entries
            .iter()
            .map(|(name, item)| {
                let network = match item {
                    RawValue::Scalar(s) if s.is_empty() => ServiceNetwork::default(),
                    RawValue::Mapping(settings) => {
                        let mut network = ServiceNetwork::default();
                        for (key, setting) in settings {
                            match key.as_str() {
                                "aliases" => network.aliases = list(setting)?,
                                "ipv4_address" => network.ipv4_address = text(setting)?,
                                "ipv6_address" => network.ipv6_address = text(setting)?,
                                _ => return Err(EXPECTED),
                            }
                        }
                        network
                    }
                    _ => return Err(EXPECTED),
                };
                Ok((name.clone(), network))
            })
            .collect(),
        RawValue::Scalar(_) => Err(EXPECTED),
    }
}

fn write_networks(networks: &BTreeMap<String, ServiceNetwork>) -> Option<RawValue> {
    if networks.is_empty() {
        return None;
    }
    if networks.values().all(ServiceNetwork::is_plain) {
        return Some(RawValue::from(networks.keys().cloned().collect::<Vec<_>>()));
    }
    let entries = networks
        .iter()
        .map(|(name, network)| {
            let mut settings = BTreeMap::new();
            if let Some(aliases) = list_raw(&network.aliases) {
                let _ = settings.insert("aliases".to_owned(), aliases);
            }
            if let Some(ip) = text_raw(network.ipv4_address.as_deref()) {
                let _ = settings.insert("ipv4_address".to_owned(), ip);
            }
            if let Some(ip) = text_raw(network.ipv6_address.as_deref()) {
                let _ = settings.insert("ipv6_address".to_owned(), ip);
            }
            (name.clone(), RawValue::Mapping(settings))
        })
        .collect();
    Some(RawValue::Mapping(entries))
}

/// A volume mounted into a service: `[source:]destination[:mode]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVolume {
    /// Host path or named volume. Empty for anonymous volumes.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub source: String,
    /// Path inside the container.
    pub destination: String,
    /// Access mode such as `ro` or `rw`.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub access_mode: String,
}

impl ServiceVolume {
    /// Parses the short volume syntax.
    pub fn parse(spec: &str) -> Option<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        let (source, destination, access_mode) = match parts.as_slice() {
            [destination] => ("", *destination, ""),
            [source, destination] => (*source, *destination, ""),
            [source, destination, mode] => (*source, *destination, *mode),
            _ => return None,
        };
        if destination.is_empty() {
            return None;
        }
        Some(Self {
            source: source.to_owned(),
            destination: destination.to_owned(),
            access_mode: access_mode.to_owned(),
        })
    }

    /// Formats the volume back into its short syntax.
    pub fn to_spec(&self) -> String {
        let mut spec = String::new();
        if !self.source.is_empty() {
            spec.push_str(&self.source);
            spec.push(':');
        }
        spec.push_str(&self.destination);
        if !self.access_mode.is_empty() {
            spec.push(':');
            spec.push_str(&self.access_mode);
        }
        spec
    }
}

fn read_volumes(value: &RawValue) -> ShapeResult<Vec<ServiceVolume>> {
    list(value)?
        .iter()
        .map(|spec| ServiceVolume::parse(spec).ok_or(ShapeError::Expected("an array of volume specifications")))
        .collect()
}

fn write_volumes(volumes: &[ServiceVolume]) -> Option<RawValue> {
    (!volumes.is_empty()).then(|| RawValue::from(volumes.iter().map(ServiceVolume::to_spec).collect::<Vec<_>>()))
}

/// A fully resolved, strongly typed service definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Block I/O weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blkio_weight: Option<i64>,
    /// Per-device block I/O weights as `path:weight`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blkio_weight_device: Vec<String>,
    /// Image build instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
    /// Added kernel capabilities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    /// Dropped kernel capabilities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_drop: Vec<String>,
    /// Parent cgroup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgroup_parent: Option<String>,
    /// Command overriding the image default.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Fixed container name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    /// CFS period in microseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_period: Option<i64>,
    /// CFS quota in microseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_quota: Option<i64>,
    /// Relative CPU weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    /// CPUs the container may run on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpuset: Option<String>,
    /// Services this one depends on.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Read rate limits in bytes per second, as `path:rate`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_read_bps: Vec<String>,
    /// Read rate limits in operations per second, as `path:rate`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_read_iops: Vec<String>,
    /// Write rate limits in bytes per second, as `path:rate`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_write_bps: Vec<String>,
    /// Write rate limits in operations per second, as `path:rate`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_write_iops: Vec<String>,
    /// Host device mappings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
    /// DNS servers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns: Vec<String>,
    /// DNS resolver options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_opt: Vec<String>,
    /// DNS search domains.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_search: Vec<String>,
    /// Domain name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domainname: Option<String>,
    /// Entrypoint overriding the image default.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,
    /// Files with environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env_file: Vec<String>,
    /// Environment variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Ports exposed to linked services only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expose: Vec<String>,
    /// Links to containers outside the project.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external_links: Vec<String>,
    /// Extra `/etc/hosts` entries as `host:ip`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<String>,
    /// Additional groups for the container user.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_add: Vec<String>,
    /// Container host name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Image to run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// IPC namespace mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipc: Option<String>,
    /// Isolation technology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation: Option<String>,
    /// Container labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Links to other services.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    /// Logging driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LogConfig>,
    /// MAC address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// Memory limit in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_limit: Option<i64>,
    /// Memory soft limit in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_reservation: Option<i64>,
    /// Memory plus swap limit in bytes; `-1` for unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memswap_limit: Option<i64>,
    /// Network mode such as `bridge`, `host` or `container:name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    /// Networks the service joins.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, ServiceNetwork>,
    /// Disable the OOM killer.
    #[serde(skip_serializing_if = "is_false")]
    pub oom_kill_disable: bool,
    /// OOM score adjustment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oom_score_adj: Option<i64>,
    /// PID namespace mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    /// Published ports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Run privileged.
    #[serde(skip_serializing_if = "is_false")]
    pub privileged: bool,
    /// Mount the root file system read-only.
    #[serde(skip_serializing_if = "is_false")]
    pub read_only: bool,
    /// Restart policy, kept verbatim (`"no"` stays a string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
    /// Security options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_opt: Vec<String>,
    /// Size of `/dev/shm` in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shm_size: Option<i64>,
    /// Keep stdin open.
    #[serde(skip_serializing_if = "is_false")]
    pub stdin_open: bool,
    /// Signal used to stop the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
    /// Tmpfs mounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tmpfs: Vec<String>,
    /// Allocate a pseudo-TTY.
    #[serde(skip_serializing_if = "is_false")]
    pub tty: bool,
    /// Resource limits.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ulimits: BTreeMap<String, Ulimit>,
    /// User to run as.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Volume driver for anonymous volumes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_driver: Option<String>,
    /// Volume mounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<ServiceVolume>,
    /// Services or containers to mount volumes from.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes_from: Vec<String>,
    /// Working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl ServiceConfig {
    /// Build context, or an empty string when the service does not build.
    pub fn build_context(&self) -> &str {
        self.build.as_ref().map_or("", |b| b.context.as_str())
    }
}

/// Schema generations a field is valid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Availability {
    /// Valid in legacy and structured documents.
    Both,
    /// Valid only in structured documents.
    Structured,
    /// Valid only in legacy documents.
    Legacy,
}

/// One entry of a field table.
pub(crate) struct Field<T> {
    /// Option name as authored.
    pub name: &'static str,
    /// Schema generations accepting the option.
    pub availability: Availability,
    /// Coerces a raw value into the record.
    pub read: Reader<T>,
    /// Emits the record's value in raw form.
    pub write: Writer<T>,
}

impl Field<ServiceConfig> {
    const fn both(
        name: &'static str,
        read: Reader<ServiceConfig>,
        write: Writer<ServiceConfig>,
    ) -> Self {
        Self {
            name,
            availability: Availability::Both,
            read,
            write,
        }
    }

    const fn structured(
        name: &'static str,
        read: Reader<ServiceConfig>,
        write: Writer<ServiceConfig>,
    ) -> Self {
        Self {
            name,
            availability: Availability::Structured,
            read,
            write,
        }
    }
}

/// Looks up a field by option name.
pub(crate) fn find_field<'a, T>(table: &'a [Field<T>], name: &str) -> Option<&'a Field<T>> {
    table.iter().find(|field| field.name == name)
}

/// Every option of the canonical service model.
pub(crate) static SERVICE_FIELDS: &[Field<ServiceConfig>] = &[
    Field::both("blkio_weight", |c, v| set(&mut c.blkio_weight, number(v)), |c| number_raw(c.blkio_weight)),
    Field::both("blkio_weight_device", |c, v| set(&mut c.blkio_weight_device, unique_list(v)), |c| list_raw(&c.blkio_weight_device)),
    Field::both("build", |c, v| set(&mut c.build, BuildConfig::read(v)), |c| c.build.as_ref().map(BuildConfig::write)),
    Field::both("cap_add", |c, v| set(&mut c.cap_add, unique_list(v)), |c| list_raw(&c.cap_add)),
    Field::both("cap_drop", |c, v| set(&mut c.cap_drop, unique_list(v)), |c| list_raw(&c.cap_drop)),
    Field::both("cgroup_parent", |c, v| set(&mut c.cgroup_parent, text(v)), |c| text_raw(c.cgroup_parent.as_deref())),
    Field::both("command", |c, v| set(&mut c.command, command(v)), |c| list_raw(&c.command)),
    Field::both("container_name", |c, v| set(&mut c.container_name, text(v)), |c| text_raw(c.container_name.as_deref())),
    Field::both("cpu_period", |c, v| set(&mut c.cpu_period, number(v)), |c| number_raw(c.cpu_period)),
    Field::both("cpu_quota", |c, v| set(&mut c.cpu_quota, number(v)), |c| number_raw(c.cpu_quota)),
    Field::both("cpu_shares", |c, v| set(&mut c.cpu_shares, number(v)), |c| number_raw(c.cpu_shares)),
    Field::both("cpuset", |c, v| set(&mut c.cpuset, text(v)), |c| text_raw(c.cpuset.as_deref())),
    Field::structured("depends_on", |c, v| set(&mut c.depends_on, unique_list(v)), |c| list_raw(&c.depends_on)),
    Field::both("device_read_bps", |c, v| set(&mut c.device_read_bps, colon_list(v)), |c| list_raw(&c.device_read_bps)),
    Field::both("device_read_iops", |c, v| set(&mut c.device_read_iops, colon_list(v)), |c| list_raw(&c.device_read_iops)),
    Field::both("device_write_bps", |c, v| set(&mut c.device_write_bps, colon_list(v)), |c| list_raw(&c.device_write_bps)),
    Field::both("device_write_iops", |c, v| set(&mut c.device_write_iops, colon_list(v)), |c| list_raw(&c.device_write_iops)),
    Field::both("devices", |c, v| set(&mut c.devices, unique_list(v)), |c| list_raw(&c.devices)),
    Field::both("dns", |c, v| set(&mut c.dns, string_or_list(v)), |c| list_raw(&c.dns)),
    Field::both("dns_opt", |c, v| set(&mut c.dns_opt, unique_list(v)), |c| list_raw(&c.dns_opt)),
    Field::both("dns_search", |c, v| set(&mut c.dns_search, string_or_list(v)), |c| list_raw(&c.dns_search)),
    Field::both("domainname", |c, v| set(&mut c.domainname, text(v)), |c| text_raw(c.domainname.as_deref())),
    Field::both("entrypoint", |c, v| set(&mut c.entrypoint, command(v)), |c| list_raw(&c.entrypoint)),
    Field::both("env_file", |c, v| set(&mut c.env_file, string_or_list(v)), |c| list_raw(&c.env_file)),
    Field::both("environment", |c, v| set(&mut c.environment, dict(v)), |c| dict_raw(&c.environment)),
    Field::both("expose", |c, v| set(&mut c.expose, list(v)), |c| list_raw(&c.expose)),
    Field::both("external_links", |c, v| set(&mut c.external_links, list(v)), |c| list_raw(&c.external_links)),
    Field::both("extra_hosts", |c, v| set(&mut c.extra_hosts, colon_list(v)), |c| list_raw(&c.extra_hosts)),
    Field::both("group_add", |c, v| set(&mut c.group_add, list(v)), |c| list_raw(&c.group_add)),
    Field::both("hostname", |c, v| set(&mut c.hostname, text(v)), |c| text_raw(c.hostname.as_deref())),
    Field::both("image", |c, v| set(&mut c.image, text(v)), |c| text_raw(c.image.as_deref())),
    Field::both("ipc", |c, v| set(&mut c.ipc, text(v)), |c| text_raw(c.ipc.as_deref())),
    Field::both("isolation", |c, v| set(&mut c.isolation, text(v)), |c| text_raw(c.isolation.as_deref())),
    Field::both("labels", |c, v| set(&mut c.labels, dict(v)), |c| dict_raw(&c.labels)),
    Field::both("links", |c, v| set(&mut c.links, list(v)), |c| list_raw(&c.links)),
    Field::structured("logging", |c, v| set(&mut c.logging, LogConfig::read(v)), |c| c.logging.as_ref().map(LogConfig::write)),
    Field::both("mac_address", |c, v| set(&mut c.mac_address, text(v)), |c| text_raw(c.mac_address.as_deref())),
    Field::both("mem_limit", |c, v| set(&mut c.mem_limit, byte_size(v)), |c| number_raw(c.mem_limit)),
    Field::both("mem_reservation", |c, v| set(&mut c.mem_reservation, byte_size(v)), |c| number_raw(c.mem_reservation)),
    Field::both("memswap_limit", |c, v| set(&mut c.memswap_limit, byte_size(v)), |c| number_raw(c.memswap_limit)),
    Field::structured("network_mode", |c, v| set(&mut c.network_mode, text(v)), |c| text_raw(c.network_mode.as_deref())),
    Field::structured("networks", |c, v| set(&mut c.networks, read_networks(v)), |c| write_networks(&c.networks)),
    Field::both("oom_kill_disable", |c, v| set(&mut c.oom_kill_disable, flag(v)), |c| flag_raw(c.oom_kill_disable)),
    Field::both("oom_score_adj", |c, v| set(&mut c.oom_score_adj, number(v)), |c| number_raw(c.oom_score_adj)),
    Field::both("pid", |c, v| set(&mut c.pid, text(v)), |c| text_raw(c.pid.as_deref())),
    Field::both("ports", |c, v| set(&mut c.ports, list(v)), |c| list_raw(&c.ports)),
    Field::both("privileged", |c, v| set(&mut c.privileged, flag(v)), |c| flag_raw(c.privileged)),
    Field::both("read_only", |c, v| set(&mut c.read_only, flag(v)), |c| flag_raw(c.read_only)),
    Field::both("restart", |c, v| set(&mut c.restart, text(v)), |c| text_raw(c.restart.as_deref())),
    Field::both("security_opt", |c, v| set(&mut c.security_opt, unique_list(v)), |c| list_raw(&c.security_opt)),
    Field::both("shm_size", |c, v| set(&mut c.shm_size, byte_size(v)), |c| number_raw(c.shm_size)),
    Field::both("stdin_open", |c, v| set(&mut c.stdin_open, flag(v)), |c| flag_raw(c.stdin_open)),
    Field::both("stop_signal", |c, v| set(&mut c.stop_signal, text(v)), |c| text_raw(c.stop_signal.as_deref())),
    Field::both("tmpfs", |c, v| set(&mut c.tmpfs, string_or_list(v)), |c| list_raw(&c.tmpfs)),
    Field::both("tty", |c, v| set(&mut c.tty, flag(v)), |c| flag_raw(c.tty)),
    Field::both("ulimits", |c, v| set(&mut c.ulimits, read_ulimits(v)), |c| write_ulimits(&c.ulimits)),
    Field::both("user", |c, v| set(&mut c.user, text(v)), |c| text_raw(c.user.as_deref())),
    Field::both("volume_driver", |c, v| set(&mut c.volume_driver, text(v)), |c| text_raw(c.volume_driver.as_deref())),
    Field::both("volumes", |c, v| set(&mut c.volumes, read_volumes(v)), |c| write_volumes(&c.volumes)),
    Field::both("volumes_from", |c, v| set(&mut c.volumes_from, list(v)), |c| list_raw(&c.volumes_from)),
    Field::both("working_dir", |c, v| set(&mut c.working_dir, text(v)), |c| text_raw(c.working_dir.as_deref())),
];
