//! Legacy (flat) schema and its upgrade to the canonical model.
//!
//! Legacy documents spell a few options differently: the Dockerfile sits
//! beside `build`, logging is split into `log_driver`/`log_opt`, and the
//! network mode is called `net`. Everything else is shared with the
//! structured schema and lives in [`ServiceConfig`].

use std::collections::BTreeMap;

use super::service::{Availability, BuildConfig, Field, LogConfig, ServiceConfig};
use super::shape::{Reader, Writer, dict, dict_raw, set, text, text_raw};

/// A service read from a legacy document, before upgrade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyServiceConfig {
    /// Options shared with the canonical model.
    pub service: ServiceConfig,
    /// Dockerfile used with `build`.
    pub dockerfile: Option<String>,
    /// Logging driver.
    pub log_driver: Option<String>,
    /// Logging driver options.
    pub log_opt: BTreeMap<String, String>,
    /// Network mode.
    pub net: Option<String>,
}

impl Field<LegacyServiceConfig> {
    const fn legacy(
        name: &'static str,
        read: Reader<LegacyServiceConfig>,
        write: Writer<LegacyServiceConfig>,
    ) -> Self {
        Self {
            name,
            availability: Availability::Legacy,
            read,
            write,
        }
    }
}

/// Options that only exist in the legacy schema.
pub(crate) static LEGACY_FIELDS: &[Field<LegacyServiceConfig>] = &[
    Field::legacy("dockerfile", |c, v| set(&mut c.dockerfile, text(v)), |c| text_raw(c.dockerfile.as_deref())),
    Field::legacy("log_driver", |c, v| set(&mut c.log_driver, text(v)), |c| text_raw(c.log_driver.as_deref())),
    Field::legacy("log_opt", |c, v| set(&mut c.log_opt, dict(v)), |c| dict_raw(&c.log_opt)),
    Field::legacy("net", |c, v| set(&mut c.net, text(v)), |c| text_raw(c.net.as_deref())),
];

impl LegacyServiceConfig {
    /// Folds legacy spellings into the canonical model.
    pub fn upgrade(self) -> ServiceConfig {
        let Self {
            mut service,
            dockerfile,
            log_driver,
            log_opt,
            net,
        } = self;

        if let Some(dockerfile) = dockerfile {
            service.build.get_or_insert_with(BuildConfig::default).dockerfile = Some(dockerfile);
        }
        if log_driver.is_some() || !log_opt.is_empty() {
            service.logging = Some(LogConfig {
                driver: log_driver,
                options: log_opt,
            });
        }
        if net.is_some() {
            service.network_mode = net;
        }
        service
    }

    /// Splits a canonical config back into legacy spellings.
    ///
    /// Used when a legacy document is layered on top of an existing config:
    /// the existing config must merge key for key with legacy options.
    pub fn downgrade(mut service: ServiceConfig) -> Self {
        let dockerfile = service.build.as_mut().and_then(|build| build.dockerfile.take());
        let (log_driver, log_opt) = service
            .logging
            .take()
            .map(|logging| (logging.driver, logging.options))
            .unwrap_or_default();
        let net = service.network_mode.take();

        Self {
            service,
            dockerfile,
            log_driver,
            log_opt,
            net,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_moves_legacy_spellings() {
        let mut log_opt = BTreeMap::new();
        let _ = log_opt.insert("max-size".to_owned(), "10m".to_owned());
        let legacy = LegacyServiceConfig {
            service: ServiceConfig {
                build: Some(BuildConfig {
                    context: ".".into(),
                    ..BuildConfig::default()
                }),
                ..ServiceConfig::default()
            },
            dockerfile: Some("Dockerfile.dev".into()),
            log_driver: Some("json-file".into()),
            log_opt,
            net: Some("host".into()),
        };

        let upgraded = legacy.upgrade();
        let build = upgraded.build.as_ref().expect("build");
        assert_eq!(build.context, ".");
        assert_eq!(build.dockerfile.as_deref(), Some("Dockerfile.dev"));
        let logging = upgraded.logging.as_ref().expect("logging");
        assert_eq!(logging.driver.as_deref(), Some("json-file"));
        assert_eq!(logging.options["max-size"], "10m");
        assert_eq!(upgraded.network_mode.as_deref(), Some("host"));
    }

    #[test]
    fn upgrade_without_legacy_options_is_identity() {
        let service = ServiceConfig {
            image: Some("foo".into()),
            restart: Some("no".into()),
            ..ServiceConfig::default()
        };
        let legacy = LegacyServiceConfig {
            service: service.clone(),
            ..LegacyServiceConfig::default()
        };
        assert_eq!(legacy.upgrade(), service);
    }

    #[test]
    fn downgrade_then_upgrade_restores_config() {
        let service = ServiceConfig {
            build: Some(BuildConfig {
                context: "./app".into(),
                dockerfile: Some("Dockerfile.prod".into()),
                ..BuildConfig::default()
            }),
            logging: Some(LogConfig {
                driver: Some("syslog".into()),
                options: BTreeMap::new(),
            }),
            network_mode: Some("bridge".into()),
            ..ServiceConfig::default()
        };

        let legacy = LegacyServiceConfig::downgrade(service.clone());
        assert_eq!(legacy.dockerfile.as_deref(), Some("Dockerfile.prod"));
        assert_eq!(legacy.net.as_deref(), Some("bridge"));
        assert!(legacy.service.logging.is_none());
        assert_eq!(legacy.upgrade(), service);
    }

    #[test]
    fn legacy_table_only_holds_legacy_options() {
        assert!(LEGACY_FIELDS.iter().all(|f| f.availability == Availability::Legacy));
    }
}
