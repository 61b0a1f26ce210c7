//! System-wide constants and default file names.

/// Compose file loaded when no file is given explicitly.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Override file layered on top of the default compose file when present.
pub const DEFAULT_OVERRIDE_FILE: &str = "docker-compose.override.yml";

/// Environment variable listing compose files to load.
pub const COMPOSE_FILE_ENV: &str = "COMPOSE_FILE";

/// Separator between entries of [`COMPOSE_FILE_ENV`].
#[cfg(windows)]
pub const COMPOSE_FILE_SEPARATOR: char = ';';

/// Separator between entries of [`COMPOSE_FILE_ENV`].
#[cfg(not(windows))]
pub const COMPOSE_FILE_SEPARATOR: char = ':';

/// Value of the top-level `version` key selecting the structured schema.
pub const STRUCTURED_VERSION: &str = "2";

/// Application name used in CLI output and derived project names.
pub const APP_NAME: &str = "berth";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "berth";
