//! # fritzconfig
//!
//! Configuration for the fritzupnp tools:
//! - an embedded default YAML document
//! - merged with an optional `config.yaml` from the configuration directory
//! - `FRITZUPNP_CONFIG__` environment variable overrides
//! - typed getters with defaults
//!
//! ## Usage
//!
//! ```no_run
//! use fritzconfig::Config;
//!
//! let config = Config::load_config("")?;
//!
//! let address = config.get_gateway_address();
//! let port = config.get_gateway_port();
//! println!("{}:{}", address, port);
//!
//! config.set_gateway_port(49443)?;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::Duration,
};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = include_str!("fritzupnp.yaml");

const ENV_CONFIG_DIR: &str = "FRITZUPNP_CONFIG";
const ENV_PREFIX: &str = "FRITZUPNP_CONFIG__";
const CONFIG_DIR_NAME: &str = ".fritzupnp";
const CONFIG_FILE_NAME: &str = "config.yaml";

const DEFAULT_GATEWAY_ADDRESS: &str = "fritz.box";
const DEFAULT_GATEWAY_PORT: u16 = 49000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// Generate a getter/setter pair for a string value with a default.
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) => s,
                Ok(Value::Number(n)) => n.to_string(),
                Ok(Value::Bool(b)) => b.to_string(),
                Ok(Value::Null) => $default.to_string(),
                Ok(_) => {
                    warn!(path = %$path.join("."), "Not a string, using default");
                    $default.to_string()
                }
                Err(_) => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: &str) -> Result<()> {
            self.set_value($path, Value::String(value.to_string()))
        }
    };
}

/// Configuration of the gateway connection and of the tools.
///
/// A `Config` is loaded once and passed to whoever needs it.
#[derive(Debug)]
pub struct Config {
    config_dir: PathBuf,
    path: PathBuf,
    data: Mutex<Value>,
}

impl Config {
    /// Loads the configuration, with overrides from the process environment.
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `FRITZUPNP_CONFIG` environment variable
    /// 3. `.fritzupnp` in the current directory
    /// 4. `.fritzupnp` in the user's home directory
    ///
    /// A missing `config.yaml` is not an error: the embedded defaults are
    /// used alone.
    pub fn load_config(directory: &str) -> Result<Self> {
        Self::load_with_env(directory, env::vars())
    }

    /// Same as [`Config::load_config`] with an explicit set of environment
    /// variables.
    pub fn load_with_env<I>(directory: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let env_dir = vars
            .iter()
            .find(|(key, _)| key == ENV_CONFIG_DIR)
            .map(|(_, value)| value.clone());

        let config_dir = Self::find_config_dir(directory, env_dir);
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join(CONFIG_FILE_NAME);

        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external_value: Value = serde_yaml::from_slice(&data)
                    .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
                merge_yaml(&mut config_value, &Self::lower_keys_value(external_value));
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using defaults");
            }
        }

        let mut config_value = Self::lower_keys_value(config_value);
        Self::apply_env_overrides(&mut config_value, &vars);

        Ok(Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        })
    }

    fn find_config_dir(directory: &str, env_dir: Option<String>) -> PathBuf {
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        if let Some(env_path) = env_dir.filter(|p| !p.is_empty()) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn data(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    /// Writes the current configuration to `config.yaml`, creating the
    /// configuration directory if needed.
    pub fn save(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        if !self.config_dir.is_dir() {
            return Err(anyhow!(
                "{} is not a directory",
                self.config_dir.display()
            ));
        }

        let yaml = serde_yaml::to_string(&*self.data()?)?;
        fs::write(&self.path, yaml)?;
        info!(config_file = %self.path.display(), "Saved config file");
        Ok(())
    }

    /// Sets the value at `path` (e.g. `&["gateway", "port"]`). Missing
    /// intermediate maps are created. The file is not written until
    /// [`Config::save`] is called.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data()?;
        Self::set_value_internal(&mut data, path, value)
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        let Some((first, rest)) = path.split_first() else {
            *data = value;
            return Ok(());
        };

        if let Value::Mapping(map) = data {
            let key = Value::String(first.to_lowercase());
            if rest.is_empty() {
                map.insert(key, value);
            } else {
                let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, rest, value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets the value at `path`. Keys are matched case-insensitively.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data()?;
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                match map.get(&Value::String(key.to_lowercase())) {
                    Some(next) => current = next,
                    None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
                }
            } else {
                return Err(anyhow!("Path {} is not a map", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value, vars: &[(String, String)]) {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path: Vec<&str> = stripped.split("__").collect();
                let yaml_value = Self::convert_env_value(value);
                if let Err(err) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var = %key, error = %err, "Ignoring environment override");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(k, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    impl_string_config!(
        get_gateway_address,
        set_gateway_address,
        &["gateway", "address"],
        DEFAULT_GATEWAY_ADDRESS
    );

    impl_string_config!(get_username, set_username, &["gateway", "username"], "");

    impl_string_config!(get_password, set_password, &["gateway", "password"], "");

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["log", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    /// Gets the TR-64 port of the gateway, 49000 when unset or invalid.
    pub fn get_gateway_port(&self) -> u16 {
        match self.get_value(&["gateway", "port"]) {
            Ok(Value::Number(n)) => match n.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => port,
                None => {
                    warn!("Invalid gateway port {}, using default {}", n, DEFAULT_GATEWAY_PORT);
                    DEFAULT_GATEWAY_PORT
                }
            },
            Ok(Value::String(s)) => s.parse::<u16>().unwrap_or_else(|_| {
                warn!("Invalid gateway port '{}', using default {}", s, DEFAULT_GATEWAY_PORT);
                DEFAULT_GATEWAY_PORT
            }),
            Ok(_) | Err(_) => DEFAULT_GATEWAY_PORT,
        }
    }

    pub fn set_gateway_port(&self, port: u16) -> Result<()> {
        self.set_value(&["gateway", "port"], Value::Number(Number::from(port)))
    }

    /// Gets the per-request HTTP timeout, 30 seconds when unset or invalid.
    pub fn get_http_timeout(&self) -> Duration {
        let secs = match self.get_value(&["gateway", "timeout_secs"]) {
            Ok(Value::Number(n)) => n.as_u64().filter(|s| *s > 0),
            Ok(Value::String(s)) => s.parse::<u64>().ok().filter(|s| *s > 0),
            Ok(_) | Err(_) => Some(DEFAULT_TIMEOUT_SECS),
        };

        Duration::from_secs(secs.unwrap_or_else(|| {
            warn!("Invalid HTTP timeout, using default {}s", DEFAULT_TIMEOUT_SECS);
            DEFAULT_TIMEOUT_SECS
        }))
    }

    pub fn set_http_timeout(&self, timeout: Duration) -> Result<()> {
        self.set_value(
            &["gateway", "timeout_secs"],
            Value::Number(Number::from(timeout.as_secs())),
        )
    }
}

/// Merges `external` into `default`: mappings are merged key by key,
/// scalars and sequences are replaced.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
