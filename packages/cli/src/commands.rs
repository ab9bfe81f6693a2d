//! Command execution.

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use typed_settings::{
    Backend, BackendError, ConversionError, Setting, Settings, SettingsError, SettingsService,
};
use typed_settings_stores::{FileBackend, JsonFileBackend};

use crate::args::{BackendChoice, Cli, Command, ValueType};

const STORE_DIR: &str = "typed-settings";
const JSON_FILE: &str = "settings.json";

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Store error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid value: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No value stored at '{0}'")]
    NotFound(String),

    #[error("No configuration directory on this platform; pass --store")]
    NoConfigDir,

    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

/// Call `$op::<T>(..)` with the Rust type behind a `ValueType`.
macro_rules! dispatch {
    ($value_type:expr, $op:ident, $($arg:expr),*) => {
        match $value_type {
            ValueType::String => $op::<String>($($arg),*),
            ValueType::Bool => $op::<bool>($($arg),*),
            ValueType::Int => $op::<i32>($($arg),*),
            ValueType::Long => $op::<i64>($($arg),*),
            ValueType::Float => $op::<f32>($($arg),*),
            ValueType::Double => $op::<f64>($($arg),*),
            ValueType::Decimal => $op::<Decimal>($($arg),*),
            ValueType::Guid => $op::<Uuid>($($arg),*),
            ValueType::Uri => $op::<Url>($($arg),*),
            ValueType::Datetime => $op::<DateTime<Utc>>($($arg),*),
            ValueType::Json => $op::<serde_json::Value>($($arg),*),
        }
    };
}

pub type Service = SettingsService<Box<dyn Backend>>;

/// Resolve the store location and open the chosen backend.
pub fn open(store: Option<PathBuf>, choice: BackendChoice) -> Result<Service, CliError> {
    let root = match store {
        Some(root) => root,
        None => dirs::config_dir()
            .map(|dir| dir.join(STORE_DIR))
            .ok_or(CliError::NoConfigDir)?,
    };
    tracing::debug!(root = %root.display(), ?choice, "opening settings store");

    let backend: Box<dyn Backend> = match choice {
        BackendChoice::Files => Box::new(FileBackend::new(root)?),
        BackendChoice::Json => Box::new(JsonFileBackend::open(root.join(JSON_FILE))?),
    };
    Ok(SettingsService::new(backend))
}

/// Run a parsed command line, writing results to `out`.
pub fn execute(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let service = open(cli.store, cli.backend)?;
    run(&service, cli.command, out)
}

pub fn run(service: &Service, command: Command, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Get {
            key,
            value_type,
            default,
        } => {
            let text = dispatch!(value_type, get, service, &key, default.as_deref())?;
            writeln!(out, "{}", text)?;
        }
        Command::Set {
            key,
            value,
            value_type,
        } => {
            dispatch!(value_type, set, service, &key, &value)?;
        }
        Command::Remove { key } => {
            if !service.remove(&key)? {
                return Err(CliError::NotFound(key));
            }
        }
        Command::List => {
            for key in service.keys()? {
                let stored = service.with_backend(|backend| backend.get_string(&key))??;
                writeln!(out, "{} = {}", key, stored.unwrap_or_default())?;
            }
        }
    }
    Ok(())
}

/// A type the command line reads from and prints as text.
trait CliValue: Setting + Sized {
    fn parse(service: &Service, text: &str) -> Result<Self, CliError> {
        Ok(service.registry().convert(&text.to_string())?)
    }

    fn render(&self, service: &Service) -> Result<String, CliError> {
        Ok(service.registry().convert(self)?)
    }
}

impl CliValue for bool {}
impl CliValue for i32 {}
impl CliValue for i64 {}
impl CliValue for f32 {}
impl CliValue for f64 {}
impl CliValue for Decimal {}
impl CliValue for Uuid {}
impl CliValue for Url {}

impl CliValue for DateTime<Utc> {
    fn render(&self, _service: &Service) -> Result<String, CliError> {
        Ok(self.to_rfc3339())
    }
}

impl CliValue for String {
    fn parse(_service: &Service, text: &str) -> Result<Self, CliError> {
        Ok(text.to_string())
    }

    fn render(&self, _service: &Service) -> Result<String, CliError> {
        Ok(self.clone())
    }
}

impl CliValue for serde_json::Value {
    fn parse(_service: &Service, text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    fn render(&self, _service: &Service) -> Result<String, CliError> {
        Ok(self.to_string())
    }
}

fn get<T: CliValue>(
    service: &Service,
    key: &str,
    default: Option<&str>,
) -> Result<String, CliError> {
    let value = match default {
        Some(default) => {
            let default = T::parse(service, default)?;
            service.get_or_default(key, default)?
        }
        None => {
            // None is never stored, so it marks an absent or unreadable key
            match service.get_or_default::<Option<T>>(key, None)? {
                Some(value) => value,
                None => return Err(CliError::NotFound(key.to_string())),
            }
        }
    };
    value.render(service)
}

fn set<T: CliValue>(service: &Service, key: &str, text: &str) -> Result<(), CliError> {
    let value = T::parse(service, text)?;
    service.add_or_update(key, value)?;
    Ok(())
}
