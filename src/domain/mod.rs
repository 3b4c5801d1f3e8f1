use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::GatewayError;

/// One result row: field name -> value, in projection order.
pub type Row = serde_json::Map<String, Value>;

/// Parameters for opening the single gateway connection.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub database: Option<String>,
}

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Per-field fallbacks for `connect_db`, usually taken from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectDefaults {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

/// `connect_db` arguments as sent by the caller. Empty strings count as
/// absent and fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl ConnectDefaults {
    pub fn is_complete(&self) -> bool {
        non_empty(&self.host).is_some() && non_empty(&self.user).is_some()
    }

    pub fn resolve(&self, args: ConnectArgs) -> ConnectParams {
        fn pick(arg: Option<String>, fallback: &Option<String>) -> Option<String> {
            non_empty(&arg).or_else(|| non_empty(fallback))
        }
        ConnectParams {
            host: pick(args.host, &self.host).unwrap_or_default(),
            port: args.port.or(self.port).unwrap_or(DEFAULT_MYSQL_PORT),
            user: pick(args.user, &self.user).unwrap_or_default(),
            password: pick(args.password, &self.password).unwrap_or_default(),
            database: pick(args.database, &self.database),
        }
    }
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

/// Bind values forwarded untouched to the driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BindParams {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(serde_json::Map<String, Value>),
}

impl BindParams {
    /// `null`/absent means no binds, an array is positional and an object is
    /// named. Anything else is a caller mistake.
    pub fn from_json(v: Option<&Value>) -> Result<Self, GatewayError> {
        match v {
            None | Some(Value::Null) => Ok(BindParams::None),
            Some(Value::Array(items)) if items.is_empty() => Ok(BindParams::None),
            Some(Value::Array(items)) => Ok(BindParams::Positional(items.clone())),
            Some(Value::Object(map)) => Ok(BindParams::Named(map.clone())),
            Some(other) => Err(GatewayError::invalid_params(format!(
                "bind parameters must be an array or an object, got {other}"
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BindParams::None)
    }
}

/// Column definition used to build a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub sql_type: String,
    #[serde(default, alias = "notNull")]
    pub not_null: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default, alias = "autoIncrement")]
    pub auto_increment: bool,
    #[serde(default, alias = "primaryKey")]
    pub primary_key: bool,
}

impl ColumnSpec {
    /// Default clause text. Strings are emitted verbatim so callers can pass
    /// expressions such as `CURRENT_TIMESTAMP`; an empty string means none.
    pub fn default_clause(&self) -> Option<String> {
        match self.default.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(if *b { "TRUE".into() } else { "FALSE".into() }),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UniqueKey {
    pub name: String,
    pub columns: KeyColumns,
}

/// Unique-key columns given either as `"a, b"` or `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum KeyColumns {
    Joined(String),
    List(Vec<String>),
}

impl KeyColumns {
    pub fn render(&self) -> String {
        match self {
            KeyColumns::Joined(s) => s.clone(),
            KeyColumns::List(cols) => cols.join(", "),
        }
    }
}
