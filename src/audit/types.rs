//! Data structures representing CloudTrail audit records.
//!
//! CloudTrail delivers each log object as a JSON document whose `Records`
//! array holds one object per API call or sign-in. Only a handful of fields
//! drive detection, so a record keeps the raw JSON object and exposes typed
//! accessors over it. Missing or mistyped fields read as absent instead of
//! failing the whole record.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Event name CloudTrail uses for interactive console sign-ins.
pub const CONSOLE_LOGIN: &str = "ConsoleLogin";

/// Kind of principal that performed a recorded action.
///
/// Mirrors the `userIdentity.type` field. Values this crate does not know
/// about are kept verbatim in [`IdentityType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IdentityType {
    Root,
    IamUser,
    AssumedRole,
    AwsService,
    Other(String),
}

impl IdentityType {
    pub fn parse(value: &str) -> Self {
        match value {
            "Root" => Self::Root,
            "IAMUser" => Self::IamUser,
            "AssumedRole" => Self::AssumedRole,
            "AWSService" => Self::AwsService,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Root => "Root",
            Self::IamUser => "IAMUser",
            Self::AssumedRole => "AssumedRole",
            Self::AwsService => "AWSService",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged action from a CloudTrail `Records` array.
///
/// The record is immutable once parsed. All accessors tolerate absent data:
/// a record without `userIdentity` simply has no identity type and no user
/// name.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    raw: Value,
}

impl AuditRecord {
    /// Wraps one element of the `Records` array.
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// The full JSON object as delivered, used for alert bodies.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("eventName")?.as_str()
    }

    pub fn identity_type(&self) -> Option<IdentityType> {
        self.identity()?
            .get("type")?
            .as_str()
            .map(IdentityType::parse)
    }

    /// `userIdentity.userName`, or `None` when missing, null or empty.
    pub fn user_name(&self) -> Option<&str> {
        self.identity()?
            .get("userName")?
            .as_str()
            .filter(|name| !name.is_empty())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.raw.get("errorMessage")?.as_str()
    }

    /// Whether `responseElements` carries a payload.
    ///
    /// Null, missing and empty values (`{}`, `[]`, `""`, `false`, `0`) all
    /// count as no payload.
    pub fn has_response_payload(&self) -> bool {
        self.raw.get("responseElements").is_some_and(is_truthy)
    }

    pub fn is_console_login(&self) -> bool {
        self.event_name() == Some(CONSOLE_LOGIN)
    }

    fn identity(&self) -> Option<&Value> {
        self.raw.get("userIdentity").filter(|v| v.is_object())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
