use serde::{Deserialize, Serialize};

/// Origin tag attached to each log line by the app runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogSource {
    System,
    App,
    Other(String),
}

impl From<String> for LogSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SYSTEM" => LogSource::System,
            "APP" => LogSource::App,
            _ => LogSource::Other(value),
        }
    }
}

impl From<LogSource> for String {
    fn from(value: LogSource) -> Self {
        match value {
            LogSource::System => "SYSTEM".to_string(),
            LogSource::App => "APP".to_string(),
            LogSource::Other(other) => other,
        }
    }
}

impl Default for LogSource {
    fn default() -> Self {
        LogSource::Other("UNKNOWN".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, deserialize_with = "deserialize_epoch_seconds")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_source")]
    pub source: LogSource,
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: String,
}

impl LogRecord {
    pub fn new(timestamp: Option<i64>, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            source,
            message: message.into(),
        }
    }

    /// Sort key; records without a timestamp sort first.
    pub fn sort_key(&self) -> i64 {
        self.timestamp.unwrap_or(0)
    }
}

// An explicit null means the same as a missing field
fn deserialize_source<'de, D>(deserializer: D) -> Result<LogSource, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let source: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(source.map(LogSource::from).unwrap_or_default())
}

fn deserialize_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let message: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(message.unwrap_or_default())
}

// Epoch seconds arrive as integers or floats depending on the producer
fn deserialize_epoch_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct EpochVisitor;

    impl<'de> de::Visitor<'de> for EpochVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("epoch seconds as an integer or float")
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(i64::try_from(v).ok())
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.trunc() as i64))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(EpochVisitor)
}
