use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The three hierarchical levels that may declare non-working dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeLevel {
    Business,
    Commerce,
    Queue,
}

impl ScopeLevel {
    pub const ALL: [ScopeLevel; 3] = [ScopeLevel::Business, ScopeLevel::Commerce, ScopeLevel::Queue];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeLevel::Business => "business",
            ScopeLevel::Commerce => "commerce",
            ScopeLevel::Queue => "queue",
        }
    }
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScopeLevel(pub String);

impl fmt::Display for UnknownScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown scope '{}' (expected business, commerce or queue)",
            self.0
        )
    }
}

impl std::error::Error for UnknownScopeLevel {}

impl FromStr for ScopeLevel {
    type Err = UnknownScopeLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(ScopeLevel::Business),
            "commerce" => Ok(ScopeLevel::Commerce),
            "queue" => Ok(ScopeLevel::Queue),
            other => Err(UnknownScopeLevel(other.to_string())),
        }
    }
}

/// Service configuration carried by a business, commerce or queue entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    /// Declared closure dates. Non-string entries are dropped on ingestion.
    #[serde(default, deserialize_with = "lenient_dates")]
    pub non_working_dates: Vec<String>,
}

/// One exclusion scope, shaped like the entity records fetched from the backend.
/// Fields other than `serviceInfo` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionScope {
    #[serde(
        default,
        deserialize_with = "lenient_service_info",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_info: Option<ServiceInfo>,
}

impl ExclusionScope {
    pub fn with_dates<I, S>(dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service_info: Some(ServiceInfo {
                non_working_dates: dates.into_iter().map(Into::into).collect(),
            }),
        }
    }

    /// Declared dates, in declaration order, without any pattern filtering.
    pub fn declared_dates(&self) -> &[String] {
        self.service_info
            .as_ref()
            .map(|info| info.non_working_dates.as_slice())
            .unwrap_or(&[])
    }

    pub fn add_date(&mut self, date: impl Into<String>) {
        self.service_info
            .get_or_insert_with(ServiceInfo::default)
            .non_working_dates
            .push(date.into());
    }
}

/// Caller-side holder for the three optional inputs of one aggregation query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionScopes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<ExclusionScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commerce: Option<ExclusionScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<ExclusionScope>,
}

impl ExclusionScopes {
    pub fn get(&self, level: ScopeLevel) -> Option<&ExclusionScope> {
        match level {
            ScopeLevel::Business => self.business.as_ref(),
            ScopeLevel::Commerce => self.commerce.as_ref(),
            ScopeLevel::Queue => self.queue.as_ref(),
        }
    }

    fn slot_mut(&mut self, level: ScopeLevel) -> &mut Option<ExclusionScope> {
        match level {
            ScopeLevel::Business => &mut self.business,
            ScopeLevel::Commerce => &mut self.commerce,
            ScopeLevel::Queue => &mut self.queue,
        }
    }

    pub fn set(&mut self, level: ScopeLevel, scope: ExclusionScope) {
        *self.slot_mut(level) = Some(scope);
    }

    /// Returns the removed scope, if one was present.
    pub fn clear(&mut self, level: ScopeLevel) -> Option<ExclusionScope> {
        self.slot_mut(level).take()
    }

    /// Appends a date to the scope at `level`, creating the scope if needed.
    pub fn add_date(&mut self, level: ScopeLevel, date: impl Into<String>) {
        self.slot_mut(level)
            .get_or_insert_with(ExclusionScope::default)
            .add_date(date);
    }

    /// Present scopes in business, commerce, queue order.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeLevel, &ExclusionScope)> {
        ScopeLevel::ALL
            .into_iter()
            .filter_map(move |level| self.get(level).map(|scope| (level, scope)))
    }

    pub fn is_empty(&self) -> bool {
        self.business.is_none() && self.commerce.is_none() && self.queue.is_none()
    }
}

/// Whether `value` has the fixed-width `YYYY-MM-DD` shape.
pub fn is_date_key(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, b)| match idx {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn lenient_dates<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let dates = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(date) => Some(date),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(dates)
}

fn lenient_service_info<'de, D>(deserializer: D) -> Result<Option<ServiceInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_shape() {
        assert!(is_date_key("2024-12-25"));
        assert!(is_date_key("0000-00-00"));
        assert!(!is_date_key("2024-1-05"));
        assert!(!is_date_key("2024/12/25"));
        assert!(!is_date_key("2024-12-25T00:00:00Z"));
        assert!(!is_date_key(""));
        assert!(!is_date_key("２０２４-12-25"));
    }

    #[test]
    fn scope_level_parses_case_insensitively() {
        assert_eq!("Queue".parse::<ScopeLevel>().unwrap(), ScopeLevel::Queue);
        assert_eq!(
            " business ".parse::<ScopeLevel>().unwrap(),
            ScopeLevel::Business
        );
        assert!("store".parse::<ScopeLevel>().is_err());
    }
}
