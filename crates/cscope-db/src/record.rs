//! Project records

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One tracked source tree and where its index lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRecord {
    /// Registry key
    pub name: String,

    /// Source tree being indexed
    pub root: PathBuf,

    /// Directory holding the generated index; unique across records
    pub output: PathBuf,

    /// Generator name, resolved against the catalog when needed
    pub generator: String,

    /// Runner script inside `output`
    pub runner: PathBuf,

    /// Last generation run
    #[serde(rename = "updatedAt", with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

impl ProjectRecord {
    /// Stamp the record with the current time
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// `updatedAt` in its serialized form
    pub fn updated_at_display(&self) -> String {
        self.updated_at.format(timestamp::FORMAT).to_string()
    }
}

/// Current local time at the resolution the registry stores
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn sample() -> ProjectRecord {
        ProjectRecord {
            name: "foo".into(),
            root: "/src/foo".into(),
            output: "/out/foo".into(),
            generator: "basic".into(),
            runner: "/out/foo/cscope_db.sh".into(),
            updated_at: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["updatedAt"], "2024-03-09 14:05:00");
        assert_eq!(value["root"], "/src/foo");
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn test_rejects_unknown_field() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["extra"] = serde_json::json!(1);
        assert!(serde_json::from_value::<ProjectRecord>(value).is_err());
    }

    #[test]
    fn test_rejects_missing_field() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("generator");
        assert!(serde_json::from_value::<ProjectRecord>(value).is_err());
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["updatedAt"] = serde_json::json!("yesterday");
        assert!(serde_json::from_value::<ProjectRecord>(value).is_err());
    }

    #[test]
    fn test_touch_has_second_resolution() {
        let mut record = sample();
        record.touch();
        assert!(record.updated_at > sample().updated_at);
        assert_eq!(record.updated_at.nanosecond(), 0);
    }

    #[test]
    fn test_updated_at_display() {
        assert_eq!(sample().updated_at_display(), "2024-03-09 14:05:00");
    }
}
