//! Serde helper for `Duration` fields written as whole milliseconds.
//!
//! ```ignore
//! #[serde(rename = "interval_ms", with = "feed_model::millis")]
//! pub interval: Duration,
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Delay {
        #[serde(with = "crate::millis")]
        wait: Duration,
    }

    #[test]
    fn test_written_as_whole_millis() {
        let delay = Delay {
            wait: Duration::from_micros(1_500_900),
        };
        assert_eq!(serde_json::to_string(&delay).unwrap(), r#"{"wait":1500}"#);

        let parsed: Delay = serde_json::from_str(r#"{"wait":250}"#).unwrap();
        assert_eq!(parsed.wait, Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_negative() {
        assert!(serde_json::from_str::<Delay>(r#"{"wait":-1}"#).is_err());
    }
}
