use std::fmt;
use std::time::Duration;

use humantime::parse_duration;
use serde::de::{self, Visitor};
use serde_with::DeserializeAs;

/// Duration written either in humantime syntax (`"4s"`, `"500ms"`) or as a
/// bare number of milliseconds (`4000`).
pub(super) struct FlexibleDuration;

struct FlexibleDurationVisitor;

impl Visitor<'_> for FlexibleDurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as \"4s\" or a number of milliseconds")
    }

    fn visit_u64<E: de::Error>(self, millis: u64) -> Result<Duration, E> {
        Ok(Duration::from_millis(millis))
    }

    fn visit_i64<E: de::Error>(self, millis: i64) -> Result<Duration, E> {
        u64::try_from(millis)
            .map(Duration::from_millis)
            .map_err(|_| E::custom(format!("negative duration: {millis}ms")))
    }

    fn visit_str<E: de::Error>(self, raw: &str) -> Result<Duration, E> {
        let raw = raw.trim();
        if let Ok(millis) = raw.parse::<u64>() {
            return Ok(Duration::from_millis(millis));
        }
        parse_duration(raw).map_err(E::custom)
    }
}

impl<'de> DeserializeAs<'de, Duration> for FlexibleDuration {
    fn deserialize_as<D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(FlexibleDurationVisitor)
    }
}
