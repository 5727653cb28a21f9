use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

pub const MIN_STAMPS: i64 = 1;
pub const MAX_STAMPS: i64 = 100;

/// Image used when a prize is created without one: a 400x300 SVG card reading "Prize Image".
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iNDAwIiBoZWlnaHQ9IjMwMCIgdmlld0JveD0iMCAwIDQwMCAzMDAiIGZpbGw9Im5vbmUiIHhtbG5zPSJodHRwOi8vd3d3LnczLm9yZy8yMDAwL3N2ZyI+CjxyZWN0IHdpZHRoPSI0MDAiIGhlaWdodD0iMzAwIiBmaWxsPSIjNEYzOUZGIi8+CjxwYXRoIGQ9Im0xNjAgMTMwIDQwIDM0LTQwIDM0IDE2IDEwIDI0LTM0IDI0IDM0IDE2LTEwem0wLTI0IDQ4IDQwIDQ4LTQwLTQ4LTQwLTQ4IDQweiIgZmlsbD0iI0ZGRiIvPgo8dGV4dCB4PSIyMDAiIHk9IjIwMCIgZmlsbD0iI0ZGRiIgZm9udC1mYW1pbHk9InNhbnMtc2VyaWYiIGZvbnQtc2l6ZT0iMTYiIHRleHQtYW5jaG9yPSJtaWRkbGUiPlByaXplIEltYWdlPC90ZXh0Pgo8L3N2Zz4K";

/// A redeemable reward.
///
/// Serialized with camelCase keys; the stored blob is a JSON array of these.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub required_stamps: i64,
    pub is_redeemed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Create payload. Every field is optional on the wire so that absence is a
/// validation failure rather than a decode failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrizeInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub required_stamps: Option<i64>,
}

/// Partial update. Keys other than these (id, timestamps, unknown) are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrizeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_stamps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_redeemed: Option<bool>,
}

/// Gallery filter over redemption state.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Available,
    Redeemed,
}

impl StatusFilter {
    pub fn matches(self, prize: &Prize) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => !prize.is_redeemed,
            StatusFilter::Redeemed => prize.is_redeemed,
        }
    }
}

fn present(s: &Option<String>) -> bool {
    s.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

impl PrizeInput {
    /// Presence of name/description/requiredStamps, then the stamp range.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !present(&self.name) || !present(&self.description) {
            return Err(ModelError::MissingFields);
        }
        let stamps = self.required_stamps.ok_or(ModelError::MissingFields)?;
        if !(MIN_STAMPS..=MAX_STAMPS).contains(&stamps) {
            return Err(ModelError::StampsOutOfRange { min: MIN_STAMPS, max: MAX_STAMPS });
        }
        Ok(())
    }

    /// Validate and build a fresh record with a new id, the placeholder image
    /// when none was given, and both timestamps set to `now`.
    pub fn into_prize(self, now: DateTime<Utc>) -> Result<Prize, ModelError> {
        self.validate()?;
        let (Some(name), Some(description), Some(required_stamps)) =
            (self.name, self.description, self.required_stamps)
        else {
            return Err(ModelError::MissingFields);
        };
        let image = self
            .image
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        Ok(Prize {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            image,
            required_stamps,
            is_redeemed: false,
            created_at: now,
            updated_at: now,
        })
    }
}

impl PrizeUpdate {
    /// True when the body named none of the updatable fields.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.required_stamps.is_none()
            && self.is_redeemed.is_none()
    }

    /// Shallow merge over `prize`. Values are taken as-is; no range checks.
    pub fn apply_to(self, prize: &mut Prize) {
        if let Some(v) = self.name {
            prize.name = v;
        }
        if let Some(v) = self.description {
            prize.description = v;
        }
        if let Some(v) = self.image {
            prize.image = v;
        }
        if let Some(v) = self.required_stamps {
            prize.required_stamps = v;
        }
        if let Some(v) = self.is_redeemed {
            prize.is_redeemed = v;
        }
    }
}

/// Current time at millisecond precision, the resolution timestamps are stored at.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A timestamp strictly after `prev`, normally `now_millis()`.
pub fn next_after(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_millis();
    if now > prev {
        now
    } else {
        prev + Duration::milliseconds(1)
    }
}

/// `2026-01-01T00:00:00.000Z`: fixed width, so lexical order is time order.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
