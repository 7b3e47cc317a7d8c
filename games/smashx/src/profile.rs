//! Player profile returned by `GET /api/smashx/player-profile`.
//!
//! The API is inconsistent about numbers: balances arrive as decimal strings
//! and per-tap values sometimes do too, so numeric fields go through lenient
//! deserializers.

use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerProfile {
    #[serde(deserialize_with = "deserialize_f64")]
    pub balance: f64,
    pub player_level: PlayerLevel,
    pub active_monster: ActiveMonster,
    #[serde(default)]
    pub active_boost: Option<ActiveBoost>,
}

impl PlayerProfile {
    pub fn monster(&self) -> &Monster {
        &self.active_monster.monster
    }

    /// Coins credited by one successful claim.
    pub fn earned_coin_count(&self) -> u64 {
        self.active_monster.monster.random_coin_per_tap
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerLevel {
    pub level_name: String,
    #[serde(deserialize_with = "deserialize_u64")]
    pub level_id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActiveMonster {
    pub monster: Monster,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Monster {
    pub name: String,
    #[serde(deserialize_with = "deserialize_u64")]
    pub coin_per_tap: u64,
    #[serde(deserialize_with = "deserialize_u64")]
    pub random_coin_per_tap: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActiveBoost {
    #[serde(deserialize_with = "deserialize_f64")]
    pub multiplier: f64,
    pub active_to: String,
}

fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct U64Visitor;

    impl<'de> serde::de::Visitor<'de> for U64Visitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a non-negative integer or a string holding one")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let value = value.trim();
            match u64::from_str(value) {
                Ok(n) => Ok(n),
                Err(_) => f64::from_str(value)
                    .map_err(|_| E::custom("invalid u64"))
                    .and_then(whole_number),
            }
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u64::try_from(value).map_err(|_| E::custom("negative u64"))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            whole_number(value)
        }
    }

    deserializer.deserialize_any(U64Visitor)
}

fn whole_number<E: serde::de::Error>(value: f64) -> Result<u64, E> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as u64)
    } else {
        Err(E::custom("expected a whole non-negative number"))
    }
}

fn deserialize_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct F64Visitor;

    impl<'de> serde::de::Visitor<'de> for F64Visitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or a string holding one")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            f64::from_str(value.trim()).map_err(|_| E::custom("invalid number"))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }
    }

    deserializer.deserialize_any(F64Visitor)
}
