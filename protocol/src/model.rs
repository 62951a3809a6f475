use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::{FarmerId, FightId, FightStatus, LeekId};

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Farmer {
    #[serde(default)]
    pub id: FarmerId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub talent: Option<i64>,
    #[serde(default, deserialize_with = "leek_roster")]
    pub leeks: BTreeMap<LeekId, Leek>,
}

impl Farmer {
    /// The roster entry with the highest level, lowest id on ties.
    pub fn strongest_leek(&self) -> Option<&Leek> {
        self.leeks
            .values()
            .fold(None, |best: Option<&Leek>, leek| match best {
                Some(b) if b.level.unwrap_or(0) >= leek.level.unwrap_or(0) => Some(b),
                _ => Some(leek),
            })
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Leek {
    pub id: LeekId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub level: Option<u32>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub talent: Option<i64>,
}

impl fmt::Display for Leek {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (Lvl.", display_or(&self.name, "Unknown"))?;
        write_opt(f, self.level)?;
        f.write_str(", Talent: ")?;
        write_opt(f, self.talent)?;
        write!(f, ") #{}", self.id)
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Opponent {
    pub id: LeekId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub talent: Option<i64>,
}

impl Opponent {
    /// Opponents without a talent rank last when looking for the weakest.
    pub const UNKNOWN_TALENT: i64 = 999_999;

    pub fn talent_or_unknown(&self) -> i64 {
        self.talent.unwrap_or(Self::UNKNOWN_TALENT)
    }
}

/// The garden answers with either `opponents` or `leeks`. Entries that do
/// not decode are dropped, the rest of the list is kept.
#[derive(Deserialize, Debug, Default)]
pub struct OpponentsResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub opponents: Option<Vec<Opponent>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub leeks: Option<Vec<Opponent>>,
}

impl OpponentsResponse {
    pub fn into_opponents(self) -> Vec<Opponent> {
        self.opponents.or(self.leeks).unwrap_or_default()
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct LeekResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub level: Option<u32>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub talent: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct StartFightResponse {
    #[serde(default)]
    pub fight: Option<FightId>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FightError {
    TargetNotInGarden,
    WrongToken,
    Other(String),
}

impl From<String> for FightError {
    fn from(code: String) -> Self {
        match code.as_str() {
            "error_fight_target_not_in_garden" => FightError::TargetNotInGarden,
            "wrong_token" => FightError::WrongToken,
            _ => FightError::Other(code),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartFight {
    Started(FightId),
    Rejected(FightError),
    Unrecognized,
}

impl From<StartFightResponse> for StartFight {
    fn from(response: StartFightResponse) -> Self {
        match (response.fight, response.error) {
            (Some(id), _) => StartFight::Started(id),
            (None, Some(code)) => StartFight::Rejected(code.into()),
            (None, None) => StartFight::Unrecognized,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Fight {
    #[serde(default)]
    pub id: Option<FightId>,
    #[serde(default)]
    pub status: FightStatus,
    #[serde(default)]
    pub winner: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

impl Fight {
    /// Winner 1 is the side of the leek that started the fight.
    pub fn outcome(&self) -> Outcome {
        if self.winner == Some(1) {
            Outcome::Victory
        } else {
            Outcome::Defeat
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Roster {
    ById(BTreeMap<String, Value>),
    List(Vec<Value>),
    Missing(()),
}

/// Keyed entries without an `id` take it from their key; entries that still
/// do not decode are skipped.
fn leek_roster<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<LeekId, Leek>, D::Error> {
    let entries: Vec<(Option<LeekId>, Value)> = match Roster::deserialize(d)? {
        Roster::ById(map) => map.into_iter().map(|(k, v)| (k.parse().ok(), v)).collect(),
        Roster::List(list) => list.into_iter().map(|v| (None, v)).collect(),
        Roster::Missing(()) => Vec::new(),
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, mut entry)| {
            if let (Some(id), Some(fields)) = (key, entry.as_object_mut()) {
                fields.entry("id").or_insert_with(|| id.into());
            }
            Leek::deserialize(entry).ok()
        })
        .map(|l| (l.id, l))
        .collect())
}

fn lenient_list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Vec<Value>>::deserialize(d)?
        .map(|list| list.into_iter().filter_map(|v| T::deserialize(v).ok()).collect()))
}

/// Integers, floats (truncated) and numeric strings; anything else is absent.
fn number(v: &Value) -> Option<i64> {
    match *v {
        Value::Number(ref n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(ref s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(number))
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(number)
        .and_then(|n| u32::try_from(n).ok()))
}

fn display_or<'a>(s: &'a str, default: &'a str) -> &'a str {
    if s.is_empty() {
        default
    } else {
        s
    }
}

fn write_opt<T: fmt::Display>(f: &mut fmt::Formatter, v: Option<T>) -> fmt::Result {
    match v {
        Some(v) => write!(f, "{}", v),
        None => f.write_str("?"),
    }
}
