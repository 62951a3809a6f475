use serde::de::{self, Deserialize, Deserializer, Visitor};
use std::fmt;

/// Fight status as reported by the server, which mixes strings and integers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FightStatus {
    Running,
    Finished,
    #[default]
    Missing,
    Unknown(String),
}

impl FightStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "finished" | "end" => FightStatus::Finished,
            "running" | "progress" => FightStatus::Running,
            _ => FightStatus::Unknown(name.to_owned()),
        }
    }
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => FightStatus::Finished,
            1 => FightStatus::Running,
            _ => FightStatus::Unknown(code.to_string()),
        }
    }
    pub fn is_finished(&self) -> bool {
        *self == FightStatus::Finished
    }
}

impl fmt::Display for FightStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FightStatus::Running => f.write_str("running"),
            FightStatus::Finished => f.write_str("finished"),
            FightStatus::Missing => f.write_str("<none>"),
            FightStatus::Unknown(ref raw) => write!(f, "{:?}", raw),
        }
    }
}

struct StatusVisitor;

impl<'de> Visitor<'de> for StatusVisitor {
    type Value = FightStatus;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a fight status string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FightStatus, E> {
        Ok(FightStatus::from_name(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FightStatus, E> {
        Ok(FightStatus::from_code(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FightStatus, E> {
        Ok(i64::try_from(v).map_or_else(|_| FightStatus::Unknown(v.to_string()), FightStatus::from_code))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FightStatus, E> {
        Ok(FightStatus::Unknown(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FightStatus, E> {
        Ok(FightStatus::Unknown(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<FightStatus, E> {
        Ok(FightStatus::Missing)
    }

    fn visit_none<E: de::Error>(self) -> Result<FightStatus, E> {
        Ok(FightStatus::Missing)
    }
}

impl<'de> Deserialize<'de> for FightStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(StatusVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::{from_str, from_value, json};

    #[test]
    fn terminal_values() {
        for raw in [json!("finished"), json!("end"), json!(2)] {
            assert_eq!(from_value::<FightStatus>(raw).unwrap(), FightStatus::Finished);
        }
    }

    #[test]
    fn in_progress_values() {
        for raw in [json!("running"), json!("progress"), json!(1)] {
            assert_eq!(from_value::<FightStatus>(raw).unwrap(), FightStatus::Running);
        }
    }

    #[test]
    fn anything_else_is_kept_raw() {
        assert_eq!(from_str::<FightStatus>("0").unwrap(), FightStatus::Unknown("0".into()));
        assert_eq!(
            from_str::<FightStatus>("\"waiting\"").unwrap(),
            FightStatus::Unknown("waiting".into())
        );
        assert_eq!(from_str::<FightStatus>("null").unwrap(), FightStatus::Missing);
        assert!(!FightStatus::Unknown("2".into()).is_finished());
    }
}
