extern crate serde;
extern crate serde_json;

mod model;
mod status;

pub use model::*;
pub use status::FightStatus;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

pub type Result<T> = serde_json::Result<T>;
pub type Error = serde_json::Error;

pub type FarmerId = u64;
pub type LeekId = u64;
pub type FightId = u64;

pub const DEFAULT_BASE_URL: &str = "https://leekwars.com/api/";

pub const SESSION_COOKIE: &str = "PHPSESSID";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    LoginToken,
    FarmerFromToken,
    FarmerOpponents,
    LeekOpponents(LeekId),
    Leek(LeekId),
    StartSoloFight,
    Fight(FightId),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match *self {
            Endpoint::LoginToken => "farmer/login-token".to_owned(),
            Endpoint::FarmerFromToken => "farmer/get-from-token".to_owned(),
            Endpoint::FarmerOpponents => "garden/get-farmer-opponents".to_owned(),
            Endpoint::LeekOpponents(id) => format!("garden/get-leek-opponents/{}", id),
            Endpoint::Leek(id) => format!("leek/get/{}", id),
            Endpoint::StartSoloFight => "garden/start-solo-fight".to_owned(),
            Endpoint::Fight(id) => format!("fight/get/{}", id),
        }
    }
    pub fn method(&self) -> Method {
        match *self {
            Endpoint::LoginToken | Endpoint::StartSoloFight => Method::Post,
            _ => Method::Get,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub type Params = Vec<(&'static str, String)>;

pub fn login_params(login: &str, password: &str) -> Params {
    vec![
        ("login", login.to_owned()),
        ("password", password.to_owned()),
        ("keep_connected", true.to_string()),
    ]
}

pub fn start_fight_params(leek: LeekId, target: Option<LeekId>) -> Params {
    let mut params = vec![("leek_id", leek.to_string())];
    if let Some(target) = target {
        params.push(("target_id", target.to_string()));
    }
    params
}

/// Authentication material extracted from the cookies set by a login.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pub php_session_id: Option<String>,
    pub token: Option<String>,
}

impl SessionCookies {
    pub fn recognize<'a, I>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut found = SessionCookies::default();
        for (name, value) in cookies {
            if name == SESSION_COOKIE {
                found.php_session_id = Some(value.to_owned());
            } else if name.to_ascii_lowercase().contains("token") {
                found.token = Some(value.to_owned());
            }
        }
        found
    }
    pub fn is_authenticated(&self) -> bool {
        self.php_session_id.is_some()
    }
}

pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value)
}

/// The farmer is optional in login and token answers.
pub fn decode_farmer(value: &Value) -> Result<Option<Farmer>> {
    match value.get("farmer") {
        None | Some(Value::Null) => Ok(None),
        Some(farmer) => decode(farmer).map(Some),
    }
}

/// Fight lookups answer either `{"fight": {...}}` or the bare fight object.
pub fn decode_fight(value: &Value) -> Result<Fight> {
    match value.get("fight") {
        Some(inner) if inner.is_object() => decode(inner),
        _ => decode(value),
    }
}

pub fn truncated(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::LeekOpponents(34872).path(), "garden/get-leek-opponents/34872");
        assert_eq!(Endpoint::Fight(7).path(), "fight/get/7");
        assert_eq!(Endpoint::LoginToken.method(), Method::Post);
        assert_eq!(Endpoint::StartSoloFight.method(), Method::Post);
        assert_eq!(Endpoint::Fight(7).method(), Method::Get);
    }

    #[test]
    fn start_fight_without_target() {
        assert_eq!(start_fight_params(3, None), vec![("leek_id", "3".to_owned())]);
        assert_eq!(start_fight_params(3, Some(9)).len(), 2);
    }

    #[test]
    fn login_sends_boolean_flag() {
        let params = login_params("me", "secret");
        assert!(params.contains(&("keep_connected", "true".to_owned())));
    }

    #[test]
    fn recognize_cookies() {
        let cookies = SessionCookies::recognize(vec![
            ("lang", "fr"),
            ("PHPSESSID", "abc"),
            ("farmer_Token", "xyz"),
        ]);
        assert!(cookies.is_authenticated());
        assert_eq!(cookies.token.as_deref(), Some("xyz"));
        assert!(!SessionCookies::recognize(vec![("token", "xyz")]).is_authenticated());
    }

    #[test]
    fn fight_wrapped_or_flat() {
        let wrapped = decode_fight(&json!({"fight": {"id": 4, "status": 2, "winner": 1}})).unwrap();
        let flat = decode_fight(&json!({"id": 4, "status": "finished", "winner": 1})).unwrap();
        assert_eq!(wrapped.status, FightStatus::Finished);
        assert_eq!(flat.status, FightStatus::Finished);
        assert_eq!(wrapped.winner, Some(1));
    }

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncated("défaite", 2), "dé");
        assert_eq!(truncated("abc", 20), "abc");
    }
}
