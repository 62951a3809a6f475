use crate::clock::Clock;
use crate::error::{ApiError, Result};
use crate::transport::{Request, Transport};
use leekbot_protocol::*;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub relogin_delay: Duration,
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            relogin_delay: Duration::from_secs(2),
            rate_limit_cooldown: Duration::from_secs(15),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub cookies: SessionCookies,
    pub farmer: Option<Farmer>,
}

pub struct ApiClient<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
    session: Option<Session>,
}

impl<T: Transport, C: Clock> ApiClient<T, C> {
    pub fn new(transport: T, clock: C, base_url: &str, credentials: Credentials) -> Self {
        let mut base_url = base_url.to_owned();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        ApiClient {
            transport,
            clock,
            base_url,
            credentials,
            retry: RetryPolicy::default(),
            session: None,
        }
    }
    pub fn clock(&self) -> &C {
        &self.clock
    }
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn request(&self, endpoint: &Endpoint, params: Params) -> Request {
        Request {
            method: endpoint.method(),
            url: format!("{}{}", self.base_url, endpoint.path()),
            params,
        }
    }

    pub fn login(&mut self) -> Result<&Session> {
        info!("logging in as {}", self.credentials.login);
        self.session = None;
        self.transport.clear_cookies();
        let request = self.request(
            &Endpoint::LoginToken,
            login_params(&self.credentials.login, &self.credentials.password),
        );
        let response = self.transport.send(&request)?;
        info!("login status: {}", response.status);
        debug!("login response: {}", truncated(&response.body, 200));
        if response.status != 200 {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }
        let body: Value = serde_json::from_str(&response.body)?;
        let farmer = match decode_farmer(&body) {
            Ok(farmer) => farmer,
            Err(e) => {
                warn!("ignoring undecodable farmer in login response: {}", e);
                None
            }
        };
        if let Some(ref farmer) = farmer {
            info!("farmer connected: {}", farmer.name);
        }

        let jar = self.transport.cookies();
        info!("{} cookies received", jar.len());
        for (name, value) in &jar {
            debug!("  - {}={}", name, truncated(value, 20));
        }
        let cookies = SessionCookies::recognize(jar.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        if !cookies.is_authenticated() {
            error!("no {} cookie found", SESSION_COOKIE);
            return Err(ApiError::MissingSessionCookie);
        }
        if let Some(ref token) = cookies.token {
            info!("token found: {}...", truncated(token, 20));
        }
        info!("session established");
        Ok(&*self.session.insert(Session { cookies, farmer }))
    }

    /// Performs one call, logging any failure and yielding nothing in that case.
    pub fn call(&mut self, endpoint: &Endpoint, params: Params) -> Option<Value> {
        match self.try_call(endpoint, params) {
            Ok(value) => Some(value),
            Err(e) => {
                match e {
                    ApiError::RateLimited | ApiError::Unauthorized => warn!("{}: {}", endpoint, e),
                    _ => error!("{}: {}", endpoint, e),
                }
                None
            }
        }
    }

    /// A 401 triggers one re-login and one retry; a 429 waits out the cooldown
    /// and gives up on this call.
    pub fn try_call(&mut self, endpoint: &Endpoint, params: Params) -> Result<Value> {
        match self.call_once(endpoint, params.clone()) {
            Err(ApiError::Unauthorized) => {
                warn!("unauthorized for {}, logging in again", endpoint);
                self.login()?;
                self.clock.sleep(self.retry.relogin_delay);
                self.call_once(endpoint, params)
            }
            other => other,
        }
    }

    fn call_once(&mut self, endpoint: &Endpoint, params: Params) -> Result<Value> {
        debug!("calling {} {} with {:?}", endpoint.method(), endpoint, params);
        let request = self.request(endpoint, params);
        let response = self.transport.send(&request)?;
        debug!("{} - status {}", endpoint, response.status);
        match response.status {
            200 => serde_json::from_str(&response.body).map_err(|e| {
                debug!("non-JSON body for {}: {}", endpoint, truncated(&response.body, 100));
                ApiError::Malformed(e)
            }),
            401 => Err(ApiError::Unauthorized),
            429 => {
                warn!("rate limited, waiting {:?}", self.retry.rate_limit_cooldown);
                self.clock.sleep(self.retry.rate_limit_cooldown);
                Err(ApiError::RateLimited)
            }
            status => Err(ApiError::Status {
                status,
                body: truncated(&response.body, 200).to_owned(),
            }),
        }
    }

    fn call_decoded<R: DeserializeOwned>(&mut self, endpoint: &Endpoint, params: Params) -> Option<R> {
        let value = self.call(endpoint, params)?;
        match decode(&value) {
            Ok(r) => Some(r),
            Err(e) => {
                error!("unexpected {} response: {}", endpoint, e);
                None
            }
        }
    }

    pub fn farmer_from_token(&mut self) -> Option<Farmer> {
        let value = self.call(&Endpoint::FarmerFromToken, Vec::new())?;
        match decode_farmer(&value) {
            Ok(Some(farmer)) => Some(farmer),
            Ok(None) => {
                warn!("{} answered without a farmer", Endpoint::FarmerFromToken);
                None
            }
            Err(e) => {
                error!("unexpected {} farmer: {}", Endpoint::FarmerFromToken, e);
                None
            }
        }
    }

    /// Checks that the session works, refreshing the farmer snapshot.
    pub fn test_api_access(&mut self) -> bool {
        info!("testing API access");
        match self.farmer_from_token() {
            Some(farmer) => {
                info!("{} OK - {} (id {})", Endpoint::FarmerFromToken, farmer.name, farmer.id);
                if let Some(ref mut session) = self.session {
                    session.farmer = Some(farmer);
                }
                true
            }
            None => {
                error!("{} failed", Endpoint::FarmerFromToken);
                false
            }
        }
    }

    pub fn farmer_opponents(&mut self) -> Vec<Opponent> {
        self.call_decoded::<OpponentsResponse>(&Endpoint::FarmerOpponents, Vec::new())
            .map(OpponentsResponse::into_opponents)
            .unwrap_or_default()
    }

    pub fn leek_opponents(&mut self, leek: LeekId) -> Vec<Opponent> {
        self.call_decoded::<OpponentsResponse>(&Endpoint::LeekOpponents(leek), Vec::new())
            .map(OpponentsResponse::into_opponents)
            .unwrap_or_default()
    }

    pub fn leek_name(&mut self, leek: LeekId) -> Option<String> {
        self.call_decoded::<LeekResponse>(&Endpoint::Leek(leek), Vec::new())?
            .name
    }

    pub fn start_solo_fight(&mut self, leek: LeekId, target: Option<LeekId>) -> Option<FightId> {
        let response: StartFightResponse =
            self.call_decoded(&Endpoint::StartSoloFight, start_fight_params(leek, target))?;
        match StartFight::from(response) {
            StartFight::Started(id) => {
                info!("fight started, id {}", id);
                Some(id)
            }
            StartFight::Rejected(reason) => {
                match reason {
                    FightError::TargetNotInGarden => {
                        warn!("fight refused: target no longer in the garden")
                    }
                    FightError::WrongToken => warn!("fight refused: invalid token, login needed"),
                    FightError::Other(code) => warn!("fight refused: {}", code),
                }
                None
            }
            StartFight::Unrecognized => {
                warn!("{} answered without fight or error", Endpoint::StartSoloFight);
                None
            }
        }
    }

    pub fn fight(&mut self, fight: FightId) -> Option<Fight> {
        let value = self.call(&Endpoint::Fight(fight), Vec::new())?;
        match decode_fight(&value) {
            Ok(f) => Some(f),
            Err(e) => {
                error!("unexpected fight {} response: {}", fight, e);
                None
            }
        }
    }
}
