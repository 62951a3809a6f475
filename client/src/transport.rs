use leekbot_protocol::{Method, Params};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9,en;q=0.8";

#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub params: Params,
}

#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Connection failure or timeout, before any status line was read.
#[derive(Debug)]
pub struct TransportError(pub String);

pub trait Transport {
    /// Every status code, including errors, comes back as a `Response`.
    fn send(&mut self, request: &Request) -> Result<Response, TransportError>;
    fn cookies(&self) -> Vec<(String, String)>;
    /// Forgets every stored cookie, so the next answer's cookies stand alone.
    fn clear_cookies(&mut self);
}

pub struct HttpTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        HttpTransport {
            agent: agent(timeout),
            timeout,
        }
    }
}

impl Transport for HttpTransport {
    fn send(&mut self, request: &Request) -> Result<Response, TransportError> {
        let result = match request.method {
            Method::Post => {
                let form: Vec<(&str, &str)> = request.params.iter().map(|(k, v)| (*k, v.as_str())).collect();
                self.agent
                    .post(&request.url)
                    .set("Accept", ACCEPT)
                    .set("Accept-Language", ACCEPT_LANGUAGE)
                    .set("X-Requested-With", "XMLHttpRequest")
                    .send_form(&form)
            }
            Method::Get => {
                let mut req = self
                    .agent
                    .get(&request.url)
                    .set("Accept", ACCEPT)
                    .set("Accept-Language", ACCEPT_LANGUAGE)
                    .set("X-Requested-With", "XMLHttpRequest");
                for (k, v) in &request.params {
                    req = req.query(k, v);
                }
                req.call()
            }
        };
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => return Err(TransportError(e.to_string())),
        };
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Response { status, body })
    }

    fn cookies(&self) -> Vec<(String, String)> {
        self.agent
            .cookie_store()
            .iter_unexpired()
            .map(|c| (c.name().to_owned(), c.value().to_owned()))
            .collect()
    }

    fn clear_cookies(&mut self) {
        // a fresh agent has an empty cookie jar
        self.agent = agent(self.timeout);
    }
}
