use crate::clock::Clock;
use crate::session::{ApiClient, Credentials};
use crate::transport::{Request, Response, Transport, TransportError};
use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

pub const BASE_URL: &str = "https://leekwars.test/api/";

pub struct FakeClock {
    start: Instant,
    elapsed: Cell<Duration>,
}

impl FakeClock {
    pub fn new() -> Self {
        FakeClock {
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
    fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

#[derive(Clone)]
pub struct Scripted {
    response: Option<Response>,
    cookies: Vec<(String, String)>,
}

impl Scripted {
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.push((name.to_owned(), value.to_owned()));
        self
    }
}

pub fn status(status: u16, body: &str) -> Scripted {
    Scripted {
        response: Some(Response {
            status,
            body: body.to_owned(),
        }),
        cookies: Vec::new(),
    }
}

pub fn ok(body: &str) -> Scripted {
    status(200, body)
}

pub fn refused() -> Scripted {
    Scripted {
        response: None,
        cookies: Vec::new(),
    }
}

/// Answers each path from a queue; the last entry of a queue repeats forever.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, VecDeque<Scripted>>,
    jar: Vec<(String, String)>,
    sent: Vec<Request>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn route(mut self, path: &str, scripted: Scripted) -> Self {
        self.routes.entry(path.to_owned()).or_default().push_back(scripted);
        self
    }
    pub fn logged_in(self) -> Self {
        self.route(
            "farmer/login-token",
            ok(r#"{"farmer": {"id": 1, "name": "PCMT", "talent": 1200,
                "leeks": {"34872": {"id": 34872, "name": "Poireau", "level": 40, "talent": 900}}}}"#)
            .with_cookie("PHPSESSID", "sess")
            .with_cookie("token", "tok"),
        )
    }
    pub fn requests(&self, path: &str) -> Vec<&Request> {
        self.sent.iter().filter(|r| r.url == format!("{}{}", BASE_URL, path)).collect()
    }
    pub fn count(&self, path: &str) -> usize {
        self.requests(path).len()
    }
}

impl Transport for FakeTransport {
    fn send(&mut self, request: &Request) -> Result<Response, TransportError> {
        self.sent.push(request.clone());
        let path = request.url.trim_start_matches(BASE_URL);
        let scripted = match self.routes.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        let scripted = match scripted {
            Some(scripted) => scripted,
            None => return Ok(Response { status: 404, body: String::new() }),
        };
        for (name, value) in scripted.cookies {
            self.jar.retain(|(n, _)| *n != name);
            self.jar.push((name, value));
        }
        scripted.response.ok_or_else(|| TransportError("connection refused".to_owned()))
    }

    fn cookies(&self) -> Vec<(String, String)> {
        self.jar.clone()
    }

    fn clear_cookies(&mut self) {
        self.jar.clear();
    }
}

pub fn client(transport: FakeTransport) -> ApiClient<FakeTransport, FakeClock> {
    ApiClient::new(
        transport,
        FakeClock::new(),
        BASE_URL,
        Credentials {
            login: "PCMT".to_owned(),
            password: "secret".to_owned(),
        },
    )
}
