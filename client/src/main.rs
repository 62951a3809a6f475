#[macro_use]
extern crate log;

mod clock;
mod config;
mod error;
mod fight;
mod logging;
mod session;
#[cfg(test)]
mod testing;
mod transport;

use clap::Parser;
use clock::SystemClock;
use config::{Command, Config};
use leekbot_protocol::truncated;
use session::ApiClient;
use std::process::exit;
use transport::HttpTransport;

fn check<T: transport::Transport, C: clock::Clock>(client: &mut ApiClient<T, C>) -> bool {
    if let Err(e) = client.login() {
        error!("login failed: {}", e);
        return false;
    }
    if !client.test_api_access() {
        error!("API access not working, check your account's API rights");
        return false;
    }
    if let Some(token) = client.session().and_then(|s| s.cookies.token.as_deref()) {
        debug!("farmer token: {}...", truncated(token, 20));
    }
    if let Some(farmer) = client.session().and_then(|s| s.farmer.as_ref()) {
        info!("farmer: {}", farmer.name);
        info!("talent: {}", farmer.talent.unwrap_or(0));
        for leek in farmer.leeks.values() {
            info!("   - {}", leek);
        }
    }
    info!("{} farmer opponents in the garden", client.farmer_opponents().len());
    true
}

fn main() {
    let config = Config::parse();
    if let Err(e) = logging::init(&config.log_file) {
        eprintln!("can not open log file {:?}: {}", config.log_file, e);
        exit(2);
    }
    info!("LeekWars bot");
    let transport = HttpTransport::new(config.timeout());
    let mut client = ApiClient::new(transport, SystemClock, &config.base_url, config.credentials());
    let ok = match config.command {
        Command::Check => check(&mut client),
        Command::Fight(ref args) => match fight::auto_fight_session(&mut client, &args.plan()) {
            Ok(_) => true,
            Err(e) => {
                error!("session aborted: {}", e);
                false
            }
        },
    };
    if !ok {
        exit(1);
    }
}
