use crate::fight::FightPlan;
use crate::session::Credentials;
use clap::{value_parser, Args, Parser, Subcommand};
use leekbot_protocol::{LeekId, DEFAULT_BASE_URL};
use std::path::PathBuf;
use std::time::Duration;

/// One year.
const MAX_SESSION_MINUTES: u64 = 365 * 24 * 60;
const MAX_SECONDS: u64 = 24 * 60 * 60;

#[derive(Parser, Debug)]
#[command(name = "leekbot", about = "Automatic garden fights for LeekWars")]
pub struct Config {
    #[arg(long, env = "LEEKWARS_LOGIN")]
    pub login: String,
    #[arg(long, env = "LEEKWARS_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
    /// Appended to on every run.
    #[arg(long, default_value = "leekwars_bot.log")]
    pub log_file: PathBuf,
    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in, check API access and list the farmer's leeks.
    Check,
    /// Run a timed session of garden fights.
    Fight(FightArgs),
}

#[derive(Args, Debug)]
pub struct FightArgs {
    /// Leek to fight with; defaults to the highest-level one.
    #[arg(long)]
    pub leek: Option<LeekId>,
    /// Session length in minutes.
    #[arg(long, default_value_t = 30, value_parser = value_parser!(u64).range(..=MAX_SESSION_MINUTES))]
    pub duration: u64,
    /// Pause between fights in seconds.
    #[arg(long, default_value_t = 60, value_parser = value_parser!(u64).range(..=MAX_SECONDS))]
    pub delay: u64,
    #[arg(long, default_value_t = 5, value_parser = value_parser!(u64).range(1..=MAX_SECONDS))]
    pub poll_interval: u64,
    /// Give up on a fight after this many seconds.
    #[arg(long, default_value_t = 300, value_parser = value_parser!(u64).range(1..=MAX_SECONDS))]
    pub max_wait: u64,
}

impl Config {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            login: self.login.clone(),
            password: self.password.clone(),
        }
    }
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl FightArgs {
    pub fn plan(&self) -> FightPlan {
        FightPlan {
            leek: self.leek,
            duration: Duration::from_secs(self.duration.saturating_mul(60)),
            delay: Duration::from_secs(self.delay),
            poll_interval: Duration::from_secs(self.poll_interval),
            max_wait: Duration::from_secs(self.max_wait),
            ..FightPlan::default()
        }
    }
}
