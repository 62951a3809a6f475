use crate::clock::Clock;
use crate::error::SessionError;
use crate::session::ApiClient;
use crate::transport::Transport;
use leekbot_protocol::{Fight, FightId, FightStatus, LeekId, Opponent, Outcome};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct FightPlan {
    /// Falls back to the highest-level leek of the farmer.
    pub leek: Option<LeekId>,
    pub duration: Duration,
    pub delay: Duration,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub failure_delay: Duration,
}

impl Default for FightPlan {
    fn default() -> Self {
        FightPlan {
            leek: None,
            duration: Duration::from_secs(30 * 60),
            delay: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(300),
            failure_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Report {
    pub duration: Duration,
    pub fights: u32,
    pub victories: u32,
}

impl Report {
    pub fn record(&mut self, outcome: Outcome) {
        self.fights += 1;
        if outcome == Outcome::Victory {
            self.victories += 1;
        }
    }
    pub fn defeats(&self) -> u32 {
        self.fights - self.victories
    }
    /// Percentage of fights won, absent when nothing was fought.
    pub fn win_rate(&self) -> Option<f64> {
        if self.fights == 0 {
            None
        } else {
            Some(self.victories as f64 * 100.0 / self.fights as f64)
        }
    }
    pub fn win_rate_text(&self) -> String {
        match self.win_rate() {
            Some(rate) => format!("{:.1}%", rate),
            None => "n/a".to_owned(),
        }
    }
    pub fn log(&self) {
        info!("session finished");
        info!("   duration: {} minutes", self.duration.as_secs() / 60);
        info!("   fights: {}", self.fights);
        info!("   victories: {}", self.victories);
        info!("   defeats: {}", self.defeats());
        info!("   win rate: {}", self.win_rate_text());
    }
}

pub fn pick_weakest(opponents: &[Opponent]) -> Option<&Opponent> {
    opponents.iter().min_by_key(|o| o.talent_or_unknown())
}

pub fn wait_for_fight_end<T: Transport, C: Clock>(
    client: &mut ApiClient<T, C>,
    fight: FightId,
    poll_interval: Duration,
    max_wait: Duration,
) -> Option<Fight> {
    let start = client.clock().now();
    while client.clock().now().duration_since(start) < max_wait {
        if let Some(info) = client.fight(fight) {
            match info.status {
                FightStatus::Finished => return Some(info),
                FightStatus::Running => debug!("fight {} in progress", fight),
                ref other => debug!("fight {} status {}", fight, other),
            }
        }
        client.clock().sleep(poll_interval);
    }
    warn!("timeout waiting for fight {}", fight);
    None
}

/// Fights with `leek` until `plan.duration` has elapsed.
pub fn fight_loop<T: Transport, C: Clock>(
    client: &mut ApiClient<T, C>,
    leek: LeekId,
    plan: &FightPlan,
) -> Report {
    let mut report = Report {
        duration: plan.duration,
        ..Report::default()
    };
    let end = match client.clock().now().checked_add(plan.duration) {
        Some(end) => end,
        None => {
            error!("session duration {:?} is out of range", plan.duration);
            return report;
        }
    };
    while client.clock().now() < end {
        info!("fight #{}", report.fights + 1);
        let opponents = client.leek_opponents(leek);
        let started = match pick_weakest(&opponents) {
            Some(target) => {
                info!("{} opponents available", opponents.len());
                info!("   target: {} (talent {:?})", target.name, target.talent);
                client.start_solo_fight(leek, Some(target.id))
            }
            None => {
                info!("no specific opponent, automatic fight");
                client.start_solo_fight(leek, None)
            }
        };
        match started {
            Some(fight) => match wait_for_fight_end(client, fight, plan.poll_interval, plan.max_wait) {
                Some(result) => {
                    let outcome = result.outcome();
                    match outcome {
                        Outcome::Victory => info!("victory"),
                        Outcome::Defeat => info!("defeat"),
                    }
                    report.record(outcome);
                }
                None => warn!("fight {} did not finish", fight),
            },
            None => {
                warn!("could not start a fight");
                client.clock().sleep(plan.failure_delay);
            }
        }
        if client.clock().now() < end {
            info!("waiting {}s", plan.delay.as_secs());
            client.clock().sleep(plan.delay);
        }
    }
    report
}

/// Logs in, checks API access, picks the leek and runs the fight loop.
pub fn auto_fight_session<T: Transport, C: Clock>(
    client: &mut ApiClient<T, C>,
    plan: &FightPlan,
) -> Result<Report, SessionError> {
    client.login()?;
    if !client.test_api_access() {
        return Err(SessionError::ApiAccess);
    }
    let farmer = client
        .session()
        .and_then(|s| s.farmer.clone())
        .unwrap_or_default();
    if farmer.leeks.is_empty() {
        return Err(SessionError::NoLeeks);
    }
    info!("available leeks:");
    for leek in farmer.leeks.values() {
        info!("   - {}", leek);
    }
    let leek = match plan.leek {
        Some(id) => {
            if !farmer.leeks.contains_key(&id) {
                warn!("leek {} is not in {}'s roster", id, farmer.name);
            }
            id
        }
        None => farmer.strongest_leek().map(|l| l.id).ok_or(SessionError::NoLeeks)?,
    };
    let name = client.leek_name(leek).unwrap_or_else(|| "?".to_owned());
    info!("selected leek: {} (id {})", name, leek);

    let report = fight_loop(client, leek, plan);
    report.log();
    Ok(report)
}
