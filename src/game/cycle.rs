//! Per-cycle state machine
//!
//! One cycle takes the game online, blocks the network once the join screen
//! shows, waits for the transaction spinner to come and go, then returns to
//! story mode. [`CycleState::step`] is pure: it turns the latest scene and
//! the current time into the next state plus one [`Directive`] for the
//! controller to carry out.

use std::time::{Duration, Instant};

use super::scene::Scene;
use crate::config::Settings;

/// Wait between ordinary polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Wait between polls while the join screen is showing
pub const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Durations the state machine works with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTimings {
    pub poll_interval: Duration,
    pub join_poll_interval: Duration,
    /// How long the transaction must stay gone before leaving the session
    pub transaction_waiting: Duration,
    /// Pause in story mode before the network is restored
    pub join_story_cooldown: Duration,
}

impl CycleTimings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            join_poll_interval: JOIN_POLL_INTERVAL,
            transaction_waiting: settings.transaction_waiting,
            join_story_cooldown: settings.join_story_cooldown,
        }
    }
}

impl Default for CycleTimings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Progress through one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Online macro sent, join screen not seen yet
    AwaitingJoin,
    /// Join screen seen, waiting for the transaction
    Blocking,
    /// Transaction spinner on screen
    InTransaction,
    /// Spinner gone since `since`
    AwaitingTransactionEnd { since: Instant },
    /// Offline macro sent, waiting for story mode
    ReturningOffline,
    Complete,
}

impl Phase {
    /// Whether the transaction spinner has appeared in this cycle
    pub fn transaction_seen(&self) -> bool {
        !matches!(self, Phase::AwaitingJoin | Phase::Blocking)
    }
}

/// Action the controller takes after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Nothing to do; poll again after the duration
    Wait(Duration),
    /// Install the block rule, then wait for the join poll interval
    BlockNetwork,
    /// Play the offline macro, then wait for the poll interval
    SwitchOffline,
    /// Cool down, restore the network and end the cycle
    FinishCycle,
}

/// State of the running cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleState {
    pub phase: Phase,
    /// A block has been attempted in this cycle
    pub network_blocked: bool,
    pub last_scene: Option<Scene>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleState {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingJoin,
            network_blocked: false,
            last_scene: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Advance on one observation
    pub fn step(
        mut self,
        scene: Option<Scene>,
        now: Instant,
        timings: &CycleTimings,
    ) -> (CycleState, Directive) {
        if scene.is_some() && scene != self.last_scene {
            if let Some(s) = scene {
                log::info!("Scene detected: {s}");
            }
            self.last_scene = scene;
        }

        match scene {
            Some(Scene::JoiningOnline) => {
                if self.phase == Phase::AwaitingJoin {
                    self.phase = Phase::Blocking;
                }
                if self.network_blocked {
                    return (self, Directive::Wait(timings.join_poll_interval));
                }
                self.network_blocked = true;
                return (self, Directive::BlockNetwork);
            }
            Some(Scene::Transaction) if self.phase != Phase::ReturningOffline => {
                if !self.phase.transaction_seen() {
                    log::info!("Transaction pending...");
                }
                // any sighting restarts the grace period
                self.phase = Phase::InTransaction;
                return (self, Directive::Wait(timings.poll_interval));
            }
            _ => {}
        }

        match self.phase {
            Phase::InTransaction | Phase::AwaitingTransactionEnd { .. } => {
                let since = match self.phase {
                    Phase::AwaitingTransactionEnd { since } => since,
                    _ => {
                        log::info!("Transaction disappeared, waiting for confirmation...");
                        self.phase = Phase::AwaitingTransactionEnd { since: now };
                        now
                    }
                };

                // a zero grace period is over on the poll that starts it
                let elapsed = now.saturating_duration_since(since);
                let waiting = timings.transaction_waiting;
                if elapsed > waiting || waiting.is_zero() {
                    log::info!(
                        "Transaction confirmed finished ({:.1}s), switching to offline...",
                        elapsed.as_secs_f64()
                    );
                    self.phase = Phase::ReturningOffline;
                    (self, Directive::SwitchOffline)
                } else {
                    (self, Directive::Wait(timings.poll_interval))
                }
            }
            Phase::ReturningOffline if scene == Some(Scene::StoryMode) => {
                log::info!("Returned to story mode");
                self.phase = Phase::Complete;
                (self, Directive::FinishCycle)
            }
            _ => (self, Directive::Wait(timings.poll_interval)),
        }
    }
}
