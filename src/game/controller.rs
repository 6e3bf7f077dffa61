//! Cycle controller
//!
//! Runs the configured number of cycles: plays the online macro, polls the
//! scene source, feeds each observation through [`CycleState::step`] and
//! carries out the resulting [`Directive`].

use std::sync::Arc;

use super::cycle::{CycleState, CycleTimings, Directive};
use crate::config::Settings;
use crate::input::{InputError, MacroPlayer};
use crate::network::NetworkGuard;
use crate::timing::Clock;
use crate::vision::SceneSource;

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("macro failed: {0}")]
    Macro(#[from] InputError),
}

/// Outcome of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles_completed: u32,
}

/// Drives the game through repeated online/offline cycles
pub struct CycleController {
    scenes: Box<dyn SceneSource>,
    player: MacroPlayer,
    guard: Arc<NetworkGuard>,
    clock: Arc<dyn Clock>,
    timings: CycleTimings,
    cycle_count: u32,
}

impl CycleController {
    pub fn new(
        scenes: Box<dyn SceneSource>,
        player: MacroPlayer,
        guard: Arc<NetworkGuard>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
    ) -> Self {
        Self {
            scenes,
            player,
            guard,
            clock,
            timings: CycleTimings::from_settings(settings),
            cycle_count: settings.cycle_count,
        }
    }

    /// Run every cycle. The network is restored before the first cycle,
    /// after the last one and when a macro fails.
    pub fn run(&mut self) -> Result<RunSummary, CycleError> {
        self.guard.restore();

        let mut summary = RunSummary {
            cycles_completed: 0,
        };
        for index in 1..=self.cycle_count {
            log::info!("=== Starting cycle {}/{} ===", index, self.cycle_count);
            if let Err(e) = self.run_cycle() {
                log::error!("Cycle {index} aborted: {e}");
                self.guard.restore();
                return Err(e);
            }
            summary.cycles_completed = index;
            log::info!("Cycle {index} finished");
        }

        log::info!("All {} cycles completed", summary.cycles_completed);
        self.guard.restore();
        Ok(summary)
    }

    /// Run a single cycle to completion
    pub fn run_cycle(&mut self) -> Result<(), CycleError> {
        self.player.to_online()?;

        let mut state = CycleState::new();
        while !state.is_complete() {
            let scene = self.scenes.detect();
            let (next, directive) = state.step(scene, self.clock.now(), &self.timings);
            state = next;

            match directive {
                Directive::Wait(duration) => self.clock.sleep(duration),
                Directive::BlockNetwork => {
                    if !self.guard.block() {
                        log::warn!("Network block failed, continuing without it");
                    }
                    self.clock.sleep(self.timings.join_poll_interval);
                }
                Directive::SwitchOffline => {
                    self.player.to_offline()?;
                    self.clock.sleep(self.timings.poll_interval);
                }
                Directive::FinishCycle => {
                    log::info!(
                        "Cooling down for {:.1}s...",
                        self.timings.join_story_cooldown.as_secs_f64()
                    );
                    self.clock.sleep(self.timings.join_story_cooldown);
                    self.guard.restore();
                    log::info!("Network restored, cycle complete");
                }
            }
        }

        Ok(())
    }
}
