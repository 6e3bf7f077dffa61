//! Fakes and fixtures shared by the unit tests

use std::collections::VecDeque;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};

use crate::game::scene::Scene;
use crate::input::keys::{InputError, Key, KeyInjector};
use crate::network::firewall::{BlockRule, FirewallBackend};
use crate::network::resolve::{HostResolver, ProcessLocator};
use crate::network::NetworkError;
use crate::platform::WindowLocator;
use crate::timing::Clock;
use crate::vision::capture::{CaptureError, CaptureProvider};
use crate::vision::recognition::SceneSource;
use crate::vision::region::Rect;

/// Deterministic high-entropy image; different seeds give unrelated images
pub fn patterned_image(width: u32, height: u32, seed: u64) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let base =
            (u64::from(x) << 32) ^ u64::from(y) ^ seed.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Rgb([noise(base, 0), noise(base, 1), noise(base, 2)])
    })
}

fn noise(base: u64, channel: u64) -> u8 {
    // splitmix64 finaliser
    let mut z = base
        .wrapping_add(channel.wrapping_mul(0xBF58_476D_1CE4_E5B9))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 56) as u8
}

/// Copy `patch` into `frame` with its top-left corner at (x, y)
pub fn embed(frame: &mut RgbImage, patch: &RgbImage, x: u32, y: u32) {
    for (px, py, pixel) in patch.enumerate_pixels() {
        frame.put_pixel(x + px, y + py, *pixel);
    }
}

/// Clock that only moves when something sleeps on it
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Simulated time since the clock was created
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        *self.offset.lock().unwrap() += duration;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// Shared view of what a [`RecordingKeyboard`] received
#[derive(Clone, Default)]
pub struct KeyLog {
    events: Arc<Mutex<Vec<(KeyEvent, Duration)>>>,
}

impl KeyLog {
    /// Every event with its simulated timestamp
    pub fn snapshot(&self) -> Vec<(KeyEvent, Duration)> {
        self.events.lock().unwrap().clone()
    }

    /// Keys that were pressed down, in order
    pub fn presses(&self) -> Vec<Key> {
        self.snapshot()
            .into_iter()
            .filter_map(|(event, _)| match event {
                KeyEvent::Down(key) => Some(key),
                KeyEvent::Up(_) => None,
            })
            .collect()
    }
}

/// Keyboard that records events instead of injecting them
pub struct RecordingKeyboard {
    log: KeyLog,
    clock: Option<(Arc<ManualClock>, Duration)>,
    fail_after: Option<usize>,
}

impl RecordingKeyboard {
    pub fn new() -> Self {
        Self {
            log: KeyLog::default(),
            clock: None,
            fail_after: None,
        }
    }

    /// Timestamps events relative to the clock's current time
    pub fn timed(clock: Arc<ManualClock>) -> Self {
        let start = clock.elapsed();
        Self {
            clock: Some((clock, start)),
            ..Self::new()
        }
    }

    /// Accepts `presses` key-downs, then fails every injection
    pub fn failing_after(presses: usize) -> Self {
        Self {
            fail_after: Some(presses),
            ..Self::new()
        }
    }

    pub fn events(&self) -> KeyLog {
        self.log.clone()
    }

    fn record(&self, event: KeyEvent) {
        let at = self
            .clock
            .as_ref()
            .map_or(Duration::ZERO, |(clock, start)| clock.elapsed() - *start);
        self.log.events.lock().unwrap().push((event, at));
    }
}

impl Default for RecordingKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyInjector for RecordingKeyboard {
    fn key_down(&mut self, key: Key) -> Result<(), InputError> {
        if let Some(limit) = self.fail_after {
            if self.log.presses().len() >= limit {
                return Err(InputError::Injection {
                    key,
                    reason: "scripted failure".to_string(),
                });
            }
        }
        self.record(KeyEvent::Down(key));
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<(), InputError> {
        self.record(KeyEvent::Up(key));
        Ok(())
    }
}

/// Window locator with a fixed answer
pub struct FakeWindows {
    rect: Option<Rect>,
}

impl FakeWindows {
    pub fn new(rect: Option<Rect>) -> Self {
        Self { rect }
    }
}

impl WindowLocator for FakeWindows {
    fn find(&self, _title: &str) -> Option<Rect> {
        self.rect
    }
}

/// Regions a [`FakeCapture`] was asked for
#[derive(Clone, Default)]
pub struct CaptureLog {
    regions: Arc<Mutex<Vec<Rect>>>,
}

impl CaptureLog {
    pub fn count(&self) -> usize {
        self.regions.lock().unwrap().len()
    }

    pub fn regions(&self) -> Vec<Rect> {
        self.regions.lock().unwrap().clone()
    }
}

/// Capture provider returning scripted frames; `None` entries fail.
/// The last entry repeats once the script runs out.
pub struct FakeCapture {
    frames: VecDeque<Option<RgbImage>>,
    log: CaptureLog,
}

impl FakeCapture {
    pub fn always(frame: RgbImage) -> Self {
        Self::sequence(vec![Some(frame)])
    }

    pub fn sequence(frames: Vec<Option<RgbImage>>) -> Self {
        Self {
            frames: frames.into(),
            log: CaptureLog::default(),
        }
    }

    pub fn calls(&self) -> CaptureLog {
        self.log.clone()
    }
}

impl CaptureProvider for FakeCapture {
    fn capture(&mut self, region: Rect) -> Result<RgbImage, CaptureError> {
        self.log.regions.lock().unwrap().push(region);
        let next = if self.frames.len() > 1 {
            self.frames.pop_front().flatten()
        } else {
            self.frames.front().cloned().flatten()
        };
        next.ok_or_else(|| CaptureError::Backend("scripted failure".to_string()))
    }
}

/// Scene source replaying a script; the last scene repeats forever
pub struct ScriptedScenes {
    script: VecDeque<Option<Scene>>,
    polls: Arc<AtomicUsize>,
}

impl ScriptedScenes {
    pub fn new(script: Vec<Option<Scene>>) -> Self {
        Self {
            script: script.into(),
            polls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of `detect` calls
    pub fn polls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.polls)
    }
}

impl SceneSource for ScriptedScenes {
    fn detect(&mut self) -> Option<Scene> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.script.len() > 1 {
            self.script.pop_front().flatten()
        } else {
            self.script.front().copied().flatten()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirewallCall {
    Add(BlockRule),
    Delete(String),
}

#[derive(Default)]
struct FirewallState {
    calls: Vec<FirewallCall>,
    installed: Vec<BlockRule>,
}

/// Shared view of a [`FakeFirewall`]
#[derive(Clone, Default)]
pub struct FirewallLog {
    state: Arc<Mutex<FirewallState>>,
}

impl FirewallLog {
    pub fn calls(&self) -> Vec<FirewallCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Rules currently in place
    pub fn installed_rules(&self) -> usize {
        self.state.lock().unwrap().installed.len()
    }

    pub fn adds(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, FirewallCall::Add(_)))
            .count()
    }

    pub fn deletes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, FirewallCall::Delete(_)))
            .count()
    }
}

/// In-memory firewall
pub struct FakeFirewall {
    log: FirewallLog,
    accept_adds: Option<usize>,
}

impl FakeFirewall {
    pub fn new() -> Self {
        Self {
            log: FirewallLog::default(),
            accept_adds: None,
        }
    }

    /// Firewall that refuses every new rule
    pub fn rejecting() -> Self {
        Self::rejecting_after(0)
    }

    /// Accepts `adds` rules, then refuses every new one
    pub fn rejecting_after(adds: usize) -> Self {
        Self {
            accept_adds: Some(adds),
            ..Self::new()
        }
    }

    pub fn log(&self) -> FirewallLog {
        self.log.clone()
    }
}

impl Default for FakeFirewall {
    fn default() -> Self {
        Self::new()
    }
}

impl FirewallBackend for FakeFirewall {
    fn add_rule(&mut self, rule: &BlockRule) -> Result<(), NetworkError> {
        let mut state = self.log.state.lock().unwrap();
        let earlier = state
            .calls
            .iter()
            .filter(|call| matches!(call, FirewallCall::Add(_)))
            .count();
        state.calls.push(FirewallCall::Add(rule.clone()));
        if self.accept_adds.is_some_and(|limit| earlier >= limit) {
            return Err(NetworkError::RuleRejected {
                name: rule.name.clone(),
                code: Some(1),
            });
        }
        state.installed.push(rule.clone());
        Ok(())
    }

    fn delete_rule(&mut self, name: &str) -> Result<(), NetworkError> {
        let mut state = self.log.state.lock().unwrap();
        state.calls.push(FirewallCall::Delete(name.to_string()));
        state.installed.retain(|rule| rule.name != name);
        Ok(())
    }
}

/// Resolver with a fixed answer
pub struct FakeResolver(pub Option<IpAddr>);

impl HostResolver for FakeResolver {
    fn resolve(&self, _host: &str) -> Option<IpAddr> {
        self.0
    }
}

/// Process locator with a fixed answer
pub struct FakeProcesses(pub Option<PathBuf>);

impl ProcessLocator for FakeProcesses {
    fn executable_path(&self, _names: &[String]) -> Option<PathBuf> {
        self.0.clone()
    }
}
