//! Peripheral backends for the cane: a scripted simulation that runs anywhere
//! and, behind the `hardware` feature, Raspberry Pi drivers built on rppal.
pub mod error;
pub mod util;

#[cfg(feature = "hardware")]
pub mod rpi;

use cane_traits::{AnalogInput, DigitalOutput, HwResult, Level, PulseInput, ToneOutput};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::HwError;

/// Speed of sound used by the simulated echo line (cm per microsecond).
pub const SIM_SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Playback queue shared between a simulated peripheral and its test handle.
///
/// When exhausted it either repeats the last entry or restarts from the top.
#[derive(Debug)]
struct Script<T: Clone> {
    entries: Vec<T>,
    pending: VecDeque<T>,
    last: Option<T>,
    cycle: bool,
}

impl<T: Clone> Script<T> {
    fn new(entries: Vec<T>, cycle: bool) -> Self {
        Self {
            pending: entries.iter().cloned().collect(),
            entries,
            last: None,
            cycle,
        }
    }

    fn next(&mut self) -> Option<T> {
        if self.pending.is_empty() && self.cycle {
            self.pending.extend(self.entries.iter().cloned());
        }
        if let Some(v) = self.pending.pop_front() {
            self.last = Some(v.clone());
            return Some(v);
        }
        self.last.clone()
    }

    fn push(&mut self, v: T) {
        self.pending.push_back(v);
    }
}

// ── Trigger / LED ────────────────────────────────────────────────────────────

/// Simulated digital output. Clones share state, so a test can keep a handle.
#[derive(Debug, Clone, Default)]
pub struct SimOutput {
    high: Arc<AtomicBool>,
    rising_edges: Arc<AtomicU32>,
}

impl SimOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::Relaxed)
    }

    /// Number of low→high transitions seen so far.
    pub fn rising_edges(&self) -> u32 {
        self.rising_edges.load(Ordering::Relaxed)
    }
}

impl DigitalOutput for SimOutput {
    fn set_high(&mut self) -> HwResult<()> {
        if !self.high.swap(true, Ordering::Relaxed) {
            self.rising_edges.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn set_low(&mut self) -> HwResult<()> {
        self.high.store(false, Ordering::Relaxed);
        Ok(())
    }
}

// ── Echo ─────────────────────────────────────────────────────────────────────

/// One scripted echo outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EchoScript {
    /// Obstacle at this many centimetres.
    Distance(f32),
    /// Nothing returned before the timeout.
    NoEcho,
    /// The pulse measurement itself fails.
    Fault,
}

/// Simulated echo line replaying a distance script.
#[derive(Debug, Clone)]
pub struct SimEcho {
    script: Arc<Mutex<Script<EchoScript>>>,
    reads: Arc<AtomicU32>,
}

impl SimEcho {
    /// Replay `script` once, then keep repeating its last entry.
    pub fn new(script: impl IntoIterator<Item = EchoScript>) -> Self {
        Self::with_mode(script, false)
    }

    /// Replay `script` in a loop.
    pub fn cycling(script: impl IntoIterator<Item = EchoScript>) -> Self {
        Self::with_mode(script, true)
    }

    /// Convenience: script of plain distances in centimetres.
    pub fn from_distances(cm: impl IntoIterator<Item = f32>) -> Self {
        Self::new(cm.into_iter().map(EchoScript::Distance))
    }

    fn with_mode(script: impl IntoIterator<Item = EchoScript>, cycle: bool) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::new(script.into_iter().collect(), cycle))),
            reads: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Append an outcome to the pending script.
    pub fn push(&self, entry: EchoScript) {
        lock(&self.script).push(entry);
    }

    /// Number of pulse measurements taken.
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl PulseInput for SimEcho {
    fn pulse_width(&mut self, level: Level, timeout: Duration) -> HwResult<Option<Duration>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if level != Level::High {
            return Ok(None);
        }
        let entry = lock(&self.script).next().unwrap_or(EchoScript::NoEcho);
        tracing::trace!(?entry, "sim echo");
        match entry {
            EchoScript::Distance(cm) => {
                let width = util::echo_time_for_distance(cm, SIM_SPEED_OF_SOUND_CM_PER_US);
                Ok((width <= timeout).then_some(width))
            }
            EchoScript::NoEcho => Ok(None),
            EchoScript::Fault => Err(Box::new(HwError::Gpio("simulated echo fault".into()))),
        }
    }
}

// ── Buzzer ───────────────────────────────────────────────────────────────────

/// A write observed by the simulated buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneEvent {
    Frequency(u32),
    Duty(u16),
}

/// Most recent writes kept by [`SimBuzzer::events`].
pub const BUZZER_EVENT_LOG: usize = 256;

#[derive(Debug, Default)]
struct BuzzerState {
    frequency_hz: u32,
    duty: u16,
    beeps: usize,
    events: VecDeque<ToneEvent>,
}

impl BuzzerState {
    fn record(&mut self, ev: ToneEvent) {
        if self.events.len() == BUZZER_EVENT_LOG {
            self.events.pop_front();
        }
        self.events.push_back(ev);
    }
}

/// Simulated PWM buzzer recording its recent writes.
#[derive(Debug, Clone, Default)]
pub struct SimBuzzer {
    state: Arc<Mutex<BuzzerState>>,
}

impl SimBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duty(&self) -> u16 {
        lock(&self.state).duty
    }

    pub fn frequency_hz(&self) -> u32 {
        lock(&self.state).frequency_hz
    }

    /// The last [`BUZZER_EVENT_LOG`] writes, oldest first.
    pub fn events(&self) -> Vec<ToneEvent> {
        lock(&self.state).events.iter().copied().collect()
    }

    /// Number of times the buzzer was switched on (non-zero duty written).
    pub fn beeps(&self) -> usize {
        lock(&self.state).beeps
    }
}

impl ToneOutput for SimBuzzer {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()> {
        let mut st = lock(&self.state);
        st.frequency_hz = hz;
        st.record(ToneEvent::Frequency(hz));
        Ok(())
    }

    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        let mut st = lock(&self.state);
        let duty = duty.min(cane_traits::MAX_DUTY);
        st.duty = duty;
        if duty > 0 {
            st.beeps += 1;
        }
        st.record(ToneEvent::Duty(duty));
        Ok(())
    }
}

// ── Light sensor ─────────────────────────────────────────────────────────────

/// Simulated light-dependent resistor on a 12-bit ADC.
#[derive(Debug, Clone)]
pub struct SimLightSensor {
    script: Arc<Mutex<Script<u16>>>,
}

impl SimLightSensor {
    /// Always reads `value`.
    pub fn constant(value: u16) -> Self {
        Self::new([value])
    }

    /// Replay `values` once, then keep repeating the last one.
    pub fn new(values: impl IntoIterator<Item = u16>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::new(values.into_iter().collect(), false))),
        }
    }

    pub fn push(&self, value: u16) {
        lock(&self.script).push(value);
    }
}

impl AnalogInput for SimLightSensor {
    fn read(&mut self) -> HwResult<u16> {
        let v = lock(&self.script)
            .next()
            .unwrap_or(cane_traits::MAX_ANALOG)
            .min(cane_traits::MAX_ANALOG);
        Ok(v)
    }
}

// ── Rig ──────────────────────────────────────────────────────────────────────

/// The five simulated peripherals of one cane, wired together.
///
/// Every field is a shared handle: clone the rig before handing it to the
/// control loop to keep probes for assertions.
#[derive(Debug, Clone)]
pub struct SimRig {
    pub trigger: SimOutput,
    pub echo: SimEcho,
    pub buzzer: SimBuzzer,
    pub light: SimLightSensor,
    pub led: SimOutput,
}

impl SimRig {
    pub fn new(echo: SimEcho, light: SimLightSensor) -> Self {
        Self {
            trigger: SimOutput::new(),
            echo,
            buzzer: SimBuzzer::new(),
            light,
            led: SimOutput::new(),
        }
    }

    /// A walk toward a wall and back, at dusk, repeated forever.
    pub fn demo_walk() -> Self {
        let approach = [250.0, 180.0, 150.0, 150.0, 120.0, 95.0, 80.0, 50.0, 28.0, 20.0];
        let script = approach
            .iter()
            .chain(approach.iter().rev())
            .copied()
            .map(EchoScript::Distance)
            .chain([EchoScript::NoEcho]);
        Self::new(SimEcho::cycling(script), SimLightSensor::constant(900))
    }
}
