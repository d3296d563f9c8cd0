//! Simulated hardware shared by the integration tests.
//!
//! A single [`SimTime`] serves as both clock and delay: delays advance the
//! timeline instead of sleeping, so a whole profile runs instantly while
//! every pin edge is stamped with its simulated time.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use antenna_rotator::config::AxisConfig;
use antenna_rotator::{AxisArbiter, AxisEngine, AxisPins, Clock, EncoderInputs, Result};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

// =============================================================================
// Time
// =============================================================================

/// Shared simulated microsecond timeline.
#[derive(Clone, Default)]
pub struct SimTime(Rc<Cell<u64>>);

impl SimTime {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }
}

impl Clock for SimTime {
    fn now_us(&mut self) -> u64 {
        self.now()
    }
}

impl DelayNs for SimTime {
    fn delay_ns(&mut self, ns: u32) {
        self.advance((ns as u64 + 999) / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(us as u64);
    }
}

// =============================================================================
// Recording output pins
// =============================================================================

/// Driver line a recorded edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Enable,
    Dir,
    Step,
}

/// One pin write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub t_us: u64,
    pub line: Line,
    pub high: bool,
}

/// Ordered log of writes across the three lines of an axis.
#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<Edge>>>);

impl Trace {
    pub fn edges(&self) -> Vec<Edge> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Levels written to `line`, in order.
    pub fn levels(&self, line: Line) -> Vec<bool> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.line == line)
            .map(|e| e.high)
            .collect()
    }

    /// Last level written to `line`.
    pub fn last(&self, line: Line) -> Option<bool> {
        self.levels(line).last().copied()
    }

    /// Times of STEP falling edges (one per step).
    pub fn steps(&self) -> Vec<u64> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.line == Line::Step && !e.high)
            .map(|e| e.t_us)
            .collect()
    }

    /// Falling STEP edges recorded after index `from`.
    pub fn steps_since(&self, from: usize) -> usize {
        self.0.borrow()[from..]
            .iter()
            .filter(|e| e.line == Line::Step && !e.high)
            .count()
    }
}

/// Output pin that appends every write to a [`Trace`].
pub struct RecPin {
    line: Line,
    trace: Trace,
    time: SimTime,
}

impl ErrorType for RecPin {
    type Error = Infallible;
}

impl OutputPin for RecPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

impl RecPin {
    fn record(&mut self, high: bool) {
        self.trace.0.borrow_mut().push(Edge {
            t_us: self.time.now(),
            line: self.line,
            high,
        });
    }
}

/// Output pin that fails once its budget of successful writes is spent.
pub struct FailAfter {
    pub ok: usize,
}

impl ErrorType for FailAfter {
    type Error = ErrorKind;
}

impl FailAfter {
    fn write(&mut self) -> core::result::Result<(), ErrorKind> {
        if self.ok == 0 {
            return Err(ErrorKind::Other);
        }
        self.ok -= 1;
        Ok(())
    }
}

impl OutputPin for FailAfter {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.write()
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.write()
    }
}

pub type SimAxis<'a> = AxisEngine<'a, RecPin, RecPin, RecPin, SimTime, SimTime>;

/// Build an engine on recording pins and return it with its trace.
pub fn sim_axis<'a>(config: AxisConfig, arbiter: &'a AxisArbiter, time: &SimTime) -> (SimAxis<'a>, Trace) {
    let trace = Trace::default();
    let pin = |line| RecPin {
        line,
        trace: trace.clone(),
        time: time.clone(),
    };

    let engine = AxisEngine::builder()
        .enable_pin(pin(Line::Enable))
        .dir_pin(pin(Line::Dir))
        .step_pin(pin(Line::Step))
        .delay(time.clone())
        .clock(time.clone())
        .config(config)
        .arbiter(arbiter)
        .build()
        .expect("simulated axis should build");

    (engine, trace)
}

/// Engine pins with a failing line, for fault tests.
pub fn pins_with_failing_dir(
    trace: &Trace,
    time: &SimTime,
    dir_ok: usize,
) -> AxisPins<RecPin, FailAfter, RecPin> {
    AxisPins {
        enable: RecPin {
            line: Line::Enable,
            trace: trace.clone(),
            time: time.clone(),
        },
        dir: FailAfter { ok: dir_ok },
        step: RecPin {
            line: Line::Step,
            trace: trace.clone(),
            time: time.clone(),
        },
    }
}

// =============================================================================
// Encoder
// =============================================================================

/// Scripted encoder: each poll consumes one `(button_released, a, b)` frame.
/// Once the script runs out the button reads pressed.
pub struct ScriptedEncoder {
    frames: VecDeque<(bool, bool, bool)>,
    current: (bool, bool, bool),
}

impl ScriptedEncoder {
    /// Start with both phases high (detent rest position).
    pub fn new(frames: &[(bool, bool, bool)]) -> Self {
        Self {
            frames: frames.iter().copied().collect(),
            current: (true, true, true),
        }
    }

    /// `n` forward detents.
    pub fn forward(n: usize) -> Self {
        let mut frames = Vec::new();
        for _ in 0..n {
            frames.push((true, false, false));
            frames.push((true, true, true));
        }
        Self::new(&frames)
    }

    /// `n` forward detents, each preceded by `rest` idle polls.
    pub fn slow_forward(n: usize, rest: usize) -> Self {
        let mut frames = Vec::new();
        for _ in 0..n {
            frames.extend(std::iter::repeat((true, true, true)).take(rest));
            frames.push((true, false, false));
            frames.push((true, true, true));
        }
        Self::new(&frames)
    }

    /// `n` reverse detents.
    pub fn reverse(n: usize) -> Self {
        let mut frames = Vec::new();
        for _ in 0..n {
            frames.push((true, false, true));
            frames.push((true, true, true));
        }
        Self::new(&frames)
    }
}

impl EncoderInputs for ScriptedEncoder {
    fn button_released(&mut self) -> Result<bool> {
        self.current = self.frames.pop_front().unwrap_or((false, true, true));
        Ok(self.current.0)
    }

    fn phases(&mut self) -> Result<(bool, bool)> {
        Ok((self.current.1, self.current.2))
    }
}
