use crate::error::{Error, Result};
use crate::utility::ms_between;
use arrayvec::ArrayVec;
use embedded_time::duration::Milliseconds;
use embedded_time::fixed_point::FixedPoint;

/// Index of a slot, handed out by [`Scheduler::register`] in registration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    Running,
    /// Seen for exactly one tick, when the elapsed time reaches the period.
    Completed,
}

/// What happens to a slot after its `Completed` tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Repeat {
    /// Restart from zero, forever.
    Forever,
    /// Stop; the behavior is not invoked again until the slot is restarted.
    Once,
}

/// Everything a behavior gets to see about its slot on one tick.
#[derive(Copy, Clone, PartialEq)]
pub struct SlotUpdate {
    pub id: SlotId,
    /// elapsed / period, clamped to 0.0..=1.0
    pub progress: f32,
    pub state: SlotState,
    pub elapsed: Milliseconds<u32>,
    pub period: Milliseconds<u32>,
    /// uptime of this tick
    pub now: Milliseconds<u32>,
}

impl SlotUpdate {
    pub fn is_completed(&self) -> bool {
        self.state == SlotState::Completed
    }
}

/// Something bound to a slot. `C` is whatever shared context the owner of the scheduler
/// passes into [`Scheduler::tick`].
pub trait SlotBehavior<C> {
    fn update(&mut self, slot: &SlotUpdate, ctx: &mut C) -> Result<()>;
}

/// A single periodic timer and the behavior it drives.
pub struct TimerSlot<B> {
    period: Milliseconds<u32>,
    elapsed: Milliseconds<u32>,
    repeat: Repeat,
    active: bool,
    failures: u32,
    behavior: B,
}

impl<B> TimerSlot<B> {
    fn new(period: Milliseconds<u32>, repeat: Repeat, behavior: B) -> Self {
        Self { period, elapsed: Milliseconds(0), repeat, active: true, failures: 0, behavior }
    }

    pub fn period(&self) -> Milliseconds<u32> {
        self.period
    }

    pub fn elapsed(&self) -> Milliseconds<u32> {
        self.elapsed
    }

    pub fn progress(&self) -> f32 {
        let progress = self.elapsed.integer() as f32 / self.period.integer() as f32;
        progress.clamp(0.0, 1.0)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// How many times the behavior returned an error.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    fn restart(&mut self) {
        self.elapsed = Milliseconds(0);
        self.active = true;
    }

    /// Advances the clock of this slot and reports the resulting state.
    fn advance(&mut self, delta: u32) -> SlotState {
        let elapsed = self.elapsed.integer().saturating_add(delta);
        self.elapsed = Milliseconds(elapsed.min(self.period.integer()));
        if elapsed >= self.period.integer() {
            SlotState::Completed
        } else {
            SlotState::Running
        }
    }

    fn finish(&mut self) {
        match self.repeat {
            Repeat::Forever => self.elapsed = Milliseconds(0),
            Repeat::Once => self.active = false,
        }
    }
}

/// A fixed-capacity table of independently periodic slots, ticked cooperatively from the
/// main loop. Slots fire in registration order.
pub struct Scheduler<B, const N: usize> {
    slots: ArrayVec<TimerSlot<B>, N>,
    last_tick: Option<Milliseconds<u32>>,
}

impl<B, const N: usize> Default for Scheduler<B, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, const N: usize> Scheduler<B, N> {
    pub fn new() -> Self {
        Self { slots: ArrayVec::new(), last_tick: None }
    }

    /// Adds a slot that repeats forever.
    pub fn register(&mut self, period: Milliseconds<u32>, behavior: B) -> Result<SlotId> {
        self.register_with(period, Repeat::Forever, behavior)
    }

    pub fn register_with(
        &mut self,
        period: Milliseconds<u32>,
        repeat: Repeat,
        behavior: B,
    ) -> Result<SlotId> {
        if period.integer() == 0 {
            return Err(Error::InvalidPeriod);
        }
        let id = SlotId(self.slots.len());
        self.slots
            .try_push(TimerSlot::new(period, repeat, behavior))
            .map_err(|_| Error::SchedulerFull)?;
        debug!("registered slot {} with period {} ms", id.0, period.integer());
        Ok(id)
    }

    /// Resets the slot to zero elapsed time and reactivates it if it had stopped.
    pub fn restart(&mut self, id: SlotId) -> Result<()> {
        self.slots.get_mut(id.0).ok_or(Error::UnknownSlot)?.restart();
        Ok(())
    }

    /// Deactivates the slot; its behavior is skipped until it is restarted.
    pub fn stop(&mut self, id: SlotId) -> Result<()> {
        self.slots.get_mut(id.0).ok_or(Error::UnknownSlot)?.active = false;
        Ok(())
    }

    pub fn slot(&self, id: SlotId) -> Option<&TimerSlot<B>> {
        self.slots.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Runs every active slot once. The first tick only establishes the time base, so every
    /// slot starts at zero progress. A failing behavior is counted and logged; it does not
    /// affect the timing of its own slot or any other.
    pub fn tick<C>(&mut self, now: Milliseconds<u32>, ctx: &mut C)
    where
        B: SlotBehavior<C>,
    {
        let delta = match self.last_tick {
            Some(last) => ms_between(last, now),
            None => 0,
        };
        self.last_tick = Some(now);

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.active {
                continue;
            }
            let state = slot.advance(delta);
            let update = SlotUpdate {
                id: SlotId(index),
                progress: slot.progress(),
                state,
                elapsed: slot.elapsed,
                period: slot.period,
                now,
            };

            if let Err(e) = slot.behavior.update(&update, ctx) {
                slot.failures = slot.failures.wrapping_add(1);
                warn!("slot {} behavior failed: {}", index, e);
            }

            if state == SlotState::Completed {
                slot.finish();
            }
        }
    }
}
