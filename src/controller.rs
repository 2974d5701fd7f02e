use crate::clock::LocalClock;
use crate::config::ClockConfig;
use crate::effects::{Context, Effect, Scene, Slew};
use crate::error::Result;
use crate::hardware::Devices;
use crate::scheduler::{Scheduler, SlotId};
use crate::utility::ms_between;
use crate::{DOT_COUNT, MAX_SLOTS};
use embedded_time::duration::Milliseconds;
use rand::Rng;

/// Ties the scheduler, the effects and the local clock together. Call [`DeskClock::update`]
/// once per main loop iteration.
pub struct DeskClock {
    scene: Scene,
    scheduler: Scheduler<Effect, MAX_SLOTS>,
    clock: LocalClock,
    dot_slots: [SlotId; DOT_COUNT],
    last_poll: Option<Milliseconds<u32>>,
}

impl DeskClock {
    /// Registers every slot. Fails if a configured period is zero.
    pub fn new(config: ClockConfig) -> Result<Self> {
        let mut scheduler = Scheduler::new();

        let mut dot_slots = [SlotId(0); DOT_COUNT];
        for (dot, slot) in dot_slots.iter_mut().enumerate() {
            *slot = scheduler
                .register(Milliseconds(config.dot_pulse_periods_ms[dot]), Effect::DotPulse { dot })?;
        }
        scheduler.register(Milliseconds(config.trail_period_ms), Effect::TrailRedraw)?;
        scheduler.register(
            Milliseconds(config.brightness_period_ms),
            Effect::AutoBrightness(Slew::new(config.initial_level)),
        )?;
        scheduler.register(Milliseconds(config.status_period_ms), Effect::StatusRefresh)?;
        scheduler.register(Milliseconds(config.digit_period_ms), Effect::DigitRefresh)?;

        let clock =
            LocalClock::new(config.utc_offset_seconds, config.sync_interval_ms, config.sync_retry_ms)?;

        info!("desk clock ready with {} slots", scheduler.len());
        Ok(DeskClock { scene: Scene::new(config), scheduler, clock, dot_slots, last_poll: None })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn scheduler(&self) -> &Scheduler<Effect, MAX_SLOTS> {
        &self.scheduler
    }

    pub fn clock(&self) -> &LocalClock {
        &self.clock
    }

    pub fn dot_slots(&self) -> &[SlotId; DOT_COUNT] {
        &self.dot_slots
    }

    /// One main loop iteration: refreshes the time of day when the poll interval is up, reacts
    /// to a new minute, then ticks every slot.
    pub fn update(&mut self, now: Milliseconds<u32>, devices: &mut Devices) {
        if self.poll_due(now) {
            self.last_poll = Some(now);
            self.refresh_time(now, devices);
        }

        let mut ctx = Context { scene: &mut self.scene, devices };
        self.scheduler.tick(now, &mut ctx);
    }

    fn poll_due(&self, now: Milliseconds<u32>) -> bool {
        match self.last_poll {
            Some(last) => ms_between(last, now) >= self.scene.config.clock_poll_ms,
            None => true,
        }
    }

    fn refresh_time(&mut self, now: Milliseconds<u32>, devices: &mut Devices) {
        let time = self.clock.poll(now, devices.time);
        self.scene.state.time = time;

        if let Some(t) = time {
            if self.scene.state.observe_minute(t.minute) {
                self.on_new_minute();
            }
        }
    }

    /// Starts the digit transition, picks a new theme hue and brings the dots back in phase.
    pub fn on_new_minute(&mut self) {
        let scene = &mut self.scene;
        scene.state.flicker_countdown = scene.config.flicker_ticks;
        scene.state.hue = scene.rng.gen_range(0.0..1.0);

        for slot in self.dot_slots {
            if let Err(e) = self.scheduler.restart(slot) {
                warn!("dot slot {} not restarted: {}", slot.0, e);
            }
        }
        info!("new minute");
    }
}
