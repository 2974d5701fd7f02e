mod common;

use common::*;
use cyberclock::config::ClockConfig;
use cyberclock::controller::DeskClock;
use cyberclock::digits::{DigitFrame, Glyph};
use cyberclock::scheduler::SlotId;
use cyberclock::DOT_COUNT;

const TRAIL_SLOT: SlotId = SlotId(DOT_COUNT);

#[test]
fn no_network_keeps_everything_running() {
    let mut rig = Rig::default();
    rig.link.address = None;
    rig.link.rssi = None;
    let mut clock = DeskClock::new(ClockConfig::DEFAULT).unwrap();

    for t in 0..2_000 {
        clock.update(ms(t), &mut rig.devices());
    }

    assert!(!clock.clock().is_synced());
    assert_eq!(clock.clock().failures(), 1);
    // the retry interval has not passed yet
    assert_eq!(rig.network.fetches, 1);

    assert_eq!(rig.pixels.pushes, 2_000);
    assert_eq!(rig.digits.frames.len(), 2_000);
    assert_eq!(rig.digits.last(), DigitFrame::filled(Glyph::Dash));

    assert_eq!(rig.status.frames.len(), 19);
    let status = rig.status.frames.last().unwrap();
    assert_eq!(status.time.as_str(), "--:--:--");
    assert_eq!(status.address.as_str(), "offline");
}

#[test]
fn time_shows_up_after_a_retry() {
    let config = ClockConfig { sync_retry_ms: 500, ..ClockConfig::DEFAULT };
    let mut rig = Rig::online(FRIDAY_12_34_56);
    rig.network.failures_left = 1;
    let mut clock = DeskClock::new(config).unwrap();

    for t in 0..=1_000 {
        clock.update(ms(t), &mut rig.devices());
    }

    assert_eq!(rig.network.fetches, 2);
    assert_eq!(clock.clock().failures(), 0);
    assert_eq!(rig.digits.frames[499], DigitFrame::filled(Glyph::Dash));
    assert_eq!(rig.digits.last().segments, DigitFrame::from_value(123_456).segments);

    let status = rig.status.frames.last().unwrap();
    assert_eq!(status.time.as_str(), "12:34:56.5");
    assert_eq!(status.weekday, "Friday");
    assert_eq!(status.date.as_str(), "15 Mar 2024");
    assert_eq!(status.address.as_str(), "192.168.1.20");
}

#[test]
fn broken_strip_does_not_stop_the_digits() {
    let mut rig = Rig::online(FRIDAY_12_34_56);
    rig.pixels.broken = true;
    let mut clock = DeskClock::new(ClockConfig::DEFAULT).unwrap();

    for t in 0..100 {
        clock.update(ms(t), &mut rig.devices());
    }

    assert_eq!(clock.scheduler().slot(TRAIL_SLOT).unwrap().failures(), 100);
    assert_eq!(rig.digits.frames.len(), 100);
    assert_eq!(rig.digits.last().segments, DigitFrame::from_value(123_456).segments);
}
