// Mock collaborators shared by the host integration tests
#![allow(dead_code)]

use cyberclock::clock::UnixSeconds;
use cyberclock::colors::Color;
use cyberclock::digits::DigitFrame;
use cyberclock::effects::StatusFrame;
use cyberclock::hardware::{
    BrightnessOutput, Devices, DigitOutput, LightSensor, LinkStatus, PixelOutput, StatusDisplay,
    TimeSource,
};
use cyberclock::{Error, Result, NUM_PIXELS};
use embedded_time::duration::Milliseconds;

/// 2024-03-15 10:34:56 UTC, 12:34:56 with the default two hour offset
pub const FRIDAY_12_34_56: i64 = 1_710_498_896;

#[derive(Default)]
pub struct Digits {
    pub frames: Vec<DigitFrame>,
}

impl Digits {
    pub fn last(&self) -> DigitFrame {
        *self.frames.last().expect("no digit frame shown yet")
    }
}

impl DigitOutput for Digits {
    fn show(&mut self, frame: &DigitFrame) -> Result<()> {
        self.frames.push(*frame);
        Ok(())
    }
}

#[derive(Default)]
pub struct Pixels {
    pub pushes: usize,
    pub last: Vec<Color>,
    pub broken: bool,
}

impl PixelOutput for Pixels {
    fn show(&mut self, pixels: &[Color]) -> Result<()> {
        if self.broken {
            return Err(Error::Transfer);
        }
        assert_eq!(pixels.len(), NUM_PIXELS);
        self.pushes += 1;
        self.last = pixels.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub struct Status {
    pub frames: Vec<StatusFrame>,
}

impl StatusDisplay for Status {
    fn show(&mut self, frame: &StatusFrame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Returns `lux` on every read, or the given failure.
pub struct Light {
    pub lux: f32,
    pub failure: Option<nb::Error<Error>>,
    pub reads: usize,
}

impl Default for Light {
    fn default() -> Self {
        Light { lux: 25.0, failure: None, reads: 0 }
    }
}

impl LightSensor for Light {
    fn read_lux(&mut self) -> nb::Result<f32, Error> {
        self.reads += 1;
        match self.failure {
            Some(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            Some(nb::Error::Other(e)) => Err(nb::Error::Other(e)),
            None => Ok(self.lux),
        }
    }
}

#[derive(Default)]
pub struct Pwm {
    pub duties: Vec<u16>,
}

impl BrightnessOutput for Pwm {
    fn set_duty(&mut self, duty: u16) -> Result<()> {
        self.duties.push(duty);
        Ok(())
    }
}

/// Network time that is down for the first `failures_left` requests.
#[derive(Default)]
pub struct Network {
    pub unix: Option<i64>,
    pub failures_left: u32,
    pub fetches: usize,
}

impl TimeSource for Network {
    fn fetch(&mut self) -> nb::Result<UnixSeconds, Error> {
        self.fetches += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(nb::Error::Other(Error::TimeUnavailable));
        }
        self.unix.map(UnixSeconds).ok_or(nb::Error::Other(Error::TimeUnavailable))
    }
}

pub struct Link {
    pub address: Option<[u8; 4]>,
    pub rssi: Option<i8>,
}

impl Default for Link {
    fn default() -> Self {
        Link { address: Some([192, 168, 1, 20]), rssi: Some(-61) }
    }
}

impl LinkStatus for Link {
    fn address(&self) -> Option<[u8; 4]> {
        self.address
    }

    fn rssi(&self) -> Option<i8> {
        self.rssi
    }
}

/// One of every collaborator.
#[derive(Default)]
pub struct Rig {
    pub digits: Digits,
    pub pixels: Pixels,
    pub status: Status,
    pub light: Light,
    pub pwm: Pwm,
    pub network: Network,
    pub link: Link,
}

impl Rig {
    pub fn online(unix: i64) -> Self {
        Rig { network: Network { unix: Some(unix), ..Network::default() }, ..Rig::default() }
    }

    pub fn devices(&mut self) -> Devices<'_> {
        Devices {
            digits: &mut self.digits,
            pixels: &mut self.pixels,
            status: &mut self.status,
            light: &mut self.light,
            brightness: &mut self.pwm,
            time: &mut self.network,
            link: &self.link,
        }
    }
}

pub fn ms(value: u32) -> Milliseconds<u32> {
    Milliseconds(value)
}
