#![no_std]
#![no_main]

use cyberclock::*;

use clock::UnixSeconds;
use config::ClockConfig;
use controller::DeskClock;
use hardware::{
    Devices, LightSensor, LinkStatus, OutputEnable, PeriodicTimer, ShiftRegisterDigits,
    TextStatus, TimeSource,
};
use leds::ws28xx::StripDriver;

use core::fmt::Write;
use embedded_time::duration::*;
use embedded_time::rate::*;

use bl602_hal as hal;
use hal::{
    clock::{Strict, SysclkFreq, UART_PLL_FREQ},
    pac,
    prelude::*,
    serial::*,
    timer::*,
};
use panic_write::PanicHandler;

const SYSCLK_HZ: u32 = 160_000_000;
const CYCLES_PER_MS: u64 = (SYSCLK_HZ / 1_000) as u64;

/// Milliseconds since reset, wrapping like every other uptime in the clock.
fn uptime() -> Milliseconds<u32> {
    Milliseconds((riscv::register::mcycle::read64() / CYCLES_PER_MS) as u32)
}

/// This board has no light sensor, it reports a fixed office-lighting level.
struct FixedLight(f32);

impl LightSensor for FixedLight {
    fn read_lux(&mut self) -> nb::Result<f32, Error> {
        Ok(self.0)
    }
}

/// There is no network stack for the radio yet, so there is no time and no link.
struct Offline;

impl TimeSource for Offline {
    fn fetch(&mut self) -> nb::Result<UnixSeconds, Error> {
        Err(nb::Error::Other(Error::TimeUnavailable))
    }
}

impl LinkStatus for Offline {
    fn address(&self) -> Option<[u8; 4]> {
        None
    }

    fn rssi(&self) -> Option<i8> {
        None
    }
}

#[riscv_rt::entry]
fn main() -> ! {
    // get the peripherals
    let dp = pac::Peripherals::take().unwrap();
    let mut gpio_pins = dp.GLB.split();

    // Set up all the clocks we need
    let clocks = Strict::new()
        .use_pll(40_000_000u32.Hz())
        .sys_clk(SysclkFreq::Pll160Mhz)
        .uart_clk(UART_PLL_FREQ.Hz())
        .freeze(&mut gpio_pins.clk_cfg);

    // channel 0 paces the strip bits, channel 1 the main loop
    let timers = dp.TIMER.split();
    let timer_ch0 = timers
        .channel0
        .set_clock_source(ClockSource::Fclk(&clocks), SYSCLK_HZ.Hz());
    let mut timer_ch1 = timers
        .channel1
        .set_clock_source(ClockSource::Fclk(&clocks), SYSCLK_HZ.Hz());

    // Set up uart output for debug printing. Since this microcontroller has a pin matrix,
    // we need to set up both the pins and the muxs
    let pin16 = gpio_pins.pin16.into_uart_sig0();
    let pin7 = gpio_pins.pin7.into_uart_sig7();
    let mux0 = gpio_pins.uart_mux0.into_uart0_tx();
    let mux7 = gpio_pins.uart_mux7.into_uart0_rx();

    // Configure our UART to 2MBaud, and use the pins we configured above
    let serial = Serial::uart0(
        dp.UART,
        Config::default().baudrate(2_000_000.Bd()),
        ((pin16, mux0), (pin7, mux7)),
        clocks,
    );

    // writes panic messages to serial to see where things went wrong
    let mut serial = PanicHandler::new(serial);
    writeln!(serial, "Debug Serial Initialized...\r").ok();

    let config = ClockConfig::DEFAULT;
    let mut desk_clock = match DeskClock::new(config) {
        Ok(desk_clock) => desk_clock,
        Err(e) => panic!("bad clock configuration: {}", e),
    };

    let mut strip_pin = gpio_pins.pin0.into_pull_down_output();
    let mut strip: StripDriver<_, STRIP_BYTE_BUFFER_LENGTH> =
        StripDriver::new(&mut strip_pin, timer_ch0, &CLOCK_STRIP);

    let mut digits = ShiftRegisterDigits::new(
        gpio_pins.pin1.into_pull_down_output(),
        gpio_pins.pin3.into_pull_down_output(),
        gpio_pins.pin4.into_pull_down_output(),
    );

    // no PWM channel on the output enable yet, so the digits stay at full brightness
    let mut brightness =
        OutputEnable::new(gpio_pins.pin5.into_pull_down_output(), config.pwm_max_duty);

    let mut light = FixedLight(25.0);
    let mut network = Offline;
    let link = Offline;
    let mut status = TextStatus::new(&mut *serial);

    let mut devices = Devices {
        digits: &mut digits,
        pixels: &mut strip,
        status: &mut status,
        light: &mut light,
        brightness: &mut brightness,
        time: &mut network,
        link: &link,
    };

    // every loop iteration takes at least a millisecond
    timer_ch1.periodic_start(1_000_000_u32.nanoseconds());
    loop {
        desk_clock.update(uptime(), &mut devices);
        timer_ch1.periodic_wait();
    }
}
