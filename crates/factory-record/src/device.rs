//! Monitored subsystems and the per-unit device table.
//!
//! Every robot base under test is checked subsystem by subsystem. Each
//! [`Device`] owns exactly one slot in a [`DeviceTable`]: a pass flag and a
//! raw 64-bit reading whose meaning depends on the device (event counts, raw
//! ADC samples, or the packed version word for [`Device::VInfo`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One monitored subsystem of the robot base.
///
/// The enumeration is closed; [`Device::ALL`] lists every variant in slot
/// order and [`Device::COUNT`] sizes the device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Device {
    /// Packed hardware/firmware/software version word
    VInfo,
    /// Left docking IR receiver
    IrDockL,
    /// Central docking IR receiver
    IrDockC,
    /// Right docking IR receiver
    IrDockR,
    /// Gyroscope
    ImuDev,
    /// Button B0
    #[serde(rename = "BUTTON_0")]
    Button0,
    /// Button B1
    #[serde(rename = "BUTTON_1")]
    Button1,
    /// Button B2
    #[serde(rename = "BUTTON_2")]
    Button2,
    /// Left bumper
    BumperL,
    /// Central bumper
    BumperC,
    /// Right bumper
    BumperR,
    /// Left wheel drop sensor
    WDropL,
    /// Right wheel drop sensor
    WDropR,
    /// Left cliff sensor
    CliffL,
    /// Central cliff sensor
    CliffC,
    /// Right cliff sensor
    CliffR,
    /// Adapter jack power source
    PwrJack,
    /// Docking station power source
    PwrDock,
    /// Battery charging
    Charging,
    /// External power output
    ExtPwr,
    /// Digital input port
    Input,
    /// Digital output port
    Output,
    /// LED 1
    #[serde(rename = "LED_1")]
    Led1,
    /// LED 2
    #[serde(rename = "LED_2")]
    Led2,
    /// Buzzer
    Sounds,
    /// Left wheel motor
    MotorL,
    /// Right wheel motor
    MotorR,
}

impl Device {
    /// Number of devices, and therefore of device table slots.
    pub const COUNT: usize = 27;

    /// Every device in slot order.
    pub const ALL: [Device; Device::COUNT] = [
        Device::VInfo,
        Device::IrDockL,
        Device::IrDockC,
        Device::IrDockR,
        Device::ImuDev,
        Device::Button0,
        Device::Button1,
        Device::Button2,
        Device::BumperL,
        Device::BumperC,
        Device::BumperR,
        Device::WDropL,
        Device::WDropR,
        Device::CliffL,
        Device::CliffC,
        Device::CliffR,
        Device::PwrJack,
        Device::PwrDock,
        Device::Charging,
        Device::ExtPwr,
        Device::Input,
        Device::Output,
        Device::Led1,
        Device::Led2,
        Device::Sounds,
        Device::MotorL,
        Device::MotorR,
    ];

    /// Slot of this device in a [`DeviceTable`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical upper-snake name, as used in unit reports and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Device::VInfo => "V_INFO",
            Device::IrDockL => "IR_DOCK_L",
            Device::IrDockC => "IR_DOCK_C",
            Device::IrDockR => "IR_DOCK_R",
            Device::ImuDev => "IMU_DEV",
            Device::Button0 => "BUTTON_0",
            Device::Button1 => "BUTTON_1",
            Device::Button2 => "BUTTON_2",
            Device::BumperL => "BUMPER_L",
            Device::BumperC => "BUMPER_C",
            Device::BumperR => "BUMPER_R",
            Device::WDropL => "W_DROP_L",
            Device::WDropR => "W_DROP_R",
            Device::CliffL => "CLIFF_L",
            Device::CliffC => "CLIFF_C",
            Device::CliffR => "CLIFF_R",
            Device::PwrJack => "PWR_JACK",
            Device::PwrDock => "PWR_DOCK",
            Device::Charging => "CHARGING",
            Device::ExtPwr => "EXT_PWR",
            Device::Input => "INPUT",
            Device::Output => "OUTPUT",
            Device::Led1 => "LED_1",
            Device::Led2 => "LED_2",
            Device::Sounds => "SOUNDS",
            Device::MotorL => "MOTOR_L",
            Device::MotorR => "MOTOR_R",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a device name does not match any [`Device`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown device: {0}")]
pub struct UnknownDevice(pub String);

impl FromStr for Device {
    type Err = UnknownDevice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Device::ALL
            .iter()
            .copied()
            .find(|device| device.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDevice(s.to_string()))
    }
}

/// Docking IR receivers.
pub const IR_DOCK: [Device; 3] = [Device::IrDockL, Device::IrDockC, Device::IrDockR];
/// Front panel buttons.
pub const BUTTONS: [Device; 3] = [Device::Button0, Device::Button1, Device::Button2];
/// Bumpers.
pub const BUMPERS: [Device; 3] = [Device::BumperL, Device::BumperC, Device::BumperR];
/// Wheel drop sensors.
pub const WHEEL_DROPS: [Device; 2] = [Device::WDropL, Device::WDropR];
/// Cliff sensors.
pub const CLIFFS: [Device; 3] = [Device::CliffL, Device::CliffC, Device::CliffR];
/// Power sources.
pub const POWER_SOURCES: [Device; 2] = [Device::PwrJack, Device::PwrDock];
/// Wheel motors.
pub const MOTORS: [Device; 2] = [Device::MotorL, Device::MotorR];
/// Devices no station check exercises yet; they are force-passed at finalization.
pub const UNTESTABLE: [Device; 3] = [Device::ExtPwr, Device::Input, Device::Output];

/// Pass flag and raw reading for every [`Device`] of one unit.
///
/// The table always holds exactly [`Device::COUNT`] slots. A device the
/// driver never touched reads as failed with a zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTable {
    ok: [bool; Device::COUNT],
    values: [i64; Device::COUNT],
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTable {
    /// Create a table with every flag cleared and every value zero.
    pub const fn new() -> Self {
        Self {
            ok: [false; Device::COUNT],
            values: [0; Device::COUNT],
        }
    }

    /// Pass flag of `device`.
    pub fn is_ok(&self, device: Device) -> bool {
        self.ok.get(device.index()).copied().unwrap_or(false)
    }

    /// Set the pass flag of `device`.
    pub fn set_ok(&mut self, device: Device, ok: bool) {
        if let Some(slot) = self.ok.get_mut(device.index()) {
            *slot = ok;
        }
    }

    /// Raw reading of `device`.
    pub fn value(&self, device: Device) -> i64 {
        self.values.get(device.index()).copied().unwrap_or(0)
    }

    /// Set the raw reading of `device`.
    pub fn set_value(&mut self, device: Device, value: i64) {
        if let Some(slot) = self.values.get_mut(device.index()) {
            *slot = value;
        }
    }

    /// Store both the pass flag and the raw reading of `device`.
    pub fn record(&mut self, device: Device, ok: bool, value: i64) {
        self.set_ok(device, ok);
        self.set_value(device, value);
    }

    /// True iff every device in `group` passed.
    pub fn group_ok(&self, group: &[Device]) -> bool {
        group.iter().all(|&device| self.is_ok(device))
    }

    /// True iff every slot passed. Pure; see
    /// [`DiagnosticRecord::all_ok`](crate::DiagnosticRecord::all_ok) for the
    /// finalizing variant.
    pub fn all_ok(&self) -> bool {
        self.ok.iter().all(|&ok| ok)
    }

    /// Devices whose flag is cleared, in slot order.
    pub fn failed_devices(&self) -> impl Iterator<Item = Device> + '_ {
        Device::ALL
            .iter()
            .copied()
            .filter(|&device| !self.is_ok(device))
    }

    /// Iterate `(device, ok, value)` over every slot in order.
    pub fn iter(&self) -> impl Iterator<Item = (Device, bool, i64)> + '_ {
        Device::ALL
            .iter()
            .map(|&device| (device, self.is_ok(device), self.value(device)))
    }
}
