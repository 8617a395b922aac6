//! PID Definitions and Decoding
//!
//! The mode-01 PIDs polled on every hardware tick, with the standard OBD-II
//! decoding formulas. Decoded values are integers in the units the wire
//! payload carries.

/// Mode-01 PIDs polled each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Pid {
    /// Engine coolant temperature (0x05)
    CoolantTemp = 0x05,
    /// Short-term fuel trim bank 1 (0x06)
    ShortFuelTrim = 0x06,
    /// Long-term fuel trim bank 1 (0x07)
    LongFuelTrim = 0x07,
    /// Vehicle speed (0x0D)
    Speed = 0x0D,
    /// Intake air temperature (0x0F)
    IntakeAirTemp = 0x0F,
    /// Throttle position (0x11)
    ThrottlePosition = 0x11,
}

impl Pid {
    /// Everything queried on a normal tick
    pub const TICK_SET: [Pid; 6] = [
        Pid::Speed,
        Pid::ThrottlePosition,
        Pid::CoolantTemp,
        Pid::IntakeAirTemp,
        Pid::ShortFuelTrim,
        Pid::LongFuelTrim,
    ];

    /// PID hex value
    pub fn as_hex(&self) -> u8 {
        *self as u8
    }

    /// Mode-01 request string as sent to the adapter
    pub fn command(&self) -> String {
        format!("01{:02X}", self.as_hex())
    }

    /// Decode response data bytes to an integer reading
    ///
    /// Returns `None` when too few bytes arrived. Percent channels are
    /// clamped: throttle to [0,100], fuel trims to [-100,100].
    pub fn decode(&self, bytes: &[u8]) -> Option<i64> {
        let a = *bytes.first()? as f64;

        let value = match self {
            // Speed: A (km/h)
            Pid::Speed => a,
            // Throttle position: A * 100 / 255 (%)
            Pid::ThrottlePosition => (a * 100.0 / 255.0).round().clamp(0.0, 100.0),
            // Temperatures: A - 40 (°C)
            Pid::CoolantTemp | Pid::IntakeAirTemp => a - 40.0,
            // Fuel trims: (A - 128) * 100 / 128 (%)
            Pid::ShortFuelTrim | Pid::LongFuelTrim => {
                ((a - 128.0) * 100.0 / 128.0).round().clamp(-100.0, 100.0)
            }
        };

        Some(value.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_decode() {
        // 0x55 = 85 km/h
        assert_eq!(Pid::Speed.decode(&[0x55]), Some(85));
    }

    #[test]
    fn test_coolant_temp_decode() {
        // 0x73 = 115, so temp = 115 - 40 = 75°C
        assert_eq!(Pid::CoolantTemp.decode(&[0x73]), Some(75));
    }

    #[test]
    fn test_throttle_decode_and_clamp() {
        // 0x80 = 128 => 128 * 100 / 255 = 50.2 => 50
        assert_eq!(Pid::ThrottlePosition.decode(&[0x80]), Some(50));
        assert_eq!(Pid::ThrottlePosition.decode(&[0xFF]), Some(100));
        assert_eq!(Pid::ThrottlePosition.decode(&[0x00]), Some(0));
    }

    #[test]
    fn test_fuel_trim_decode() {
        // 0x80 = 128 => 0%
        assert_eq!(Pid::ShortFuelTrim.decode(&[0x80]), Some(0));
        // 0x90 = 144 => (144-128)*100/128 = 12.5 => 13 (round half away)
        assert_eq!(Pid::ShortFuelTrim.decode(&[0x90]), Some(13));
        // 0x00 => -100%
        assert_eq!(Pid::LongFuelTrim.decode(&[0x00]), Some(-100));
    }

    #[test]
    fn test_decode_short_response() {
        assert_eq!(Pid::Speed.decode(&[]), None);
    }

    #[test]
    fn test_command_formatting() {
        assert_eq!(Pid::Speed.command(), "010D");
        assert_eq!(Pid::CoolantTemp.command(), "0105");
    }
}
