//! ELM327 Client
//!
//! Drives an ELM327-compatible adapter over a serial port: reset and
//! configure on connect, then plain-text mode-01 queries terminated by the
//! `>` prompt. The serial link is treated as disposable: any I/O failure
//! drops the port and the next tick reopens it, rate limited so a pulled USB
//! cable does not spin the loop.

use crate::error::ObdError;
use crate::pid::Pid;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

/// Per-command response timeout
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
/// Minimum gap between reconnection attempts
const RETRY_DELAY: Duration = Duration::from_secs(3);
/// Adapter setup sequence: reset, echo off, linefeeds off, auto protocol
const INIT_COMMANDS: [&str; 4] = ["ATZ", "ATE0", "ATL0", "ATSP0"];

enum Backend {
    Serial {
        device: String,
        baud: u32,
        port: Option<SerialStream>,
    },
    Mock(MockEcu),
}

/// Client for one OBD-II adapter
pub struct ElmClient {
    backend: Backend,
    last_attempt: Option<Instant>,
}

impl ElmClient {
    /// Client over a real serial device (e.g. `/dev/ttyUSB0` at 115200)
    pub fn serial(device: &str, baud: u32) -> Self {
        Self {
            backend: Backend::Serial {
                device: device.to_string(),
                baud,
                port: None,
            },
            last_attempt: None,
        }
    }

    /// Client over a scripted mock ECU, for tests
    pub fn mock(ecu: MockEcu) -> Self {
        Self {
            backend: Backend::Mock(ecu),
            last_attempt: None,
        }
    }

    /// Whether a link to the adapter is currently open
    pub fn is_connected(&self) -> bool {
        match &self.backend {
            Backend::Serial { port, .. } => port.is_some(),
            Backend::Mock(_) => true,
        }
    }

    /// Open and initialize the adapter if necessary
    ///
    /// Attempts are rate limited; a failed attempt inside the window returns
    /// `NotConnected` without touching the port.
    pub async fn ensure_connected(&mut self) -> Result<(), ObdError> {
        let Backend::Serial { device, baud, port } = &mut self.backend else {
            return Ok(());
        };
        if port.is_some() {
            return Ok(());
        }

        if let Some(last) = self.last_attempt {
            if last.elapsed() < RETRY_DELAY {
                return Err(ObdError::NotConnected);
            }
        }
        self.last_attempt = Some(Instant::now());

        info!("Connecting to OBD adapter on {} @ {} baud", device, baud);
        let mut stream = tokio_serial::new(device.as_str(), *baud).open_native_async()?;

        for command in INIT_COMMANDS {
            let reply = Self::exchange(&mut stream, command).await?;
            debug!("Init {} -> {}", command, reply);
        }

        info!("OBD adapter initialized");
        *port = Some(stream);
        Ok(())
    }

    /// Drop the serial link
    pub fn disconnect(&mut self) {
        if let Backend::Serial { port, .. } = &mut self.backend {
            if port.take().is_some() {
                info!("Disconnected from OBD adapter");
            }
        }
    }

    /// Query one PID and decode its reading
    ///
    /// `NoData` means the vehicle had nothing to say for this PID; any other
    /// error means the link dropped and has been closed.
    pub async fn query(&mut self, pid: Pid) -> Result<i64, ObdError> {
        let text = self.request(&pid.command()).await?;
        let data = parse_pid_response(pid, &text)?;

        pid.decode(&data)
            .ok_or_else(|| ObdError::InvalidResponse(format!("short response: {}", text)))
    }

    /// Read the adapter's supply voltage via `ATRV`
    pub async fn read_voltage(&mut self) -> Result<f64, ObdError> {
        let text = self.request("ATRV").await?;
        parse_voltage(&text).ok_or_else(|| ObdError::InvalidResponse(text))
    }

    async fn request(&mut self, command: &str) -> Result<String, ObdError> {
        match &mut self.backend {
            Backend::Mock(ecu) => ecu.respond(command),
            Backend::Serial { port, .. } => {
                let stream = port.as_mut().ok_or(ObdError::NotConnected)?;
                match Self::exchange(stream, command).await {
                    Ok(text) => Ok(text),
                    Err(e) => {
                        warn!("Adapter exchange failed ({}); dropping link", e);
                        *port = None;
                        Err(e)
                    }
                }
            }
        }
    }

    /// One command/response round trip, reading until the `>` prompt
    async fn exchange(port: &mut SerialStream, command: &str) -> Result<String, ObdError> {
        port.write_all(command.as_bytes()).await?;
        port.write_all(b"\r").await?;

        let mut accumulated = Vec::new();
        let mut buf = [0u8; 256];
        loop {
            let n = timeout(COMMAND_TIMEOUT, port.read(&mut buf))
                .await
                .map_err(|_| ObdError::Timeout(COMMAND_TIMEOUT.as_millis() as u64))??;
            if n == 0 {
                return Err(ObdError::Serial("port closed".to_string()));
            }
            accumulated.extend_from_slice(&buf[..n]);
            if accumulated.contains(&b'>') {
                break;
            }
        }

        Ok(String::from_utf8_lossy(&accumulated)
            .replace('>', "")
            .trim()
            .to_string())
    }
}

/// Extract the data bytes from a mode-01 response line
///
/// Accepts multi-line adapter chatter and ignores anything that is not a hex
/// pair; the payload is whatever follows the `41 <pid>` header.
fn parse_pid_response(pid: Pid, text: &str) -> Result<Vec<u8>, ObdError> {
    let upper = text.to_uppercase();
    if upper.contains("NO DATA") || upper.contains("UNABLE") || upper.contains('?') {
        return Err(ObdError::NoData(pid.as_hex()));
    }

    let bytes: Vec<u8> = upper
        .split_whitespace()
        .filter(|token| token.len() == 2)
        .filter_map(|token| u8::from_str_radix(token, 16).ok())
        .collect();

    let header = [0x41, pid.as_hex()];
    let pos = bytes
        .windows(2)
        .position(|window| window == header)
        .ok_or_else(|| ObdError::InvalidResponse(text.to_string()))?;

    Ok(bytes[pos + 2..].to_vec())
}

/// Parse an `ATRV` reply like `12.6V`, clamped non-negative, one decimal
fn parse_voltage(text: &str) -> Option<f64> {
    let volts: f64 = text.trim().trim_end_matches(['V', 'v']).trim().parse().ok()?;
    Some((volts.max(0.0) * 10.0).round() / 10.0)
}

/// Scripted ECU responses keyed by command string
///
/// Unknown commands answer `?`, the way a real ELM327 does.
pub struct MockEcu {
    responses: HashMap<String, String>,
}

impl MockEcu {
    /// An ECU that answers every tick-set PID with a plausible reading
    pub fn healthy() -> Self {
        let mut responses = HashMap::new();
        responses.insert("ATZ".to_string(), "ELM327 v1.5".to_string());
        responses.insert("ATE0".to_string(), "OK".to_string());
        responses.insert("ATL0".to_string(), "OK".to_string());
        responses.insert("ATSP0".to_string(), "OK".to_string());
        responses.insert("ATRV".to_string(), "12.6V".to_string());
        responses.insert("010D".to_string(), "41 0D 3C".to_string()); // 60 km/h
        responses.insert("0111".to_string(), "41 11 80".to_string()); // 50%
        responses.insert("0105".to_string(), "41 05 7B".to_string()); // 83°C
        responses.insert("010F".to_string(), "41 0F 37".to_string()); // 15°C
        responses.insert("0106".to_string(), "41 06 85".to_string()); // +4%
        responses.insert("0107".to_string(), "41 07 80".to_string()); // 0%
        Self { responses }
    }

    /// Override the reply for one command
    pub fn set_response(&mut self, command: &str, response: &str) {
        self.responses
            .insert(command.to_string(), response.to_string());
    }

    /// Make one PID stop answering
    pub fn silence(&mut self, pid: Pid) {
        self.set_response(&pid.command(), "NO DATA");
    }

    fn respond(&mut self, command: &str) -> Result<String, ObdError> {
        Ok(self
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| "?".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_query_round_trip() {
        let mut client = ElmClient::mock(MockEcu::healthy());
        client.ensure_connected().await.unwrap();

        assert_eq!(client.query(Pid::Speed).await.unwrap(), 60);
        assert_eq!(client.query(Pid::CoolantTemp).await.unwrap(), 83);
        assert_eq!(client.query(Pid::LongFuelTrim).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_silenced_pid_reports_no_data() {
        let mut ecu = MockEcu::healthy();
        ecu.silence(Pid::IntakeAirTemp);
        let mut client = ElmClient::mock(ecu);

        let err = client.query(Pid::IntakeAirTemp).await.unwrap_err();
        assert!(matches!(err, ObdError::NoData(0x0F)));
        // Other PIDs keep answering
        assert_eq!(client.query(Pid::Speed).await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_voltage_read() {
        let mut client = ElmClient::mock(MockEcu::healthy());
        assert!((client.read_voltage().await.unwrap() - 12.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_command_is_no_data() {
        let mut ecu = MockEcu::healthy();
        ecu.set_response("010D", "?");
        let mut client = ElmClient::mock(ecu);

        assert!(matches!(
            client.query(Pid::Speed).await.unwrap_err(),
            ObdError::NoData(0x0D)
        ));
    }

    #[test]
    fn test_parse_multi_line_response() {
        let text = "SEARCHING...\r\n41 0D 55\r\n";
        assert_eq!(parse_pid_response(Pid::Speed, text).unwrap(), vec![0x55]);
    }

    #[test]
    fn test_parse_response_without_header() {
        assert!(matches!(
            parse_pid_response(Pid::Speed, "41 0C 1A 2B"),
            Err(ObdError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_voltage_formats() {
        assert_eq!(parse_voltage("12.6V"), Some(12.6));
        assert_eq!(parse_voltage("11.98V"), Some(12.0)); // rounded to one decimal
        assert_eq!(parse_voltage("garbage"), None);
    }
}
