//! Fixed-layout controller input report.
//!
//! Only the pieces the motion core needs are decoded: the tag byte and the
//! two blocks of three little-endian `i16` sensor fields. Everything else in
//! the 64-byte report (sticks, buttons, touchpad) is ignored.

use crate::types::RawTriple;

/// Tag byte of a full sensor report
pub const SENSOR_REPORT_TAG: u8 = 0x11;

/// Size of the packed report structure; shorter buffers are rejected
pub const SENSOR_REPORT_LEN: usize = 64;

/// Offset of the angular-rate block (x, y, z)
pub const GYRO_OFFSET: usize = 13;

/// Offset of the acceleration block (x, y, z)
pub const ACCEL_OFFSET: usize = 19;

/// Sensor payload extracted from one report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorReport {
    pub accel: RawTriple,
    pub gyro: RawTriple,
}

/// Outcome of looking at a transport buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// Tagged sensor report with a usable payload
    Sensor(SensorReport),
    /// Some other report type; not for us
    Other(u8),
    /// Tagged as a sensor report but too short to hold one
    Truncated(usize),
    Empty,
}

impl SensorReport {
    /// Classify a raw transport buffer
    pub fn classify(buf: &[u8]) -> ReportKind {
        match buf.first() {
            None => ReportKind::Empty,
            Some(&tag) if tag != SENSOR_REPORT_TAG => ReportKind::Other(tag),
            Some(_) if buf.len() < SENSOR_REPORT_LEN => ReportKind::Truncated(buf.len()),
            Some(_) => ReportKind::Sensor(SensorReport {
                accel: read_triple(buf, ACCEL_OFFSET),
                gyro: read_triple(buf, GYRO_OFFSET),
            }),
        }
    }

    /// Decode a buffer, returning `None` for anything that is not a complete
    /// sensor report
    pub fn parse(buf: &[u8]) -> Option<SensorReport> {
        match Self::classify(buf) {
            ReportKind::Sensor(report) => Some(report),
            _ => None,
        }
    }

    /// Encode into a zero-padded report buffer. Used by simulated transports.
    pub fn to_bytes(&self) -> [u8; SENSOR_REPORT_LEN] {
        let mut buf = [0u8; SENSOR_REPORT_LEN];
        buf[0] = SENSOR_REPORT_TAG;
        write_triple(&mut buf, GYRO_OFFSET, &self.gyro);
        write_triple(&mut buf, ACCEL_OFFSET, &self.accel);
        buf
    }
}

fn read_triple(buf: &[u8], offset: usize) -> RawTriple {
    let field = |i: usize| {
        let at = offset + 2 * i;
        i16::from_le_bytes([buf[at], buf[at + 1]])
    };
    [field(0), field(1), field(2)]
}

fn write_triple(buf: &mut [u8], offset: usize, values: &RawTriple) {
    for (i, value) in values.iter().enumerate() {
        let at = offset + 2 * i;
        buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }
}
