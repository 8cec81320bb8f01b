//! Typed feedback reports decoded from raw driver packets.
//!
//! Decoding happens once at the boundary; the effect table only ever sees
//! [`FfbReport`] values.

use serde::{Deserialize, Serialize};
use vrwheel_errors::{DecodeError, DecodeResult};

use crate::constants::*;
use crate::effects::{EffectDirection, EffectParams, EffectType, PeriodicParams, RampParams};
use crate::reader::ReportReader;

/// Device-level gain, `0..=255`.
///
/// # Examples
///
/// ```
/// use vrwheel_ffb::DeviceGain;
///
/// let gain = DeviceGain::try_from(200).unwrap_or_default();
/// assert!((gain.coefficient() - 200.0 / 255.0).abs() < 1e-12);
/// assert!(DeviceGain::try_from(256).is_err());
/// assert!(DeviceGain::try_from(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGain(u8);

impl DeviceGain {
    pub const FULL: Self = Self(MAX_GAIN);

    pub fn raw(self) -> u8 {
        self.0
    }

    /// Always within `[0, 1]`.
    pub fn coefficient(self) -> f64 {
        (f64::from(self.0) / f64::from(MAX_GAIN)).clamp(0.0, 1.0)
    }
}

impl Default for DeviceGain {
    fn default() -> Self {
        Self::FULL
    }
}

impl From<u8> for DeviceGain {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl TryFrom<i32> for DeviceGain {
    type Error = DecodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(raw) => Ok(Self(raw)),
            Err(_) => Err(DecodeError::InvalidField {
                field: "gain",
                value: i64::from(value),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectOperation {
    Start,
    Solo,
    Stop,
}

impl TryFrom<u8> for EffectOperation {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            EFF_START => Ok(EffectOperation::Start),
            EFF_SOLO => Ok(EffectOperation::Solo),
            EFF_STOP => Ok(EffectOperation::Stop),
            other => Err(DecodeError::InvalidField {
                field: "effect_op",
                value: i64::from(other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceControl {
    EnableActuators,
    DisableActuators,
    StopAll,
    Reset,
    Pause,
    Continue,
}

impl TryFrom<u8> for DeviceControl {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            CTRL_ENACT => Ok(DeviceControl::EnableActuators),
            CTRL_DISACT => Ok(DeviceControl::DisableActuators),
            CTRL_STOPALL => Ok(DeviceControl::StopAll),
            CTRL_DEVRST => Ok(DeviceControl::Reset),
            CTRL_DEVPAUSE => Ok(DeviceControl::Pause),
            CTRL_DEVCONT => Ok(DeviceControl::Continue),
            other => Err(DecodeError::InvalidField {
                field: "device_control",
                value: i64::from(other),
            }),
        }
    }
}

/// One decoded report. Exactly one variant per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FfbReport {
    Effect { ebi: u8, params: EffectParams },
    Periodic { ebi: u8, periodic: PeriodicParams },
    Constant { ebi: u8, magnitude: i16 },
    Ramp { ebi: u8, ramp: RampParams },
    Operation {
        ebi: u8,
        op: EffectOperation,
        loop_count: u8,
    },
    BlockFree { ebi: u8 },
    DeviceControl(DeviceControl),
    Gain(DeviceGain),
    NewEffect(EffectType),
}

impl FfbReport {
    /// Effect block index, for reports that address one effect.
    pub fn ebi(&self) -> Option<u8> {
        match *self {
            FfbReport::Effect { ebi, .. }
            | FfbReport::Periodic { ebi, .. }
            | FfbReport::Constant { ebi, .. }
            | FfbReport::Ramp { ebi, .. }
            | FfbReport::Operation { ebi, .. }
            | FfbReport::BlockFree { ebi } => Some(ebi),
            FfbReport::DeviceControl(_) | FfbReport::Gain(_) | FfbReport::NewEffect(_) => None,
        }
    }
}

/// A decoded packet with its addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPacket {
    pub device_id: u8,
    pub report_type: u8,
    pub report: FfbReport,
}

/// Split a raw driver packet into `(cmd, data)`, rejecting commands that
/// do not carry a report.
fn split_header(packet: &[u8]) -> DecodeResult<(u32, &[u8])> {
    let bad = |declared| DecodeError::BadHeader {
        declared,
        received: packet.len(),
    };
    let mut header = ReportReader::new(packet);
    let size = header.read_u32_le().ok().ok_or(bad(0))?;
    let cmd = header.read_u32_le().ok().ok_or(bad(size))?;
    if cmd != CMD_WRITE_REPORT && cmd != CMD_SET_FEATURE {
        return Err(DecodeError::UnknownCommand(cmd));
    }
    let data_len = usize::try_from(size)
        .ok()
        .and_then(|end| end.checked_sub(HEADER_LEN))
        .ok_or(bad(size))?;
    let data = header.rest().get(..data_len).ok_or(bad(size))?;
    Ok((cmd, data))
}

/// Decode one packet delivered by the driver callback.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownCommand`] when the header command is not a
/// report write or feature set, [`DecodeError::UnknownReportType`] for
/// report types this engine does not act on, and another [`DecodeError`]
/// when a recognized report cannot be fully read.
///
/// # Examples
///
/// ```
/// use vrwheel_ffb::{FfbReport, decode_packet};
///
/// // size = 11, cmd = write report, constant force on EBI 1, magnitude 5000
/// let packet = [11, 0, 0, 0, 0x0F, 0, 0x0B, 0, 0x15, 1, 0x88, 0x13];
/// let packet = &packet[..11];
/// assert!(decode_packet(packet).is_err());
///
/// let packet = [12, 0, 0, 0, 0x0F, 0, 0x0B, 0, 0x15, 1, 0x88, 0x13];
/// let decoded = decode_packet(&packet).map(|p| p.report);
/// assert_eq!(decoded, Ok(FfbReport::Constant { ebi: 1, magnitude: 5000 }));
/// ```
pub fn decode_packet(packet: &[u8]) -> DecodeResult<DecodedPacket> {
    let (cmd, data) = split_header(packet)?;
    let mut r = ReportReader::new(data);
    let first = r.read_u8()?;
    let device_id = (first & 0xF0) >> 4;
    let mut report_type = first & 0x0F;
    if cmd == CMD_SET_FEATURE {
        report_type = report_type.saturating_add(FEATURE_TYPE_OFFSET);
    }

    let report = match report_type {
        PT_EFFREP => {
            let ebi = r.read_u8()?;
            FfbReport::Effect {
                ebi,
                params: read_effect_params(&mut r)?,
            }
        }
        PT_PRIDREP => {
            let ebi = r.read_u8()?;
            let periodic = PeriodicParams {
                magnitude: r.read_u16_le()?,
                offset: r.read_i16_le()?,
                phase: r.read_u16_le()?,
                period_ms: r.read_u16_le()?,
            };
            FfbReport::Periodic { ebi, periodic }
        }
        PT_CONSTREP => {
            let ebi = r.read_u8()?;
            let magnitude = r.read_i16_le()?;
            FfbReport::Constant { ebi, magnitude }
        }
        PT_RAMPREP => {
            let ebi = r.read_u8()?;
            let ramp = RampParams {
                start: r.read_i16_le()?,
                end: r.read_i16_le()?,
            };
            FfbReport::Ramp { ebi, ramp }
        }
        PT_EFOPREP => {
            let ebi = r.read_u8()?;
            let op = EffectOperation::try_from(r.read_u8()?)?;
            let loop_count = r.read_u8()?;
            FfbReport::Operation {
                ebi,
                op,
                loop_count,
            }
        }
        PT_BLKFRREP => FfbReport::BlockFree { ebi: r.read_u8()? },
        PT_CTRLREP => FfbReport::DeviceControl(DeviceControl::try_from(r.read_u8()?)?),
        PT_GAINREP => FfbReport::Gain(DeviceGain::from(r.read_u8()?)),
        PT_NEWEFREP => FfbReport::NewEffect(EffectType::try_from(r.read_u8()?)?),
        other => return Err(DecodeError::UnknownReportType(other)),
    };

    Ok(DecodedPacket {
        device_id,
        report_type,
        report,
    })
}

fn read_effect_params(r: &mut ReportReader<'_>) -> DecodeResult<EffectParams> {
    let effect_type = EffectType::try_from(r.read_u8()?)?;
    let duration_ms = r.read_u16_le()?;
    let trigger_repeat_ms = r.read_u16_le()?;
    let sample_period_ms = r.read_u16_le()?;
    let gain = r.read_u8()?;
    let trigger_button = r.read_u8()?;
    let polar = r.read_u8()? & 0x04 != 0;
    let dir_x = r.read_u8()?;
    // Older drivers omit the y component.
    let dir_y = r.read_i8().unwrap_or(0);
    let direction = if polar {
        EffectDirection::Polar(dir_x)
    } else {
        EffectDirection::Cartesian {
            x: i8::from_le_bytes([dir_x]),
            y: dir_y,
        }
    };
    Ok(EffectParams {
        effect_type,
        duration_ms,
        trigger_repeat_ms,
        sample_period_ms,
        gain,
        trigger_button,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrwheel_test_helpers::FfbPacket;

    #[test]
    fn test_decode_gain() -> Result<(), Box<dyn std::error::Error>> {
        let decoded = decode_packet(&FfbPacket::gain(200))?;
        assert_eq!(decoded.device_id, 1);
        assert_eq!(decoded.report_type, PT_GAINREP);
        assert_eq!(decoded.report, FfbReport::Gain(DeviceGain::from(200)));
        Ok(())
    }

    #[test]
    fn test_decode_effect_op() -> Result<(), Box<dyn std::error::Error>> {
        let decoded = decode_packet(&FfbPacket::effect_op(3, EFF_SOLO, 2))?;
        assert_eq!(
            decoded.report,
            FfbReport::Operation {
                ebi: 3,
                op: EffectOperation::Solo,
                loop_count: 2
            }
        );
        assert_eq!(decoded.report.ebi(), Some(3));
        Ok(())
    }

    #[test]
    fn test_decode_effect_report_fields() -> Result<(), Box<dyn std::error::Error>> {
        let decoded = decode_packet(&FfbPacket::effect_report(2, 4, 750, 128))?;
        let FfbReport::Effect { ebi, params } = decoded.report else {
            return Err("expected effect report".into());
        };
        assert_eq!(ebi, 2);
        assert_eq!(params.effect_type, EffectType::Sine);
        assert_eq!(params.duration_ms, 750);
        assert_eq!(params.gain, 128);
        assert_eq!(params.direction, EffectDirection::Polar(0));
        Ok(())
    }

    #[test]
    fn test_decode_negative_constant() -> Result<(), Box<dyn std::error::Error>> {
        let decoded = decode_packet(&FfbPacket::constant(1, -5000))?;
        assert_eq!(
            decoded.report,
            FfbReport::Constant {
                ebi: 1,
                magnitude: -5000
            }
        );
        Ok(())
    }

    #[test]
    fn test_decode_ramp_and_periodic() -> Result<(), Box<dyn std::error::Error>> {
        let ramp = decode_packet(&FfbPacket::ramp(4, -100, 300))?;
        assert_eq!(
            ramp.report,
            FfbReport::Ramp {
                ebi: 4,
                ramp: RampParams {
                    start: -100,
                    end: 300
                }
            }
        );
        let periodic = decode_packet(&FfbPacket::periodic(5, 8000, -20, 9000, 50))?;
        assert_eq!(
            periodic.report,
            FfbReport::Periodic {
                ebi: 5,
                periodic: PeriodicParams {
                    magnitude: 8000,
                    offset: -20,
                    phase: 9000,
                    period_ms: 50
                }
            }
        );
        Ok(())
    }

    #[test]
    fn test_feature_report_type_is_offset() -> Result<(), Box<dyn std::error::Error>> {
        let decoded = decode_packet(&FfbPacket::new_effect(1))?;
        assert_eq!(decoded.report_type, PT_NEWEFREP);
        assert_eq!(decoded.report, FfbReport::NewEffect(EffectType::Constant));
        Ok(())
    }

    #[test]
    fn test_unknown_type_is_unhandled() {
        let err = decode_packet(&FfbPacket::other(PT_CONDREP, &[1, 0, 0, 0]));
        assert_eq!(err, Err(DecodeError::UnknownReportType(PT_CONDREP)));
    }

    #[test]
    fn test_truncated_constant_is_malformed() {
        let mut pkt = FfbPacket::constant(1, 5000);
        pkt.truncate(pkt.len() - 1);
        pkt[0] -= 1;
        let err = decode_packet(&pkt);
        assert!(matches!(err, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_declared_size_beyond_buffer() {
        let mut pkt = FfbPacket::gain(10);
        pkt[0] = 40;
        assert!(matches!(
            decode_packet(&pkt),
            Err(DecodeError::BadHeader { declared: 40, .. })
        ));
    }

    #[test]
    fn test_foreign_command_is_rejected_before_payload() {
        // A valid constant-force body behind a get-feature style command.
        let pkt = FfbPacket::raw(0x000B_0192, &[0x15, 1, 0x88, 0x13]);
        assert_eq!(decode_packet(&pkt), Err(DecodeError::UnknownCommand(0x000B_0192)));
        // Even an unreadable body is not looked at.
        let pkt = FfbPacket::raw(0x0022_0003, &[]);
        assert_eq!(decode_packet(&pkt), Err(DecodeError::UnknownCommand(0x0022_0003)));
    }

    #[test]
    fn test_short_header() {
        assert!(matches!(
            decode_packet(&[1, 2, 3]),
            Err(DecodeError::BadHeader { .. })
        ));
    }

    #[test]
    fn test_invalid_device_control() {
        assert!(matches!(
            decode_packet(&FfbPacket::device_control(9)),
            Err(DecodeError::InvalidField {
                field: "device_control",
                value: 9
            })
        ));
    }

    #[test]
    fn test_gain_try_from_bounds() {
        assert!(DeviceGain::try_from(0).is_ok());
        assert!(DeviceGain::try_from(255).is_ok());
        assert!(DeviceGain::try_from(300).is_err());
    }
}
