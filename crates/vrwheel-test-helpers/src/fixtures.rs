//! Test fixture builders.
//!
//! [`FfbPacket`] encodes feedback packets byte-for-byte the way the virtual
//! joystick driver delivers them, independent of the decoder under test.

/// Driver command code for output reports.
pub const CMD_WRITE_REPORT: u32 = 0x000B_000F;
/// Driver command code for feature reports.
pub const CMD_SET_FEATURE: u32 = 0x000B_0191;

const DEVICE_NIBBLE: u8 = 0x10;

/// Builder for raw feedback packets addressed to device 1.
pub struct FfbPacket;

impl FfbPacket {
    /// Wrap `data` in the `[size][cmd]` header.
    pub fn raw(cmd: u32, data: &[u8]) -> Vec<u8> {
        let size = u32::try_from(data.len() + 8).unwrap_or(u32::MAX);
        let mut out = Vec::with_capacity(data.len() + 8);
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&cmd.to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    fn report(ty: u8, body: &[u8]) -> Vec<u8> {
        let mut data = vec![DEVICE_NIBBLE | (ty & 0x0F)];
        data.extend_from_slice(body);
        Self::raw(CMD_WRITE_REPORT, &data)
    }

    /// Effect parameter report (type 0x01).
    pub fn effect_report(ebi: u8, effect_type: u8, duration_ms: u16, gain: u8) -> Vec<u8> {
        let d = duration_ms.to_le_bytes();
        Self::report(
            0x01,
            &[
                ebi,
                effect_type,
                d[0],
                d[1],
                0,
                0,
                0,
                0,
                gain,
                0xFF,
                0x04,
                0x00,
                0x00,
            ],
        )
    }

    /// Periodic parameters (type 0x04).
    pub fn periodic(ebi: u8, magnitude: u16, offset: i16, phase: u16, period_ms: u16) -> Vec<u8> {
        let mut body = vec![ebi];
        body.extend_from_slice(&magnitude.to_le_bytes());
        body.extend_from_slice(&offset.to_le_bytes());
        body.extend_from_slice(&phase.to_le_bytes());
        body.extend_from_slice(&period_ms.to_le_bytes());
        Self::report(0x04, &body)
    }

    /// Constant force magnitude (type 0x05).
    pub fn constant(ebi: u8, magnitude: i16) -> Vec<u8> {
        let m = magnitude.to_le_bytes();
        Self::report(0x05, &[ebi, m[0], m[1]])
    }

    /// Ramp start/end (type 0x06).
    pub fn ramp(ebi: u8, start: i16, end: i16) -> Vec<u8> {
        let mut body = vec![ebi];
        body.extend_from_slice(&start.to_le_bytes());
        body.extend_from_slice(&end.to_le_bytes());
        Self::report(0x06, &body)
    }

    /// Effect operation (type 0x0A): 1 start, 2 solo, 3 stop.
    pub fn effect_op(ebi: u8, op: u8, loop_count: u8) -> Vec<u8> {
        Self::report(0x0A, &[ebi, op, loop_count])
    }

    /// Block free (type 0x0B).
    pub fn block_free(ebi: u8) -> Vec<u8> {
        Self::report(0x0B, &[ebi])
    }

    /// Device control (type 0x0C).
    pub fn device_control(control: u8) -> Vec<u8> {
        Self::report(0x0C, &[control])
    }

    /// Device gain (type 0x0D).
    pub fn gain(gain: u8) -> Vec<u8> {
        Self::report(0x0D, &[gain])
    }

    /// Create-new-effect feature report (type 0x01 + 0x10).
    pub fn new_effect(effect_type: u8) -> Vec<u8> {
        Self::raw(CMD_SET_FEATURE, &[DEVICE_NIBBLE | 0x01, effect_type])
    }

    /// Arbitrary report type with an opaque body.
    pub fn other(ty: u8, body: &[u8]) -> Vec<u8> {
        Self::report(ty, body)
    }
}

/// A point on a wheel ring of `radius` around `center`, at `angle_deg`
/// measured counter-clockwise from the +x axis, with the ring tilted by
/// `pitch_deg` about x.
pub fn ring_point(center: [f64; 3], radius: f64, angle_deg: f64, pitch_deg: f64) -> [f64; 3] {
    let (sa, ca) = angle_deg.to_radians().sin_cos();
    let (sp, cp) = pitch_deg.to_radians().sin_cos();
    let (lx, ly) = (radius * ca, radius * sa);
    let [cx, cy, cz] = center;
    [cx + lx, cy + ly * cp, cz + ly * sp]
}
