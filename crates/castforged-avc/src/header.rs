//! H.264 Sequence Parameter Set (SPS) header fields

use serde::Serialize;

use crate::bits::{remove_emulation_prevention, BitReader};
use crate::level::Level;

/// Profiles whose SPS carries the chroma/bit-depth/scaling block.
const HIGH_PROFILES: &[u8] = &[100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139, 134, 135];

/// Fields read from the start of an SPS.
///
/// A header that could not be parsed far enough has `level` and
/// `reference_frame_count` set to `None`; the evaluator treats that as
/// "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvcHeader {
    /// `profile_idc` (66 Baseline, 77 Main, 100 High, ...)
    pub profile: Option<u8>,
    /// `constraint_set0..5` flags and reserved bits
    pub constraint_flags: Option<u8>,
    /// Raw `level_idc`
    pub level: Option<u8>,
    /// `max_num_ref_frames`
    pub reference_frame_count: Option<u32>,
}

/// Strip the start code and NAL header byte from an extracted header.
///
/// Skips 4 bytes when the third byte is `0x01` (3-byte start code) and 5
/// otherwise. Inputs shorter than the skip yield an empty slice.
pub fn clean_header(header: &[u8]) -> &[u8] {
    let skip = if header.get(2) == Some(&0x01) { 4 } else { 5 };
    header.get(skip..).unwrap_or_default()
}

impl AvcHeader {
    /// Parse a cleaned header (starting at `profile_idc`).
    ///
    /// Never fails: truncated or malformed input gives an undetermined
    /// header with every field `None`.
    pub fn parse(data: &[u8]) -> Self {
        if data.len() < 3 {
            return Self::default();
        }

        let rbsp = remove_emulation_prevention(data);
        let mut reader = BitReader::new(&rbsp);

        match parse_sps(&mut reader) {
            Some(header) => header,
            None => {
                tracing::trace!(len = data.len(), "truncated SPS");
                Self::default()
            }
        }
    }

    /// Parse a header slice as returned by [`extract_header`](crate::annexb::extract_header).
    pub fn from_annexb(header: &[u8]) -> Self {
        Self::parse(clean_header(header))
    }

    /// Level as a typed value.
    ///
    /// `level_idc` 11 with `constraint_set3` on Baseline, Main or Extended
    /// means level 1b.
    pub fn level(&self) -> Option<Level> {
        let idc = self.level?;
        let constraint_set3 = self.constraint_flags.is_some_and(|f| f & 0x10 != 0);
        if idc == 11 && constraint_set3 && matches!(self.profile, Some(66 | 77 | 88)) {
            return Some(Level::Level1b);
        }
        Level::from_idc(idc)
    }

    /// Both the level and the reference frame count are known.
    pub fn is_complete(&self) -> bool {
        self.level.is_some() && self.reference_frame_count.is_some()
    }
}

fn parse_sps(reader: &mut BitReader) -> Option<AvcHeader> {
    let profile = reader.read_bits(8)? as u8;
    let constraint_flags = reader.read_bits(8)? as u8;
    let level = reader.read_bits(8)? as u8;

    // seq_parameter_set_id
    reader.read_ue()?;

    if HIGH_PROFILES.contains(&profile) {
        let chroma_format_idc = reader.read_ue()?;
        if chroma_format_idc == 3 {
            // separate_colour_plane_flag
            reader.read_bits(1)?;
        }
        // bit_depth_luma_minus8, bit_depth_chroma_minus8
        reader.read_ue()?;
        reader.read_ue()?;
        // qpprime_y_zero_transform_bypass_flag
        reader.read_bits(1)?;

        if reader.read_flag()? {
            let lists = if chroma_format_idc == 3 { 12 } else { 8 };
            for i in 0..lists {
                if reader.read_flag()? {
                    skip_scaling_list(reader, if i < 6 { 16 } else { 64 })?;
                }
            }
        }
    }

    // log2_max_frame_num_minus4
    reader.read_ue()?;

    match reader.read_ue()? {
        0 => {
            // log2_max_pic_order_cnt_lsb_minus4
            reader.read_ue()?;
        }
        1 => {
            // delta_pic_order_always_zero_flag
            reader.read_bits(1)?;
            // offset_for_non_ref_pic, offset_for_top_to_bottom_field
            reader.read_se()?;
            reader.read_se()?;
            let cycle = reader.read_ue()?;
            for _ in 0..cycle {
                reader.read_se()?;
            }
        }
        _ => {}
    }

    let reference_frame_count = reader.read_ue()?;

    Some(AvcHeader {
        profile: Some(profile),
        constraint_flags: Some(constraint_flags),
        level: Some(level),
        reference_frame_count: Some(reference_frame_count),
    })
}

fn skip_scaling_list(reader: &mut BitReader, size: usize) -> Option<()> {
    let mut last_scale: i32 = 8;
    let mut next_scale: i32 = 8;

    for _ in 0..size {
        if next_scale != 0 {
            let delta = reader.read_se()?;
            next_scale = (last_scale + delta).rem_euclid(256);
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }

    Some(())
}
