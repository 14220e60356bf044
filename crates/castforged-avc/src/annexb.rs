//! Annex-B byte stream scanning.
//!
//! Locates the parameter-set header that precedes the first IDR slice of a
//! single demuxed frame. The matching is a bit-mask heuristic over NAL
//! header bytes, not a full NAL walk.

use crate::error::ScanError;

/// Byte offset just past the `01 <nal> <slice>` triple that opens the first
/// IDR slice.
///
/// The NAL byte must have `0x25` set (IDR type with a non-zero ref idc) and
/// the first slice byte must have `0x88` set.
pub fn find_keyframe(buf: &[u8]) -> Option<usize> {
    buf.windows(3)
        .position(|w| w[0] == 0x01 && w[1] & 0x25 == 0x25 && w[2] & 0x88 == 0x88)
        .map(|pos| pos + 3)
}

/// Start (first zero byte) of the latest `00 00 00 ?1 <sps>` sequence
/// ending at or before `keyframe_pos`.
///
/// The byte after the three zeros must have its low bit set and the NAL
/// byte must have `0x27` set, which matches an SPS header (`0x67`).
pub fn find_header_start(buf: &[u8], keyframe_pos: usize) -> Option<usize> {
    let end = keyframe_pos.min(buf.len());
    (5..=end).rev().find_map(|j| {
        let hit = buf[j - 5] == 0
            && buf[j - 4] == 0
            && buf[j - 3] == 0
            && buf[j - 2] & 0x01 == 0x01
            && buf[j - 1] & 0x27 == 0x27;
        hit.then_some(j - 5)
    })
}

/// Extract the header slice from an Annex-B frame.
///
/// The slice runs from the SPS start code up to the keyframe position, so
/// it still carries its start code and NAL header byte; pass it through
/// [`clean_header`](crate::header::clean_header) before parsing.
pub fn extract_header(buf: &[u8]) -> Result<&[u8], ScanError> {
    let keyframe_pos = find_keyframe(buf).ok_or(ScanError::NoKeyframe)?;
    let start = find_header_start(buf, keyframe_pos)
        .ok_or(ScanError::NoHeaderBoundary { keyframe_pos })?;

    tracing::trace!(start, keyframe_pos, "located AVC header");

    Ok(&buf[start..keyframe_pos])
}
