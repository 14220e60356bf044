//! Bit-level reading over an RBSP payload

/// Remove emulation prevention bytes (`00 00 03` becomes `00 00`).
pub fn remove_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if i + 2 < data.len() && data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 3 {
            result.push(0);
            result.push(0);
            i += 3;
        } else {
            result.push(data[i]);
            i += 1;
        }
    }

    result
}

/// MSB-first bit reader. Every read returns `None` once the data runs out.
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Read n bits (up to 32)
    pub(crate) fn read_bits(&mut self, n: u8) -> Option<u32> {
        let mut result = 0u32;

        for _ in 0..n {
            if self.byte_pos >= self.data.len() {
                return None;
            }

            let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;
            result = (result << 1) | (bit as u32);

            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
        }

        Some(result)
    }

    pub(crate) fn read_flag(&mut self) -> Option<bool> {
        self.read_bits(1).map(|b| b == 1)
    }

    /// Read unsigned Exp-Golomb coded value
    pub(crate) fn read_ue(&mut self) -> Option<u32> {
        let mut leading_zeros = 0u8;
        loop {
            let bit = self.read_bits(1)?;
            if bit == 1 {
                break;
            }
            leading_zeros += 1;
            if leading_zeros > 31 {
                return None;
            }
        }

        if leading_zeros == 0 {
            return Some(0);
        }

        let suffix = self.read_bits(leading_zeros)?;
        Some((1 << leading_zeros) - 1 + suffix)
    }

    /// Read signed Exp-Golomb coded value
    pub(crate) fn read_se(&mut self) -> Option<i32> {
        let k = i64::from(self.read_ue()?);
        let value = if k % 2 == 1 { (k + 1) / 2 } else { -(k / 2) };
        i32::try_from(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_emulation_prevention() {
        let input = vec![0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x03, 0x02];
        let output = remove_emulation_prevention(&input);
        assert_eq!(output, vec![0x00, 0x00, 0x01, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn test_read_bits() {
        let data = [0b10110100, 0b01010101];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(4), Some(0b1011));
        assert_eq!(reader.read_bits(8), Some(0b0100_0101));
        assert_eq!(reader.read_bits(4), Some(0b0101));
        assert_eq!(reader.read_bits(1), None);
    }

    #[test]
    fn test_read_ue() {
        // 1 | 010 | 011 | 00100 | 00101
        let data = [0b1010_0110, 0b0100_0010, 0b1000_0000];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_ue(), Some(0));
        assert_eq!(reader.read_ue(), Some(1));
        assert_eq!(reader.read_ue(), Some(2));
        assert_eq!(reader.read_ue(), Some(3));
        assert_eq!(reader.read_ue(), Some(4));
    }

    #[test]
    fn test_read_se() {
        // codeNums 1, 2, 3, 4 map to 1, -1, 2, -2
        let data = [0b0100_1100, 0b1000_0101];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_se(), Some(1));
        assert_eq!(reader.read_se(), Some(-1));
        assert_eq!(reader.read_se(), Some(2));
        assert_eq!(reader.read_se(), Some(-2));
    }

    #[test]
    fn test_read_ue_runs_out() {
        let mut reader = BitReader::new(&[0x00]);
        assert_eq!(reader.read_ue(), None);
    }
}
