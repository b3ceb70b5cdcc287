use crate::frame::Opcode;

/// Upper bound on the encoded size of a frame head: 2 fixed bytes, an 8 byte extended length
/// and a 4 byte masking key.
pub const MAX_HEAD_LEN: usize = 14;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameHead {
    pub fin: bool,
    pub rsv1: bool,
    pub opcode: Opcode,
    pub mask: Option<[u8; 4]>,
    pub payload_len: u64,
}

/// Number of extended payload length bytes following the 7 bit length field.
pub fn extended_len_bytes(payload_len: u64) -> usize {
    match payload_len {
        0..=125 => 0,
        126..=0xFFFF => 2,
        _ => 8,
    }
}

impl FrameHead {
    // Length of the encoded frame head in bytes ([2..14]).
    pub fn len_bytes(&self) -> usize {
        2 + extended_len_bytes(self.payload_len) + self.masked() as usize * 4
    }
    pub fn masked(&self) -> bool {
        self.mask.is_some()
    }
    // Writes the frame head to the start of `buffer` and returns the number of bytes written.
    // Panics if `buffer` is shorter than [len_bytes()][`Self::len_bytes()`].
    pub fn encode(&self, buffer: &mut [u8]) -> usize {
        buffer[0] = self.fin as u8 * 0x80 | self.rsv1 as u8 * 0x40 | self.opcode.bits();
        let mut offset = 2;
        buffer[1] = match extended_len_bytes(self.payload_len) {
            0 => self.payload_len as u8,
            2 => {
                buffer[2..4].copy_from_slice(&(self.payload_len as u16).to_be_bytes());
                offset += 2;
                126
            }
            _ => {
                buffer[2..10].copy_from_slice(&self.payload_len.to_be_bytes());
                offset += 8;
                127
            }
        };
        if let Some(mask) = self.mask {
            buffer[1] |= 0x80;
            buffer[offset..offset + 4].copy_from_slice(&mask);
            offset += 4;
        }
        offset
    }
}
