use std::collections::HashMap;

/// Largest code width GIF allows.
const MAX_CODE_BITS: u8 = 12;
/// Dictionary capacity implied by [`MAX_CODE_BITS`].
const MAX_CODES: u16 = 1 << MAX_CODE_BITS;

/// LSB-first bit packer.
#[derive(Debug, Default)]
struct BitWriter {
    acc: u32,
    pending: u8,
}

impl BitWriter {
    fn write(&mut self, out: &mut Vec<u8>, code: u16, width: u8) {
        self.acc |= u32::from(code) << self.pending;
        self.pending += width;
        while self.pending >= 8 {
            out.push(self.acc as u8);
            self.acc >>= 8;
            self.pending -= 8;
        }
    }

    fn flush(&mut self, out: &mut Vec<u8>) {
        if self.pending > 0 {
            out.push(self.acc as u8);
        }
        *self = Self::default();
    }
}

/// Variable-width GIF LZW coder. The dictionary is kept between calls to avoid reallocating it.
#[derive(Debug, Default)]
pub(crate) struct LzwEncoder {
    table: HashMap<(u16, u8), u16>,
}

impl LzwEncoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn retained_bytes(&self) -> usize {
        self.table.capacity() * std::mem::size_of::<((u16, u8), u16)>()
    }

    /// Append the LZW code stream for `indices` to `out` (no sub-block framing).
    ///
    /// Every index must be below `1 << min_code_size`; `min_code_size` is in `2..=8`.
    pub(crate) fn encode(&mut self, indices: &[u8], min_code_size: u8, out: &mut Vec<u8>) {
        let clear = 1u16 << min_code_size;
        let eoi = clear + 1;
        let mut next = clear + 2;
        let mut width = min_code_size + 1;
        let mut bits = BitWriter::default();

        self.table.clear();
        bits.write(out, clear, width);

        let Some((&head, rest)) = indices.split_first() else {
            bits.write(out, eoi, width);
            bits.flush(out);
            return;
        };

        let mut prefix = u16::from(head);
        for &byte in rest {
            if let Some(&code) = self.table.get(&(prefix, byte)) {
                prefix = code;
                continue;
            }

            bits.write(out, prefix, width);
            self.table.insert((prefix, byte), next);
            next += 1;
            if next > (1 << width) && width < MAX_CODE_BITS {
                width += 1;
            }
            if next == MAX_CODES {
                bits.write(out, clear, width);
                self.table.clear();
                next = clear + 2;
                width = min_code_size + 1;
            }
            prefix = u16::from(byte);
        }

        bits.write(out, prefix, width);
        // The decoder adds an entry for the final code before reading end-of-information.
        if next == (1 << width) && width < MAX_CODE_BITS {
            width += 1;
        }
        bits.write(out, eoi, width);
        bits.flush(out);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/lzw.rs"]
mod tests;
