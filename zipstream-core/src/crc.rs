//! CRC-32 (ISO 3309) as used by ZIP.
//!
//! Two layers live here:
//!
//! - [`Crc32`], a stateful calculator using the "slicing-by-8" technique for
//!   data ≥16 bytes and a single-table lookup below that.
//! - [`RollingChecksum`], the narrow capability the stream pump consumes:
//!   `update(previous, chunk) -> accumulator`. Any conformant 32-bit CRC can be
//!   plugged in; [`Crc32Rolling`] is the default.
//!
//! ## Note on Hardware Acceleration
//!
//! The x86_64 SSE4.2 CRC32 instruction uses the Castagnoli polynomial (0x1EDC6F41),
//! which is different from the ISO 3309 polynomial (0xEDB88320) used by ZIP.
//! Therefore, we use an optimized software implementation for maximum compatibility.

/// CRC-32 slicing-by-8 lookup tables (polynomial 0xEDB88320, reflected).
/// Table 0 is the classic byte-at-a-time table.
const CRC32_TABLE_SLICE: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];

    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }

    tables
};

/// CRC-32 calculator (ISO 3309).
///
/// - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
/// - Initial value: 0xFFFFFFFF
/// - Final XOR: 0xFFFFFFFF
/// - Reflected input/output: Yes
///
/// # Example
///
/// ```
/// use zipstream_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFFFFFF }
    }

    /// Continue from a previously finalized CRC value.
    ///
    /// `Crc32::resume(Crc32::compute(a))` fed with `b` finalizes to the CRC of `a ++ b`.
    pub fn resume(previous: u32) -> Self {
        Self {
            crc: previous ^ 0xFFFFFFFF,
        }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.crc = 0xFFFFFFFF;
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        if data.len() >= 16 {
            crc32_slice8(&mut self.crc, data);
        } else {
            crc32_sw(&mut self.crc, data);
        }
    }

    /// Get the current CRC value (without finalizing).
    #[inline(always)]
    pub fn value(&self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Finalize and return the CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn crc32_sw(crc: &mut u32, data: &[u8]) {
    for &byte in data {
        let index = ((*crc ^ byte as u32) & 0xFF) as usize;
        *crc = CRC32_TABLE_SLICE[0][index] ^ (*crc >> 8);
    }
}

#[inline]
fn crc32_slice8(crc: &mut u32, data: &[u8]) {
    let mut c = *crc;
    let mut chunks = data.chunks_exact(8);

    for bytes in &mut chunks {
        let crc_xor = c ^ u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let b0 = (crc_xor & 0xFF) as usize;
        let b1 = ((crc_xor >> 8) & 0xFF) as usize;
        let b2 = ((crc_xor >> 16) & 0xFF) as usize;
        let b3 = ((crc_xor >> 24) & 0xFF) as usize;

        c = CRC32_TABLE_SLICE[7][b0]
            ^ CRC32_TABLE_SLICE[6][b1]
            ^ CRC32_TABLE_SLICE[5][b2]
            ^ CRC32_TABLE_SLICE[4][b3]
            ^ CRC32_TABLE_SLICE[3][bytes[4] as usize]
            ^ CRC32_TABLE_SLICE[2][bytes[5] as usize]
            ^ CRC32_TABLE_SLICE[1][bytes[6] as usize]
            ^ CRC32_TABLE_SLICE[0][bytes[7] as usize];
    }

    crc32_sw(&mut c, chunks.remainder());
    *crc = c;
}

/// An incremental 32-bit checksum over successive byte chunks.
///
/// `previous` is `None` before the first chunk and the value returned by the
/// last call afterwards. Implementations must be pure: the same inputs always
/// give the same accumulator.
pub trait RollingChecksum {
    /// Fold `chunk` into the accumulator.
    fn update(&self, previous: Option<u32>, chunk: &[u8]) -> u32;
}

/// The ZIP CRC-32 as a [`RollingChecksum`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32Rolling;

impl RollingChecksum for Crc32Rolling {
    #[inline]
    fn update(&self, previous: Option<u32>, chunk: &[u8]) -> u32 {
        let mut crc = previous.map(Crc32::resume).unwrap_or_default();
        crc.update(chunk);
        crc.finalize()
    }
}

impl<F> RollingChecksum for F
where
    F: Fn(Option<u32>, &[u8]) -> u32,
{
    fn update(&self, previous: Option<u32>, chunk: &[u8]) -> u32 {
        self(previous, chunk)
    }
}
