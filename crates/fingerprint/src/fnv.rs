//! FNV-1a 64-bit hasher with typed, little-endian field mixing

/// FNV-1a 64-bit offset basis
const OFFSET_BASIS: u64 = 0xcbf29ce484222325;

/// FNV-1a 64-bit prime
const PRIME: u64 = 0x100000001b3;

/// Incremental FNV-1a 64-bit hasher
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a64 {
    hash: u64,
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self { hash: OFFSET_BASIS }
    }
}

impl Fnv1a64 {
    /// Hasher seeded with the offset basis
    pub fn new() -> Self {
        Self::default()
    }

    /// Current digest; the hasher can keep absorbing afterwards
    pub fn finish(&self) -> u64 {
        self.hash
    }

    /// Absorb raw bytes
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash ^= b as u64;
            self.hash = self.hash.wrapping_mul(PRIME);
        }
    }

    // Integers are mixed as little-endian bytes

    pub fn write_u64(&mut self, n: u64) {
        self.write(&n.to_le_bytes());
    }

    pub fn write_i64(&mut self, n: i64) {
        self.write(&n.to_le_bytes());
    }

    pub fn write_u32(&mut self, n: u32) {
        self.write(&n.to_le_bytes());
    }

    pub fn write_i32(&mut self, n: i32) {
        self.write(&n.to_le_bytes());
    }

    /// One byte, 1 or 0
    pub fn write_bool(&mut self, v: bool) {
        self.write(&[u8::from(v)]);
    }

    /// Bit pattern of an `f32`
    pub fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    /// Bit pattern of an `f64`
    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    /// Length-prefixed so ("ab","c") and ("a","bc") differ
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write(s.as_bytes());
    }
}

/// Render a digest as exactly 16 lowercase hex digits
pub fn to_hex(v: u64) -> String {
    format!("{v:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_offset_basis() {
        assert_eq!(Fnv1a64::new().finish(), 0xcbf29ce484222325);
    }

    #[test]
    fn test_known_vector() {
        // FNV-1a 64 of "a"
        let mut h = Fnv1a64::new();
        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_length_prefix_separates_strings() {
        let mut a = Fnv1a64::new();
        a.write_str("ab");
        a.write_str("c");
        let mut b = Fnv1a64::new();
        b.write_str("a");
        b.write_str("bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_to_hex_is_zero_padded() {
        assert_eq!(to_hex(0), "0000000000000000");
        assert_eq!(to_hex(0xabc), "0000000000000abc");
        assert_eq!(to_hex(u64::MAX), "ffffffffffffffff");
    }
}
