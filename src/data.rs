use std::fmt::Debug;

/// Width used for row counts. Counts travel in the same
/// width on every worker, so this is fixed rather than `usize`.
pub type DataSize = i32;

/// Gain of a candidate that holds no split. Finite, so it
/// survives being written to a buffer and compared on another worker.
pub const MIN_SCORE: f64 = -1.0e300;

/// Feature index of a candidate that holds no split.
pub const UNSET_FEATURE: i32 = -1;

/// Scalar types that can be copied in and out of a byte buffer
/// in host-native layout.
pub trait NativeBytes: Copy + Debug {
    /// Number of bytes this value occupies in a buffer.
    const WIDTH: usize;
    /// Write the value into the start of `buf`.
    /// `buf` must hold at least `WIDTH` bytes.
    fn put(self, buf: &mut [u8]);
    /// Read a value from the start of `buf`.
    /// `buf` must hold at least `WIDTH` bytes.
    fn take(buf: &[u8]) -> Self;
}

macro_rules! impl_native_bytes {
    ($($t:ty),*) => {
        $(
            impl NativeBytes for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();
                fn put(self, buf: &mut [u8]) {
                    buf[..Self::WIDTH].copy_from_slice(&self.to_ne_bytes());
                }
                fn take(buf: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$t>()];
                    bytes.copy_from_slice(&buf[..Self::WIDTH]);
                    <$t>::from_ne_bytes(bytes)
                }
            }
        )*
    };
}

impl_native_bytes!(i32, u32, f64);

impl NativeBytes for bool {
    const WIDTH: usize = 1;
    fn put(self, buf: &mut [u8]) {
        buf[0] = u8::from(self);
    }
    fn take(buf: &[u8]) -> Self {
        buf[0] != 0
    }
}
