use core::time::Duration;

/// Byte-level access to the serial link the sensor is attached to.
///
/// The engine consumes exactly two capabilities: transmitting a whole
/// frame and a single-shot, deadline-bounded read. Opening the port and
/// configuring it (9600 baud, byte oriented, no flow control) is the
/// caller's concern.
pub trait Transport {
    /// Error type of the underlying serial implementation.
    type Error: core::fmt::Debug;

    /// Transmits all of `bytes` over the link.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Captures at most `buf.len()` bytes into `buf`.
    ///
    /// Blocks until data becomes available, then performs exactly one
    /// read and returns the number of bytes it produced, even if fewer
    /// than requested arrived. Returns `Ok(0)` once `timeout` elapses
    /// with nothing available. Implementations must not loop to assemble
    /// a longer message across several arrivals; a truncated capture is
    /// surfaced by the engine's length validation instead.
    fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;
}
