/// Failure of a single request/response exchange with the sensor.
///
/// Every variant is a recoverable protocol condition. The engine makes one
/// attempt per call; whether to try again is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Write value outside the register's accepted range, or a request
    /// the frame codec refuses to build.
    InvalidArgument,
    /// No bytes became available within the response deadline.
    Timeout,
    /// The captured byte count differs from the length expected for the
    /// request that was sent.
    UnexpectedLength,
    /// CRC16 recomputed over the captured frame does not match its
    /// trailing checksum bytes.
    ChecksumMismatch,
    /// Checksum passed but address, function code or byte count are
    /// inconsistent with the request.
    MalformedResponse,
    /// The echoed write frame differs from the transmitted frame.
    EchoMismatch,
    /// The transport failed to transmit the request.
    WriteFailure,
    /// The transport failed while capturing the response.
    ReadFailure,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "value out of range for this register"),
            Self::Timeout => write!(f, "no response within the deadline"),
            Self::UnexpectedLength => write!(f, "response length differs from expected"),
            Self::ChecksumMismatch => write!(f, "response checksum mismatch"),
            Self::MalformedResponse => write!(f, "response fields inconsistent with request"),
            Self::EchoMismatch => write!(f, "write echo differs from sent frame"),
            Self::WriteFailure => write!(f, "transport write failed"),
            Self::ReadFailure => write!(f, "transport read failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
