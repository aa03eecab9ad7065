use log::trace;

use crate::constants::MODBUS_ANY_ADDRESS;
use crate::crc::crc16;
use crate::error::Error;

// Every request is 8 bytes on the wire; a write response echoes all of
// them back.
pub const REQUEST_LEN: usize = 8;

// Shortest structurally complete read response: address, function code,
// byte count, one payload word, two checksum bytes.
const MIN_READ_RESPONSE_LEN: usize = 7;

/// Modbus function codes the sensor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Read holding registers (HR).
    ReadHoldingRegisters = 0x03,
    /// Read input registers (IR).
    ReadInputRegisters = 0x04,
    /// Preset single register (SR).
    WriteSingleRegister = 0x06,
}

impl From<FunctionCode> for u8 {
    fn from(function: FunctionCode) -> Self {
        function as u8
    }
}

/// Builds an 8-byte request frame.
///
/// `value` is the word count for the two read functions and the
/// register's new value for a write. A read of zero words is refused
/// with [`Error::InvalidArgument`].
pub fn build_request(
    function: FunctionCode,
    address: u16,
    value: u16,
) -> Result<[u8; REQUEST_LEN], Error> {
    if function != FunctionCode::WriteSingleRegister && value < 1 {
        return Err(Error::InvalidArgument);
    }

    let mut frame = [0u8; REQUEST_LEN];
    frame[0] = MODBUS_ANY_ADDRESS;
    frame[1] = function.into();
    frame[2..=3].copy_from_slice(&address.to_be_bytes());
    frame[4..=5].copy_from_slice(&value.to_be_bytes());
    let crc = crc16(&frame[..6]);
    frame[6] = (crc & 0x00FF) as u8;
    frame[7] = (crc >> 8) as u8;
    trace!("Request built: {:02X?}", frame);
    Ok(frame)
}

// Checks a captured read response against the exact length expected for
// the request that produced it, then its checksum and header fields.
pub(crate) fn validate_read_response(frame: &[u8], expected_len: usize) -> Result<(), Error> {
    if frame.len() != expected_len {
        trace!(
            "Unexpected response length {} (expected {})",
            frame.len(),
            expected_len
        );
        return Err(Error::UnexpectedLength);
    }
    if frame.len() < MIN_READ_RESPONSE_LEN {
        return Err(Error::UnexpectedLength);
    }

    let (body, checksum) = frame.split_at(frame.len() - 2);
    let crc = crc16(body);
    if checksum[0] != (crc & 0x00FF) as u8 || checksum[1] != (crc >> 8) as u8 {
        trace!("Checksum mismatch, computed {:04X} on {:02X?}", crc, frame);
        return Err(Error::ChecksumMismatch);
    }

    let read_function = frame[1] == FunctionCode::ReadHoldingRegisters as u8
        || frame[1] == FunctionCode::ReadInputRegisters as u8;
    if frame[0] != MODBUS_ANY_ADDRESS || !read_function || usize::from(frame[2]) != frame.len() - 5
    {
        trace!("Malformed response: {:02X?}", frame);
        return Err(Error::MalformedResponse);
    }

    trace!("Valid response: {:02X?}", frame);
    Ok(())
}

// A successful write is acknowledged by echoing the request verbatim.
pub(crate) fn validate_write_echo(
    sent: &[u8; REQUEST_LEN],
    received: &[u8],
) -> Result<(), Error> {
    if received.len() != REQUEST_LEN {
        trace!(
            "Unexpected echo length {} (expected {})",
            received.len(),
            REQUEST_LEN
        );
        return Err(Error::UnexpectedLength);
    }
    if received != &sent[..] {
        trace!("Echo mismatch: sent {:02X?}, received {:02X?}", sent, received);
        return Err(Error::EchoMismatch);
    }
    trace!("Write echo verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{IR_TEMPERATURE, HR_ABC_PERIOD};

    fn read_response(function: u8, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![MODBUS_ANY_ADDRESS, function, payload.len() as u8];
        frame.extend_from_slice(payload);
        let crc = crc16(&frame);
        frame.push((crc & 0x00FF) as u8);
        frame.push((crc >> 8) as u8);
        frame
    }

    #[test]
    fn temperature_read_request_bytes() {
        let frame = build_request(
            FunctionCode::ReadInputRegisters,
            IR_TEMPERATURE.address,
            0x0001,
        )
        .unwrap();
        assert_eq!(frame, [0xFE, 0x04, 0x00, 0x04, 0x00, 0x01, 0x64, 0x04]);
    }

    #[test]
    fn zero_word_read_is_refused() {
        assert_eq!(
            build_request(FunctionCode::ReadInputRegisters, IR_TEMPERATURE.address, 0),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            build_request(FunctionCode::ReadHoldingRegisters, HR_ABC_PERIOD.address, 0),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn zero_is_a_valid_write_value() {
        // Writing 0 disables the ABC function, so the codec must accept it.
        assert!(build_request(FunctionCode::WriteSingleRegister, HR_ABC_PERIOD.address, 0).is_ok());
    }

    #[test]
    fn documented_temperature_response_is_accepted() {
        let frame = [0xFE, 0x04, 0x02, 0x30, 0xD4, 0xB9, 0x7B];
        assert_eq!(validate_read_response(&frame, 7), Ok(()));
    }

    #[test]
    fn wrong_length_is_rejected_before_checksum() {
        // Structurally valid 7-byte frame, but a 9-byte response was
        // expected for the request that was sent.
        let frame = read_response(0x04, &[0x30, 0xD4]);
        assert_eq!(
            validate_read_response(&frame, 9),
            Err(Error::UnexpectedLength)
        );
    }

    #[test]
    fn flipped_payload_bit_is_rejected() {
        let mut frame = read_response(0x04, &[0x30, 0xD4]);
        frame[3] ^= 0x08;
        let expected = frame.len();
        assert_eq!(
            validate_read_response(&frame, expected),
            Err(Error::ChecksumMismatch)
        );
    }

    #[test]
    fn flipped_checksum_bit_is_rejected() {
        let mut frame = read_response(0x04, &[0x30, 0xD4]);
        frame[6] ^= 0x01;
        let expected = frame.len();
        assert_eq!(
            validate_read_response(&frame, expected),
            Err(Error::ChecksumMismatch)
        );
    }

    #[test]
    fn wrong_address_byte_is_rejected() {
        let mut frame = vec![0xFD, 0x04, 0x02, 0x30, 0xD4];
        let crc = crc16(&frame);
        frame.push((crc & 0x00FF) as u8);
        frame.push((crc >> 8) as u8);
        assert_eq!(
            validate_read_response(&frame, 7),
            Err(Error::MalformedResponse)
        );
    }

    #[test]
    fn write_function_code_in_read_response_is_rejected() {
        let frame = read_response(0x06, &[0x30, 0xD4]);
        assert_eq!(
            validate_read_response(&frame, 7),
            Err(Error::MalformedResponse)
        );
    }

    #[test]
    fn inconsistent_byte_count_is_rejected() {
        let mut frame = vec![MODBUS_ANY_ADDRESS, 0x04, 0x03, 0x30, 0xD4];
        let crc = crc16(&frame);
        frame.push((crc & 0x00FF) as u8);
        frame.push((crc >> 8) as u8);
        assert_eq!(
            validate_read_response(&frame, 7),
            Err(Error::MalformedResponse)
        );
    }

    #[test]
    fn write_frame_validates_against_its_own_echo() {
        let frame =
            build_request(FunctionCode::WriteSingleRegister, HR_ABC_PERIOD.address, 180).unwrap();
        assert_eq!(validate_write_echo(&frame, &frame), Ok(()));
    }

    #[test]
    fn differing_echo_is_rejected() {
        let frame =
            build_request(FunctionCode::WriteSingleRegister, HR_ABC_PERIOD.address, 180).unwrap();
        let mut echo = frame;
        echo[5] ^= 0x01;
        assert_eq!(validate_write_echo(&frame, &echo), Err(Error::EchoMismatch));
    }

    #[test]
    fn truncated_echo_is_rejected() {
        let frame =
            build_request(FunctionCode::WriteSingleRegister, HR_ABC_PERIOD.address, 180).unwrap();
        assert_eq!(
            validate_write_echo(&frame, &frame[..6]),
            Err(Error::UnexpectedLength)
        );
    }
}
