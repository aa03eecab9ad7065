#![cfg_attr(not(any(test, feature = "std")), no_std)]

use core::fmt::Write;

use log::{debug, trace};

mod constants;
pub use constants::*;

mod crc;
pub use crc::crc16;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::{build_request, FunctionCode, REQUEST_LEN};

mod transport;
pub use transport::*;

use frame::{validate_read_response, validate_write_echo};

/// Serial number of the sensor, up to [`SERIAL_NUMBER_LEN`] characters.
pub type SerialNumber = heapless::String<SERIAL_NUMBER_LEN>;

/// Software version of the sensor, formatted as "major.minor".
pub type SoftwareVersion = heapless::String<SOFTWARE_VERSION_LEN>;

/// Snapshot of the attributes a caller typically polls together.
///
/// The engine has no composite read transaction; fill this from the
/// individual queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// Serial number of the sensor.
    pub serial_number: SerialNumber,
    /// Software version as "major.minor".
    pub software_version: SoftwareVersion,
    /// CO2 concentration in ppm.
    pub co2: i16,
    /// Detector temperature in degrees Celsius.
    pub temperature: i16,
}

/// Represents a CRIR M1 NDIR CO2 sensor on a point-to-point serial link.
///
/// Each method performs exactly one request/response exchange: it builds
/// a Modbus RTU frame, transmits it, blocks for at most the configured
/// timeout on the response and validates it before decoding. The engine
/// never retries; a failed call returns an [`Error`] and the caller may
/// simply call again.
///
/// The engine assumes strictly sequential use against one serial
/// session. If several threads need the sensor, serialize access
/// externally.
///
/// # Type Parameters
///
/// * `T`: The serial interface used to communicate with the sensor. It
///   must implement [`Transport`].
pub struct CrirM1<T> {
    transport: T,
    config: Config,
}

impl<T> CrirM1<T>
where
    T: Transport,
{
    /// Creates a new `CrirM1` engine instance.
    ///
    /// # Arguments
    ///
    /// * `transport`: The serial interface for communication with the
    ///   sensor, already opened at [`BAUD_RATE`].
    /// * `config`: The configuration for the engine.
    pub fn new(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    /// Reads the sensor's serial number.
    ///
    /// # Returns
    ///
    /// * `Ok(SerialNumber)` with the NUL-terminated text reported by the
    ///   sensor, at most [`SERIAL_NUMBER_LEN`] characters.
    /// * `Err(Error)` if the exchange or the decoding failed.
    pub fn get_serial_number(&mut self) -> Result<SerialNumber, Error> {
        let response = self.read_register(IR_SERIAL_NUMBER, 5)?;
        let payload = &response[3..3 + SERIAL_NUMBER_LEN];
        let end = payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(SERIAL_NUMBER_LEN);
        let text = core::str::from_utf8(&payload[..end]).map_err(|_| {
            log::error!("Serial number is not valid text: {:02X?}", payload);
            Error::MalformedResponse
        })?;
        let mut serial_number = SerialNumber::new();
        serial_number
            .push_str(text)
            .map_err(|_| Error::MalformedResponse)?;
        debug!("Serial number: {}", serial_number);
        Ok(serial_number)
    }

    /// Reads the sensor's software version, formatted as "major.minor".
    pub fn get_software_version(&mut self) -> Result<SoftwareVersion, Error> {
        let response = self.read_register(IR_SOFTWARE_VERSION, 1)?;
        let mut version = SoftwareVersion::new();
        write!(version, "{}.{}", response[3], response[4]).map_err(|_| Error::MalformedResponse)?;
        debug!("Software version: {}", version);
        Ok(version)
    }

    /// Reads the CO2 concentration in ppm.
    pub fn get_co2(&mut self) -> Result<i16, Error> {
        let response = self.read_register(IR_CO2, 1)?;
        let co2 = i16::from_be_bytes([response[3], response[4]]);
        debug!("CO2 value: {} ppm", co2);
        Ok(co2)
    }

    /// Reads the detector temperature in whole degrees Celsius.
    pub fn get_temperature(&mut self) -> Result<i16, Error> {
        let response = self.read_register(IR_TEMPERATURE, 1)?;
        let temperature = decode_temperature(response[3], response[4]);
        debug!("Temperature: {} C", temperature);
        Ok(temperature)
    }

    /// Reads the ABC period in hours. 0 means the automatic baseline
    /// correction is disabled.
    pub fn get_abc_period(&mut self) -> Result<u16, Error> {
        let response = self.read_register(HR_ABC_PERIOD, 1)?;
        let period = u16::from_be_bytes([response[3], response[4]]);
        debug!("ABC period: {} hours", period);
        Ok(period)
    }

    /// Sets the ABC period.
    ///
    /// # Arguments
    ///
    /// * `period`: The automatic baseline correction interval in hours,
    ///   4 to 4800, or 0 to disable the correction.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the sensor acknowledged the new value.
    /// * `Err(Error::InvalidArgument)` if `period` is out of range; the
    ///   request is rejected locally and nothing is transmitted.
    /// * `Err(Error)` for any failure of the exchange itself.
    pub fn set_abc_period(&mut self, period: u16) -> Result<(), Error> {
        if period == 0 || (4..=4800).contains(&period) {
            self.write_register(HR_ABC_PERIOD, period)
        } else {
            log::error!("ABC period {} out of range (0 or 4-4800 hours)", period);
            Err(Error::InvalidArgument)
        }
    }

    /// Reads the user concentration in ppm.
    pub fn get_user_concentration(&mut self) -> Result<u16, Error> {
        let response = self.read_register(HR_USER_CONCENTRATION, 1)?;
        let concentration = u16::from_be_bytes([response[3], response[4]]);
        debug!("User concentration: {} ppm", concentration);
        Ok(concentration)
    }

    /// Sets the user concentration.
    ///
    /// # Arguments
    ///
    /// * `concentration`: The reference concentration in ppm, 400 to
    ///   2000.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the sensor acknowledged the new value.
    /// * `Err(Error::InvalidArgument)` if `concentration` is out of
    ///   range; the request is rejected locally and nothing is
    ///   transmitted.
    /// * `Err(Error)` for any failure of the exchange itself.
    pub fn set_user_concentration(&mut self, concentration: u16) -> Result<(), Error> {
        if (400..=2000).contains(&concentration) {
            self.write_register(HR_USER_CONCENTRATION, concentration)
        } else {
            log::error!(
                "User concentration {} out of range (400-2000 ppm)",
                concentration
            );
            Err(Error::InvalidArgument)
        }
    }

    /// Reads the user acknowledgement register.
    ///
    /// After a user calibration the sensor reports
    /// [`CALIBRATION_COMPLETED`] here.
    pub fn get_user_acknowledgement(&mut self) -> Result<u16, Error> {
        let response = self.read_register(HR_USER_ACKNOWLEDGEMENT, 1)?;
        let flag = u16::from_be_bytes([response[3], response[4]]);
        debug!("User acknowledgement: {:#06X}", flag);
        Ok(flag)
    }

    /// Writes the user acknowledgement register. Any 16-bit value is
    /// forwarded; [`CLEAR_CALIBRATION_COMPLETION`] resets the
    /// calibration completion flag.
    pub fn set_user_acknowledgement(&mut self, flag: u16) -> Result<(), Error> {
        self.write_register(HR_USER_ACKNOWLEDGEMENT, flag)
    }

    /// Writes the user special command register. Any 16-bit value is
    /// forwarded; [`START_USER_CALIBRATION`] starts a user calibration.
    pub fn set_user_special_command(&mut self, command: u16) -> Result<(), Error> {
        self.write_register(HR_USER_SPECIAL_COMMAND, command)
    }

    /// Reads the meter status bit field. See the `METER_STATUS_*` masks.
    pub fn get_meter_status(&mut self) -> Result<u16, Error> {
        let response = self.read_register(IR_METER_STATUS, 1)?;
        let status = u16::from_be_bytes([response[3], response[4]]);
        debug!("Meter status: {:#018b}", status);
        Ok(status)
    }

    /// Reads the output status bit field. See the `OUTPUT_STATUS_*`
    /// masks.
    pub fn get_output_status(&mut self) -> Result<u16, Error> {
        let response = self.read_register(IR_OUTPUT_STATUS, 1)?;
        let status = u16::from_be_bytes([response[3], response[4]]);
        debug!("Output status: {:#018b}", status);
        Ok(status)
    }

    /// Reads the PWM output value.
    pub fn get_pwm_output(&mut self) -> Result<u16, Error> {
        let response = self.read_register(IR_PWM_OUTPUT, 1)?;
        let pwm = u16::from_be_bytes([response[3], response[4]]);
        debug!("PWM output: {}", pwm);
        Ok(pwm)
    }

    /// Reads the 32-bit sensor type ID.
    pub fn get_sensor_type_id(&mut self) -> Result<u32, Error> {
        let response = self.read_register(IR_SENSOR_TYPE_ID, 2)?;
        let sensor_type = u32::from_be_bytes([response[3], response[4], response[5], response[6]]);
        debug!("Sensor type ID: {:#010X}", sensor_type);
        Ok(sensor_type)
    }

    /// Reads the 32-bit sensor ID.
    pub fn get_sensor_id(&mut self) -> Result<u32, Error> {
        let response = self.read_register(IR_SENSOR_ID, 2)?;
        let sensor_id = u32::from_be_bytes([response[3], response[4], response[5], response[6]]);
        debug!("Sensor ID: {:#010X}", sensor_id);
        Ok(sensor_id)
    }

    /// Reads the memory map version.
    pub fn get_memory_map_version(&mut self) -> Result<u16, Error> {
        let response = self.read_register(IR_MEMORY_MAP_VERSION, 1)?;
        let version = u16::from_be_bytes([response[3], response[4]]);
        debug!("Memory map version: {:#06X}", version);
        Ok(version)
    }

    // One read exchange: build the request, transmit it, capture the
    // response into a fresh buffer and validate it. The payload starts
    // at offset 3 of the returned buffer.
    fn read_register(&mut self, register: Register, words: u16) -> Result<[u8; MSG_BUF_LEN], Error> {
        let function = match register.kind {
            RegisterKind::Holding => FunctionCode::ReadHoldingRegisters,
            RegisterKind::Input => FunctionCode::ReadInputRegisters,
        };
        let request = build_request(function, register.address, words)?;
        self.send_frame(&request)?;

        let expected = 5 + 2 * usize::from(words);
        let mut response = [0u8; MSG_BUF_LEN];
        let captured = self.capture(&mut response[..expected])?;
        if captured == 0 {
            trace!("No response within {:?}", self.config.timeout);
            return Err(Error::Timeout);
        }
        validate_read_response(&response[..captured], expected)?;
        Ok(response)
    }

    // One write exchange: the sensor acknowledges by echoing the request
    // frame verbatim.
    fn write_register(&mut self, register: Register, value: u16) -> Result<(), Error> {
        debug_assert!(register.kind == RegisterKind::Holding);
        let request = build_request(FunctionCode::WriteSingleRegister, register.address, value)?;
        self.send_frame(&request)?;

        let mut response = [0u8; MSG_BUF_LEN];
        let captured = self.capture(&mut response[..REQUEST_LEN])?;
        if captured == 0 {
            trace!("No echo within {:?}", self.config.timeout);
            return Err(Error::Timeout);
        }
        validate_write_echo(&request, &response[..captured])
    }

    fn send_frame(&mut self, bytes: &[u8]) -> Result<(), Error> {
        trace!("Bytes to send: {:02X?}", bytes);
        self.transport.write_bytes(bytes).map_err(|e| {
            log::error!("Transport write failed: {:?}", e);
            Error::WriteFailure
        })
    }

    fn capture(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let captured = self
            .transport
            .read_bytes(buf, self.config.timeout)
            .map_err(|e| {
                log::error!("Transport read failed: {:?}", e);
                Error::ReadFailure
            })?;
        trace!("Bytes received: {:02X?}", &buf[..captured]);
        Ok(captured)
    }
}

// Decodes the raw temperature register into whole degrees Celsius. The
// register holds hundredths of a degree offset by +100 C.
fn decode_temperature(hi: u8, lo: u8) -> i16 {
    ((i32::from(hi) * 256 + i32::from(lo)) / 100 - 100) as i16
}
