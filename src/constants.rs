// MODBUS_ANY_ADDRESS is the address byte of every frame; the CRIR M1
// answers it regardless of any configured bus address.
pub const MODBUS_ANY_ADDRESS: u8 = 0xFE;

// BAUD_RATE is the only serial speed the sensor supports.
pub const BAUD_RATE: u32 = 9600;

// MSG_BUF_LEN is the capacity of the per-call response buffer, sized to
// the largest response the register map can produce (serial number,
// 15 bytes on the wire).
pub const MSG_BUF_LEN: usize = 20;

// SERIAL_NUMBER_LEN is the number of characters in the serial number.
pub const SERIAL_NUMBER_LEN: usize = 10;

// SOFTWARE_VERSION_LEN is the capacity reserved for the "major.minor"
// software version text.
pub const SOFTWARE_VERSION_LEN: usize = 10;

/// Register classes of the sensor's Modbus map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    /// Read/write registers, read with function code 0x03 and written
    /// with 0x06.
    Holding,
    /// Read-only registers, read with function code 0x04.
    Input,
}

/// One entry of the sensor's register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    /// 16-bit register address.
    pub address: u16,
    /// Holding or input register.
    pub kind: RegisterKind,
}

// Input registers.
pub const IR_TEMPERATURE: Register = Register { address: 0x0004, kind: RegisterKind::Input };
pub const IR_METER_STATUS: Register = Register { address: 0x0005, kind: RegisterKind::Input };
pub const IR_OUTPUT_STATUS: Register = Register { address: 0x0006, kind: RegisterKind::Input };
pub const IR_CO2: Register = Register { address: 0x0007, kind: RegisterKind::Input };
pub const IR_PWM_OUTPUT: Register = Register { address: 0x0008, kind: RegisterKind::Input };
// Sensor type ID spans two words, high word first.
pub const IR_SENSOR_TYPE_ID: Register = Register { address: 0x0009, kind: RegisterKind::Input };
pub const IR_MEMORY_MAP_VERSION: Register = Register { address: 0x000B, kind: RegisterKind::Input };
pub const IR_SOFTWARE_VERSION: Register = Register { address: 0x000C, kind: RegisterKind::Input };
// Sensor ID spans two words, high word first.
pub const IR_SENSOR_ID: Register = Register { address: 0x000D, kind: RegisterKind::Input };
// Serial number spans five words, 0x000F through 0x0013.
pub const IR_SERIAL_NUMBER: Register = Register { address: 0x000F, kind: RegisterKind::Input };

// Holding registers.
pub const HR_ABC_PERIOD: Register = Register { address: 0x0004, kind: RegisterKind::Holding };
pub const HR_USER_ACKNOWLEDGEMENT: Register = Register { address: 0x0005, kind: RegisterKind::Holding };
pub const HR_USER_SPECIAL_COMMAND: Register = Register { address: 0x0006, kind: RegisterKind::Holding };
pub const HR_USER_CONCENTRATION: Register = Register { address: 0x0007, kind: RegisterKind::Holding };

// Meter status bits.
pub const METER_STATUS_OUT_OF_RANGE: u16 = 0x0020;
pub const METER_STATUS_MEMORY_ERROR: u16 = 0x0040;

// Output status bits.
pub const OUTPUT_STATUS_ALARM: u16 = 0x0001;
pub const OUTPUT_STATUS_PWM: u16 = 0x0002;

// Calibration values for the special command and acknowledgement
// registers.
pub const CLEAR_CALIBRATION_COMPLETION: u16 = 0x0000;
pub const START_USER_CALIBRATION: u16 = 0x7C01;
pub const CALIBRATION_COMPLETED: u16 = 0x0001;
