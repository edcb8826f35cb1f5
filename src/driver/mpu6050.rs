use embedded_hal::i2c::{Error as _, I2c};

use super::imu::{decode_i16, RawImu, RawSample, SensorError};

pub const MPU6050_DEFAULT_ADDR: u8 = 0x68;
pub const MPU6050_ALT_ADDR: u8 = 0x69;

pub const REG_ACCEL_XOUT_H: u8 = 0x3B;
pub const REG_ACCEL_XOUT_L: u8 = 0x3C;
pub const REG_ACCEL_YOUT_H: u8 = 0x3D;
pub const REG_ACCEL_YOUT_L: u8 = 0x3E;
pub const REG_ACCEL_ZOUT_H: u8 = 0x3F;
pub const REG_ACCEL_ZOUT_L: u8 = 0x40;

pub const REG_GYRO_XOUT_H: u8 = 0x43;
pub const REG_GYRO_XOUT_L: u8 = 0x44;
pub const REG_GYRO_YOUT_H: u8 = 0x45;
pub const REG_GYRO_YOUT_L: u8 = 0x46;
pub const REG_GYRO_ZOUT_H: u8 = 0x47;
pub const REG_GYRO_ZOUT_L: u8 = 0x48;

pub const REG_PWR_MGMT_1: u8 = 0x6B;

const ACCEL_REGISTERS: [(u8, u8); 3] = [
    (REG_ACCEL_XOUT_H, REG_ACCEL_XOUT_L),
    (REG_ACCEL_YOUT_H, REG_ACCEL_YOUT_L),
    (REG_ACCEL_ZOUT_H, REG_ACCEL_ZOUT_L),
];

const GYRO_REGISTERS: [(u8, u8); 3] = [
    (REG_GYRO_XOUT_H, REG_GYRO_XOUT_L),
    (REG_GYRO_YOUT_H, REG_GYRO_YOUT_L),
    (REG_GYRO_ZOUT_H, REG_GYRO_ZOUT_L),
];

/// MPU-6050 over I2C. Every output byte is fetched with its own register
/// read, so a high/low pair may straddle a sample update.
pub struct Mpu6050<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> Mpu6050<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    pub fn address(&self) -> u8 {
        self.addr
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Clears PWR_MGMT_1, taking the chip out of sleep on the internal oscillator.
    pub fn wake(&mut self) -> Result<(), SensorError> {
        self.i2c
            .write(self.addr, &[REG_PWR_MGMT_1, 0])
            .map_err(|e| SensorError::Bus {
                register: REG_PWR_MGMT_1,
                kind: e.kind(),
            })?;
        log::debug!("MPU at {:#04x} woken", self.addr);
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, SensorError> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[register], &mut buffer)
            .map_err(|e| SensorError::Bus {
                register,
                kind: e.kind(),
            })?;
        Ok(buffer[0])
    }

    fn read_triple(&mut self, registers: &[(u8, u8); 3]) -> Result<RawSample, SensorError> {
        let mut values = [0i16; 3];
        for (value, (high, low)) in values.iter_mut().zip(registers) {
            let high = self.read_register(*high)?;
            let low = self.read_register(*low)?;
            *value = decode_i16(high, low);
        }
        Ok(RawSample::new(values[0], values[1], values[2]))
    }
}

impl<I2C: I2c> RawImu for Mpu6050<I2C> {
    fn read_raw_accel(&mut self) -> Result<RawSample, SensorError> {
        self.read_triple(&ACCEL_REGISTERS)
    }

    fn read_raw_gyro(&mut self) -> Result<RawSample, SensorError> {
        self.read_triple(&GYRO_REGISTERS)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    use super::*;

    #[derive(Debug)]
    struct FakeBusError(ErrorKind);

    impl embedded_hal::i2c::Error for FakeBusError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    #[derive(Default)]
    struct FakeBus {
        registers: HashMap<u8, u8>,
        pointer: u8,
        fail_on: Option<u8>,
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl FakeBus {
        fn with_word(mut self, high_register: u8, value: i16) -> Self {
            let [high, low] = value.to_be_bytes();
            self.registers.insert(high_register, high);
            self.registers.insert(high_register + 1, low);
            self
        }
    }

    impl ErrorType for FakeBus {
        type Error = FakeBusError;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => {
                        self.writes.push((address, bytes.to_vec()));
                        if let Some(register) = bytes.first() {
                            self.pointer = *register;
                        }
                    }
                    Operation::Read(buffer) => {
                        if self.fail_on == Some(self.pointer) {
                            return Err(FakeBusError(ErrorKind::NoAcknowledge(
                                NoAcknowledgeSource::Data,
                            )));
                        }
                        for byte in buffer.iter_mut() {
                            *byte = self.registers.get(&self.pointer).copied().unwrap_or(0);
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn reads_accel_and_gyro_pairs() {
        let bus = FakeBus::default()
            .with_word(REG_ACCEL_XOUT_H, 1)
            .with_word(REG_ACCEL_YOUT_H, -1)
            .with_word(REG_ACCEL_ZOUT_H, 16384)
            .with_word(REG_GYRO_XOUT_H, -32768)
            .with_word(REG_GYRO_YOUT_H, 131)
            .with_word(REG_GYRO_ZOUT_H, -262);
        let mut mpu = Mpu6050::new(bus, MPU6050_DEFAULT_ADDR);

        assert_eq!(mpu.read_raw_accel().unwrap(), RawSample::new(1, -1, 16384));
        assert_eq!(
            mpu.read_raw_gyro().unwrap(),
            RawSample::new(-32768, 131, -262)
        );
    }

    #[test]
    fn wake_clears_power_management() {
        let mut mpu = Mpu6050::new(FakeBus::default(), MPU6050_ALT_ADDR);
        mpu.wake().unwrap();
        let bus = mpu.release();
        assert_eq!(bus.writes, vec![(MPU6050_ALT_ADDR, vec![REG_PWR_MGMT_1, 0])]);
    }

    #[test]
    fn bus_failure_names_the_register() {
        let bus = FakeBus {
            fail_on: Some(REG_GYRO_YOUT_L),
            ..Default::default()
        };
        let mut mpu = Mpu6050::new(bus, MPU6050_DEFAULT_ADDR);
        assert_eq!(
            mpu.read_raw_gyro(),
            Err(SensorError::Bus {
                register: REG_GYRO_YOUT_L,
                kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            })
        );
    }
}
