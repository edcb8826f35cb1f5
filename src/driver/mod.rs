pub mod clock;
pub mod imu;
pub mod mpu6050;
