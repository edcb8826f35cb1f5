use log::LevelFilter;

pub(crate) mod harness;
pub(crate) mod utils;

pub(crate) fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Error)
        .filter(Some("mpu_orientation"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}
