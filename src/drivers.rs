pub mod sysfs_led;

pub use sysfs_led::SysfsLeds;
