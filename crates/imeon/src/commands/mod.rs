pub mod config_cmd;
pub mod device;
pub mod listings;
pub mod util;
