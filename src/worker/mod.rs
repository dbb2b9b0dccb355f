pub mod scan_worker;

pub use scan_worker::run as run_scan_worker;
pub use scan_worker::{delay_until_next_tick, RecapTracker, STOP_MESSAGE};
