pub mod logging;
pub mod responses;
pub mod throttle;
