mod signal;

pub use signal::shutdown_signal;
