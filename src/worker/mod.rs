use std::sync::atomic::AtomicBool;

pub mod context;
pub mod executor;
pub mod vnf_thread;

// Set on ctrl-c. Executors and the monitor drain and exit.
pub static GRACEFUL_SHUTDOWN: AtomicBool = AtomicBool::new(false);
