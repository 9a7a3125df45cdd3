use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use structopt::StructOpt;

mod config;
mod ds;
mod engine;
mod error;
mod external;
mod monitor;
mod utils;
mod worker;

use ds::transactions::{Txn, TXN_TEMPLATES};
use engine::shim::Shim;
use error::{Error, Result};
use external::{ffi::CppEngine, pipe};
use worker::{
    context::Context,
    executor::spawn_executors,
    vnf_thread::spawn_vnf_threads,
    GRACEFUL_SHUTDOWN,
};

fn main() {
    let cli = config::Cli::from_args();
    if let Err(e) = run(cli) {
        log::error!("Fatal: {}", e);
        log::logger().flush();
        eprintln!("db4nfv-bridge: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: config::Cli) -> Result<()> {
    if cli.dump_config {
        return config::dump_config_template(&cli.file);
    }

    config::init(&cli.file)?;
    let cfg = config::current();

    ctrlc::set_handler(|| GRACEFUL_SHUTDOWN.store(true, Ordering::SeqCst))
        .map_err(|e| Error::Config(format!("ctrl-c handler: {}", e)))?;

    // Main thread on core 0.
    if cfg.bind_cores {
        utils::bind_to_cpu_core(0)?;
    }

    // Initiate the runtime and load the transaction templates it announces.
    let shim = Arc::new(Shim::new(CppEngine));
    let sfc_args = if cli.sfc_args.is_empty() { cfg.sfc_args.clone() } else { cli.sfc_args };
    let status = shim.initialize(utils::arg_count(sfc_args.len())?, sfc_args)?;
    let templates = Txn::templates_from_status(&status)?;
    log::info!("Runtime announced {} transaction templates.", templates.len());
    TXN_TEMPLATES.set(templates).map_err(|_| Error::AlreadyInitialized)?;
    let templates: &'static [Txn] = TXN_TEMPLATES.get().ok_or(Error::NotInitialized)?;

    let txn_msg_queue = pipe::init(cfg.waiting_queue_size)?;

    let monitor_guard = if cfg.monitor_enabled {
        monitor::monitor::init(&cfg.log_dir, cfg.vnf_threads_num, cfg.worker_threads_num)?;
        let core = cfg.required_cores() - 1;
        let bind = cfg.bind_cores;
        Some(thread::Builder::new().name(String::from("monitor")).spawn(move || -> Result<()> {
            if bind {
                utils::bind_to_cpu_core(core)?;
            }
            monitor::monitor::monitor_thread()
        })?)
    } else {
        None
    };

    /*
        Spawn Vnf threads and bind to core 1..=vnf_threads_num.
        They live inside the runtime and are not joined.
     */
    let _vnf_guards = spawn_vnf_threads(shim.clone(), cfg.vnf_threads_num, cfg.vnf_args.clone(), cfg.bind_cores)?;

    /*
        Spawn executor threads on the following cores.
     */
    let first = cfg.vnf_threads_num as usize + 1;
    let contexts = (first..first + cfg.worker_threads_num as usize)
        .map(|tid| Context::new(tid, shim.clone(), templates, txn_msg_queue.clone(), &cfg))
        .collect();
    drop(txn_msg_queue);
    let guards = spawn_executors(contexts)?;

    let mut failure = None;
    for guard in guards {
        match guard.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => { log::error!("Executor failed: {}", e); failure.get_or_insert(e); }
            Err(_) => { failure.get_or_insert(Error::Engine(String::from("executor panicked"))); }
        }
    }
    // Executors may leave on their own; release the monitor as well.
    GRACEFUL_SHUTDOWN.store(true, Ordering::SeqCst);
    if let Some(guard) = monitor_guard {
        match guard.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("Monitor failed: {}", e),
            Err(_) => log::error!("Monitor panicked"),
        }
    }
    if let Some(loggers) = monitor::monitor::MONITOR.get() {
        for entry in ["txn.committed", "txn.aborted", "txn.error"] {
            let total: u64 = loggers.iter().map(|tl| tl.count(entry)).sum();
            log::info!("{}: {}", entry, total);
        }
    }

    log::info!("Shutdown.");
    log::logger().flush();
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
