use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::{api::Engine, shim::Shim};
use crate::error::Result;
use crate::monitor::monitor;
use crate::utils;

/*
	Hands each vnf worker to its own thread. start_worker blocks for the worker's lifetime,
	so the returned handles finish only when the runtime lets the worker go.
	Thread tid is 1..=n, monitor slot tid - 1. Core tid when binding.
 */
pub fn spawn_vnf_threads<E: Engine + 'static>(
	shim: Arc<Shim<E>>,
	n: u16,
	args: Vec<String>,
	bind_cores: bool,
) -> Result<Vec<JoinHandle<Result<()>>>> {
	(1..=n as usize).map(|tid| -> Result<JoinHandle<Result<()>>> {
		let shim = shim.clone();
		let args = args.clone();
		let handle = thread::Builder::new()
			.name(format!("vnf-{}", tid))
			.spawn(move || vnf_thread(tid, shim, args, bind_cores))?;
		Ok(handle)
	}).collect()
}

fn vnf_thread<E: Engine>(tid: usize, shim: Arc<Shim<E>>, args: Vec<String>, bind_cores: bool) -> Result<()> {
	let slot = tid - 1;
	if bind_cores {
		utils::bind_to_cpu_core(tid)?;
	}
	monitor::inc(slot, "worker.started");
	let res = utils::arg_count(args.len())
		.and_then(|argc| shim.start_worker(argc, args));
	match &res {
		Ok(()) => log::info!("VNF thread {} exit.", tid),
		Err(e) => {
			monitor::inc(slot, "worker.failed");
			log::error!("VNF thread {} failed: {}", tid, e);
		}
	}
	res
}
