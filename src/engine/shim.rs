use once_cell::sync::OnceCell;

use crate::error::{Error, Result};
use super::api::{Engine, TxnStatus};

/*
	Shim guards every call crossing into the engine.
	- Arguments are validated before the crossing, so malformed calls never reach the runtime.
	- Engine errors are returned as is. No retry, no default value on failure.
	- Initialization happens at most once. A failed attempt leaves the shim uninitialized.
 */
pub struct Shim<E: Engine> {
	engine: E,
	init_status: OnceCell<String>,
}

impl<E: Engine> Shim<E> {
	pub fn new(engine: E) -> Self {
		Shim {
			engine,
			init_status: OnceCell::new(),
		}
	}

	pub fn engine(&self) -> &E {
		&self.engine
	}

	pub fn is_initialized(&self) -> bool {
		self.init_status.get().is_some()
	}

	// Status text returned by the successful initialization, if any.
	pub fn init_status(&self) -> Option<&str> {
		self.init_status.get().map(String::as_str)
	}

	pub fn initialize(&self, argc: i32, argv: Vec<String>) -> Result<String> {
		check_arg_count(argc, &argv)?;

		// Concurrent callers wait here; only the first one reaches the engine.
		let mut ran = false;
		let status = self.init_status.get_or_try_init(|| {
			ran = true;
			log::info!("Initializing engine with {} args: {:?}", argc, argv);
			self.engine.init(argc, argv)
		})?;
		if !ran {
			return Err(Error::AlreadyInitialized);
		}
		log::debug!("Engine init status: {}", status);
		Ok(status.clone())
	}

	// Blocks for the worker's lifetime.
	pub fn start_worker(&self, c: i32, argv: Vec<String>) -> Result<()> {
		self.ensure_initialized()?;
		check_arg_count(c, &argv)?;
		log::info!("Starting vnf worker with {} args: {:?}", c, argv);
		self.engine.start_worker(c, argv)
	}

	pub fn execute_state_access(&self, txn_req_id: u64, sa_idx: i32, payload: Vec<u8>, param_count: i32) -> Result<Vec<u8>> {
		self.ensure_initialized()?;
		if sa_idx < 0 {
			return Err(Error::UnknownFunction(sa_idx));
		}
		if param_count < 0 || param_count as usize > payload.len() {
			return Err(Error::ParamCountOutOfRange {
				param_count,
				payload_len: payload.len(),
			});
		}
		log::debug!("sa call txn {} udf {} payload {}B params {}", txn_req_id, sa_idx, payload.len(), param_count);
		self.engine.submit_state_access(txn_req_id, sa_idx, payload, param_count)
	}

	pub fn is_transaction_finished(&self, txn_req_id: u64) -> Result<TxnStatus> {
		self.ensure_initialized()?;
		self.engine.query_completion(txn_req_id)
	}

	// Integer form of is_transaction_finished: status code, or the negative error code.
	pub fn txn_status_code(&self, txn_req_id: u64) -> i32 {
		match self.is_transaction_finished(txn_req_id) {
			Ok(status) => status.code(),
			Err(e) => {
				log::warn!("Completion query for txn {} failed: {}", txn_req_id, e);
				e.status_code()
			}
		}
	}

	fn ensure_initialized(&self) -> Result<()> {
		if self.is_initialized() {
			Ok(())
		} else {
			Err(Error::NotInitialized)
		}
	}
}

fn check_arg_count(argc: i32, argv: &[String]) -> Result<()> {
	if argc < 0 || argc as usize != argv.len() {
		return Err(Error::ArgCountMismatch {
			declared: argc,
			actual: argv.len(),
		});
	}
	Ok(())
}
