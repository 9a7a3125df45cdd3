use std::collections::HashMap;
use std::sync::Mutex;

use crossbeam::atomic::AtomicCell;

use crate::error::{Error, Result};
use super::api::{Engine, TxnStatus};

type Udf = Box<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

// In-memory engine double. Transactions must be begun before the engine knows them.
pub struct FnEngine {
	udfs: Vec<Udf>,
	txns: Mutex<HashMap<u64, TxnStatus>>,
	calls: Mutex<Vec<(u64, i32, Vec<u8>, i32)>>,
	workers: Mutex<Vec<Vec<String>>>,
	init_calls: AtomicCell<u32>,
	init_failure: Mutex<Option<String>>,
}

impl FnEngine {
	pub const IDENTITY: i32 = 0;
	pub const DOUBLE: i32 = 1;
	pub const CONFLICT: i32 = 2;

	pub fn with_defaults() -> Self {
		let udfs: Vec<Udf> = vec![
			Box::new(|p: &[u8]| -> Result<Vec<u8>> { Ok(p.to_vec()) }),
			Box::new(|p: &[u8]| -> Result<Vec<u8>> { Ok([p, p].concat()) }),
			Box::new(|_: &[u8]| -> Result<Vec<u8>> {
				Err(Error::from_engine_message("conflict: write-write on flow"))
			}),
		];
		FnEngine {
			udfs,
			txns: Mutex::new(HashMap::new()),
			calls: Mutex::new(Vec::new()),
			workers: Mutex::new(Vec::new()),
			init_calls: AtomicCell::new(0),
			init_failure: Mutex::new(None),
		}
	}

	pub fn begin(&self, txn_req_id: u64) {
		self.txns.lock().unwrap().insert(txn_req_id, TxnStatus::RUNNING);
	}

	pub fn commit(&self, txn_req_id: u64) {
		self.txns.lock().unwrap().insert(txn_req_id, TxnStatus::COMMITTED);
	}

	pub fn abort(&self, txn_req_id: u64) {
		self.txns.lock().unwrap().insert(txn_req_id, TxnStatus::ABORTED);
	}

	pub fn fail_next_init(&self, msg: &str) {
		*self.init_failure.lock().unwrap() = Some(msg.to_string());
	}

	pub fn init_calls(&self) -> u32 {
		self.init_calls.load()
	}

	pub fn calls(&self) -> Vec<(u64, i32, Vec<u8>, i32)> {
		self.calls.lock().unwrap().clone()
	}

	pub fn workers(&self) -> Vec<Vec<String>> {
		self.workers.lock().unwrap().clone()
	}
}

impl Engine for FnEngine {
	fn init(&self, _argc: i32, argv: Vec<String>) -> Result<String> {
		self.init_calls.fetch_add(1);
		if let Some(msg) = self.init_failure.lock().unwrap().take() {
			return Err(Error::from_engine_message(&msg));
		}
		Ok(format!("inited:{}", argv.join(" ")))
	}

	fn start_worker(&self, _c: i32, argv: Vec<String>) -> Result<()> {
		self.workers.lock().unwrap().push(argv);
		Ok(())
	}

	fn submit_state_access(&self, txn_req_id: u64, sa_idx: i32, payload: Vec<u8>, param_count: i32) -> Result<Vec<u8>> {
		if !self.txns.lock().unwrap().contains_key(&txn_req_id) {
			return Err(Error::UnknownTransaction(txn_req_id));
		}
		let udf = usize::try_from(sa_idx).ok()
			.and_then(|i| self.udfs.get(i))
			.ok_or(Error::UnknownFunction(sa_idx))?;
		let out = udf(&payload);
		self.calls.lock().unwrap().push((txn_req_id, sa_idx, payload, param_count));
		out
	}

	fn query_completion(&self, txn_req_id: u64) -> Result<TxnStatus> {
		self.txns.lock().unwrap()
			.get(&txn_req_id)
			.copied()
			.ok_or(Error::UnknownTransaction(txn_req_id))
	}
}
