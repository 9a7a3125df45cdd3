use crate::error::{Error, Result};

// Trait Engine defines the capabilities the transactional vnf runtime offers across the boundary.
/*
	Everything behind it (scheduling, storage, concurrency control) belongs to the runtime.
	Buffers are moved in and moved back out; no side keeps a reference across the call.
 */
pub trait Engine: Send + Sync {
	// Engine-wide setup. Returns the runtime's status text.
	fn init(&self, argc: i32, argv: Vec<String>) -> Result<String>;

	// Runs one vnf worker on the calling thread until it exits.
	fn start_worker(&self, c: i32, argv: Vec<String>) -> Result<()>;

	/* State access.
		Executes udf sa_idx for transaction txn_req_id. The first param_count bytes of payload
		are caller supplied parameters, the rest is context in the runtime's own convention.
		May block while the runtime resolves conflicts.
	*/
	fn submit_state_access(&self, txn_req_id: u64, sa_idx: i32, payload: Vec<u8>, param_count: i32) -> Result<Vec<u8>>;

	// Read-only view of the transaction state machine.
	fn query_completion(&self, txn_req_id: u64) -> Result<TxnStatus>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnStatus {
	RUNNING,
	COMMITTED,
	ABORTED,
}

impl TxnStatus {
	pub fn code(self) -> i32 {
		match self {
			TxnStatus::RUNNING => 0,
			TxnStatus::COMMITTED => 1,
			TxnStatus::ABORTED => 2,
		}
	}

	// Decode the runtime's completion code. Negative codes are errors.
	pub fn from_code(code: i32, txn_req_id: u64) -> Result<Self> {
		match code {
			0 => Ok(TxnStatus::RUNNING),
			1 => Ok(TxnStatus::COMMITTED),
			2 => Ok(TxnStatus::ABORTED),
			c if c < 0 => Err(Error::from_status_code(c, txn_req_id)),
			c => Err(Error::Engine(format!("unrecognized completion status {} for transaction {}", c, txn_req_id))),
		}
	}

	pub fn is_terminal(self) -> bool {
		self != TxnStatus::RUNNING
	}
}
