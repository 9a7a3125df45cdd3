use thiserror::Error;

/// Errors surfaced by the boundary and the runtime around it.
#[derive(Debug, Error)]
pub enum Error {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("unknown transaction {0}")]
	UnknownTransaction(u64),

	#[error("unknown state-access function {0}")]
	UnknownFunction(i32),

	#[error("param count {param_count} out of range for payload of {payload_len} bytes")]
	ParamCountOutOfRange { param_count: i32, payload_len: usize },

	#[error("state access conflict: {0}")]
	Conflict(String),

	#[error("resource exhausted: {0}")]
	ResourceExhausted(String),

	#[error("engine not initialized")]
	NotInitialized,

	#[error("engine already initialized")]
	AlreadyInitialized,

	#[error("declared {declared} arguments but {actual} supplied")]
	ArgCountMismatch { declared: i32, actual: usize },

	#[error("engine failure: {0}")]
	Engine(String),

	#[error("unknown transaction template {0}")]
	UnknownTemplate(u16),

	#[error("invalid transaction template: {0}")]
	Template(String),

	#[error("transaction pipe closed")]
	PipeClosed,

	#[error("transaction {txn_req_id} still running after {rounds} polls")]
	PollExhausted { txn_req_id: u64, rounds: u32 },

	#[error("logger setup failed: {0}")]
	Logging(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// Catch-all status for errors without a dedicated code.
pub const STATUS_OTHER: i32 = -100;

impl Error {
	/// Signed status code handed to callers that only understand integers.
	/// Always negative.
	pub fn status_code(&self) -> i32 {
		match self {
			Error::Config(_) => -1,
			Error::UnknownTransaction(_) => -2,
			Error::UnknownFunction(_) => -3,
			Error::ParamCountOutOfRange { .. } => -4,
			Error::Conflict(_) => -5,
			Error::ResourceExhausted(_) => -6,
			Error::NotInitialized => -7,
			Error::AlreadyInitialized => -8,
			Error::ArgCountMismatch { .. } => -9,
			_ => STATUS_OTHER,
		}
	}

	/// Inverse of `status_code` for negative codes returned by the engine.
	pub fn from_status_code(code: i32, txn_req_id: u64) -> Self {
		match code {
			-1 => Error::Config(String::from("engine rejected configuration")),
			-2 => Error::UnknownTransaction(txn_req_id),
			-5 => Error::Conflict(format!("transaction {}", txn_req_id)),
			-6 => Error::ResourceExhausted(format!("transaction {}", txn_req_id)),
			-7 => Error::NotInitialized,
			_ => Error::Engine(format!("status {} for transaction {}", code, txn_req_id)),
		}
	}

	/*
		Engine side reports failures as "<kind>: <detail>".
		Unrecognized kinds, or details that fail to parse, stay as Engine errors carrying the full message.
	 */
	pub fn from_engine_message(msg: &str) -> Self {
		let Some((kind, detail)) = msg.split_once(':') else {
			return Error::Engine(msg.to_string());
		};
		let detail = detail.trim();
		match kind.trim() {
			"config" => Error::Config(detail.to_string()),
			"unknown_txn" => detail.parse()
				.map(Error::UnknownTransaction)
				.unwrap_or_else(|_| Error::Engine(msg.to_string())),
			"unknown_function" => detail.parse()
				.map(Error::UnknownFunction)
				.unwrap_or_else(|_| Error::Engine(msg.to_string())),
			"param_count" => detail.split_once(" exceeds ")
				.and_then(|(p, l)| Some(Error::ParamCountOutOfRange {
					param_count: p.trim().parse().ok()?,
					payload_len: l.trim().parse().ok()?,
				}))
				.unwrap_or_else(|| Error::Engine(msg.to_string())),
			"conflict" => Error::Conflict(detail.to_string()),
			"exhausted" => Error::ResourceExhausted(detail.to_string()),
			_ => Error::Engine(msg.to_string()),
		}
	}
}

impl From<cxx::Exception> for Error {
	fn from(e: cxx::Exception) -> Self {
		Error::from_engine_message(e.what())
	}
}
