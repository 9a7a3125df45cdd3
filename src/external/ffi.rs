#[cxx::bridge]
mod ffi {

/*
	This file serves as the api list crossing between DB4NFV and the C/C++ vnf runtime.
*/

extern "Rust"{
	/* DepositTransaction receives transaction requests from Cpp.
		Non-blocking while the waiting queue has room; blocks once it holds
		config::CONFIG.waiting_queue_size requests until a slot frees up.
		Malformed requests throw rust::Error on the Cpp side.
	*/
	fn deposit_transaction(msg: String) -> Result<()>;
}

/*
	Interface implemented by the C++ vnf runtime. Exceptions arrive as cxx::Exception.
 */
unsafe extern "C++" {
	include!("db4nfv-bridge/include/ffi.h");

	#[cxx_name = "Init_SFC"]
	fn init_sfc(argc: i32, argv: Vec<String>) -> Result<String>;
	#[cxx_name = "VNFThread"]
	fn vnf_thread(c: i32, v: Vec<String>) -> Result<()>;
	fn execute_sa_udf(txn_req_id: u64, sa_idx: i32, value: Vec<u8>, param_count: i32) -> Result<Vec<u8>>;
	fn txn_finished(txn_req_id: u64) -> i32;
}

}

use crate::ds::transactions::{TxnMessage, TXN_TEMPLATES};
use crate::engine::api::{Engine, TxnStatus};
use crate::error::{Error, Result};

fn deposit_transaction(msg: String) -> Result<()> {
	let templates = TXN_TEMPLATES.get().ok_or(Error::NotInitialized)?;
	let parsed = TxnMessage::parse(&msg, templates).map_err(|e| {
		log::warn!("Rejected deposited transaction {}: {}", msg, e);
		e
	})?;
	super::pipe::deposit(parsed)
}

// Engine backed by the linked C++ runtime.
pub struct CppEngine;

impl Engine for CppEngine {
	fn init(&self, argc: i32, argv: Vec<String>) -> Result<String> {
		Ok(ffi::init_sfc(argc, argv)?)
	}

	fn start_worker(&self, c: i32, argv: Vec<String>) -> Result<()> {
		Ok(ffi::vnf_thread(c, argv)?)
	}

	fn submit_state_access(&self, txn_req_id: u64, sa_idx: i32, payload: Vec<u8>, param_count: i32) -> Result<Vec<u8>> {
		Ok(ffi::execute_sa_udf(txn_req_id, sa_idx, payload, param_count)?)
	}

	fn query_completion(&self, txn_req_id: u64) -> Result<TxnStatus> {
		TxnStatus::from_code(ffi::txn_finished(txn_req_id), txn_req_id)
	}
}

// Demo runtime tests use their own transaction ids since the runtime state is process-wide.
#[cfg(test)]
mod tests {
	use super::*;
	use crate::ds::transactions::Txn;
	use crate::engine::shim::Shim;
	use crate::external::pipe;
	use pretty_assertions::assert_eq;

	fn raw_msg(type_idx: u16, txn_req_id: u64) -> String {
		format!(r#"{{"type_idx": {}, "ts": 1, "txn_req_id": {}}}"#, type_idx, txn_req_id)
	}

	// Templates and pipe are set once per process, so the whole sequence lives in one test.
	#[test]
	fn deposit_needs_templates_and_pipe() {
		assert!(matches!(deposit_transaction(raw_msg(0, 1)), Err(Error::NotInitialized)));

		let templates = Txn::templates_from_status(r#"[{"es": [{"reads": [], "write": "flow", "has_write": true}]}]"#).unwrap();
		TXN_TEMPLATES.set(templates).unwrap();
		assert!(matches!(deposit_transaction(raw_msg(0, 2)), Err(Error::NotInitialized)));

		let rx = pipe::init(4).unwrap();
		assert!(matches!(pipe::init(4), Err(Error::AlreadyInitialized)));

		deposit_transaction(raw_msg(0, 3)).unwrap();
		assert_eq!(rx.try_recv().unwrap(), TxnMessage { type_idx: 0, ts: 1, txn_req_id: 3 });

		assert!(matches!(deposit_transaction(raw_msg(1, 4)), Err(Error::UnknownTemplate(1))));
		assert!(matches!(deposit_transaction(String::from("{")), Err(Error::Json(_))));
		assert!(rx.is_empty());
	}

	#[cfg(feature = "demo-runtime")]
	#[test]
	fn demo_runtime_round_trip() {
		let shim = Shim::new(CppEngine);
		let argv: Vec<String> = ["--mode", "test", "--txn", "9001", "--txn", "9002"]
			.iter().map(|s| s.to_string()).collect();
		let status = shim.initialize(argv.len() as i32, argv).unwrap();
		assert!(status.starts_with('['));

		assert_eq!(shim.is_transaction_finished(9002).unwrap(), TxnStatus::RUNNING);
		let payload = vec![3u8, 1, 4, 1, 5];
		let out = shim.execute_state_access(9001, 0, payload.clone(), payload.len() as i32).unwrap();
		assert_eq!(out, payload);
		let out = shim.execute_state_access(9001, 1, Vec::new(), 0).unwrap();
		assert!(out.is_empty());
		assert_eq!(shim.is_transaction_finished(9001).unwrap(), TxnStatus::COMMITTED);

		assert!(matches!(
			shim.execute_state_access(777_777, 0, vec![1], 1),
			Err(Error::UnknownTransaction(777_777))
		));
		assert!(shim.txn_status_code(777_777) < 0);
	}

	#[cfg(feature = "demo-runtime")]
	#[test]
	fn demo_runtime_errors_cross_as_errors() {
		let engine = CppEngine;
		assert!(matches!(engine.submit_state_access(9101, 7, Vec::new(), 0), Err(Error::UnknownFunction(7))));
		assert!(matches!(
			engine.submit_state_access(9101, 0, vec![1], 2),
			Err(Error::ParamCountOutOfRange { param_count: 2, payload_len: 1 })
		));
		assert!(matches!(engine.submit_state_access(9101, 0, vec![1], 1), Err(Error::UnknownTransaction(9101))));
		assert!(matches!(engine.query_completion(9199), Err(Error::UnknownTransaction(9199))));
	}
}
