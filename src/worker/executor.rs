use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::RecvTimeoutError;

use crate::{
	ds::transactions::{Txn, TxnMessage},
	engine::{api::{Engine, TxnStatus}, shim::Shim},
	error::{Error, Result},
	external::codec,
	monitor::monitor,
	utils,
	worker::GRACEFUL_SHUTDOWN,
};

use super::context::{Context, PollPolicy};

const RECV_TIMEOUT: Duration = Duration::from_millis(50);

pub fn spawn_executors<E: Engine + 'static>(contexts: Vec<Context<E>>) -> Result<Vec<JoinHandle<Result<()>>>> {
	contexts.into_iter().map(|ctx| -> Result<JoinHandle<Result<()>>> {
		let handle = thread::Builder::new()
			.name(format!("executor-{}", ctx.tid))
			.spawn(move || execute_thread(ctx))?;
		Ok(handle)
	}).collect()
}

// These executor threads take deposited transactions and replay their templates through the boundary.
pub fn execute_thread<E: Engine>(ctx: Context<E>) -> Result<()> {
	if ctx.bind_cores {
		utils::bind_to_cpu_core(ctx.tid)?;
	}
	log::info!("Executor {} started.", ctx.tid);

	loop {
		let msg = match ctx.txn_msg_pipe.recv_timeout(RECV_TIMEOUT) {
			Ok(msg) => msg,
			Err(RecvTimeoutError::Timeout) => {
				if GRACEFUL_SHUTDOWN.load(Ordering::SeqCst) {
					log::info!("Executor thread {} shutdown.", ctx.tid);
					break;
				}
				continue;
			}
			Err(RecvTimeoutError::Disconnected) => {
				log::info!("Channel closed. Executor {} exit.", ctx.tid);
				break;
			}
		};
		handle_message(&ctx, &msg);
	}
	Ok(())
}

// A failed transaction is reported and counted. The thread keeps serving.
fn handle_message<E: Engine>(ctx: &Context<E>, msg: &TxnMessage) {
	let slot = ctx.slot();
	monitor::record(slot, "claimed", msg.txn_req_id);

	let Some(tpl) = ctx.templates.get(msg.type_idx as usize) else {
		log::error!("Txn {}: {}", msg.txn_req_id, Error::UnknownTemplate(msg.type_idx));
		monitor::inc(slot, "txn.error");
		return;
	};

	match run_transaction(&ctx.shim, tpl, msg, ctx.poll, slot) {
		Ok(TxnStatus::ABORTED) => {
			log::debug!("Txn {} aborted.", msg.txn_req_id);
			monitor::record(slot, "abort", msg.txn_req_id);
			monitor::inc(slot, "txn.aborted");
		}
		Ok(_) => {
			log::debug!("Txn {} committed.", msg.txn_req_id);
			monitor::record(slot, "commit", msg.txn_req_id);
			monitor::inc(slot, "txn.committed");
		}
		Err(e) => {
			log::error!("Txn {} failed: {}", msg.txn_req_id, e);
			monitor::record(slot, "error", msg.txn_req_id);
			monitor::inc(slot, "txn.error");
		}
	}
}

/*
	Run every event of the template in order, then wait for the runtime's verdict.
	- Payload: the current values of the event's reads, codec encoded. All bytes are parameters.
	- Values start empty and are visible only within this transaction.
	- A writing event stores the udf output under its write key.
 */
pub fn run_transaction<E: Engine>(shim: &Shim<E>, tpl: &Txn, msg: &TxnMessage, poll: PollPolicy, slot: usize) -> Result<TxnStatus> {
	let mut state: HashMap<&str, Vec<u8>> = HashMap::new();
	for ev in &tpl.es {
		let values: Vec<Vec<u8>> = ev.reads.iter()
			.map(|k| state.get(k.as_str()).cloned().unwrap_or_default())
			.collect();
		let payload = codec::encode_values(&values);
		let param_count = i32::try_from(payload.len())
			.map_err(|_| Error::ResourceExhausted(format!("payload of {} bytes", payload.len())))?;
		let sa_idx = i32::try_from(ev.sa_idx)
			.map_err(|_| Error::UnknownFunction(i32::MAX))?;

		let out = shim.execute_state_access(msg.txn_req_id, sa_idx, payload, param_count)?;
		monitor::inc(slot, "sa.executed");
		if ev.has_write {
			state.insert(ev.write.as_str(), out);
		}
	}
	await_completion(shim, msg.txn_req_id, poll)
}

pub fn await_completion<E: Engine>(shim: &Shim<E>, txn_req_id: u64, poll: PollPolicy) -> Result<TxnStatus> {
	let mut rounds = 0;
	loop {
		let status = shim.is_transaction_finished(txn_req_id)?;
		if status.is_terminal() {
			return Ok(status);
		}
		rounds += 1;
		if let Some(max) = poll.max_rounds {
			if rounds >= max {
				return Err(Error::PollExhausted { txn_req_id, rounds });
			}
		}
		thread::sleep(poll.interval);
	}
}
