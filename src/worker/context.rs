use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::{
	config::Config,
	ds::transactions::{Txn, TxnMessage},
	engine::{api::Engine, shim::Shim},
};

// How executors wait for the runtime to finish a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
	pub interval: Duration,
	pub max_rounds: Option<u32>,
}

impl PollPolicy {
	pub fn from_config(config: &Config) -> Self {
		PollPolicy {
			interval: Duration::from_micros(config.txn_poll_interval_us),
			max_rounds: config.txn_poll_max_rounds,
		}
	}
}

pub struct Context<E: Engine> {
	// Thread id, also the core to bind.
	pub tid: usize,
	pub shim: Arc<Shim<E>>,
	pub templates: &'static [Txn],
	pub txn_msg_pipe: Receiver<TxnMessage>,
	pub poll: PollPolicy,
	pub bind_cores: bool,
}

impl<E: Engine> Context<E> {
	pub fn new(tid: usize, shim: Arc<Shim<E>>, templates: &'static [Txn], pipe: Receiver<TxnMessage>, config: &Config) -> Self {
		Self {
			tid,
			shim,
			templates,
			txn_msg_pipe: pipe,
			poll: PollPolicy::from_config(config),
			bind_cores: config.bind_cores,
		}
	}

	// Monitor slot. Thread ids start at 1.
	pub fn slot(&self) -> usize {
		self.tid - 1
	}
}
