use crossbeam::channel::{bounded, Receiver, Sender};
use once_cell::sync::OnceCell;

use crate::ds::transactions::TxnMessage;
use crate::error::{Error, Result};

// Entry of deposited transactions. Set once by init.
pub(crate) static PIPE_IN: OnceCell<Sender<TxnMessage>> = OnceCell::new();

pub fn init(waiting_queue_size: usize) -> Result<Receiver<TxnMessage>> {
	let (tx, rx) = bounded(waiting_queue_size);
	PIPE_IN.set(tx).map_err(|_| Error::AlreadyInitialized)?;
	Ok(rx)
}

pub fn deposit(msg: TxnMessage) -> Result<()> {
	send(PIPE_IN.get().ok_or(Error::NotInitialized)?, msg)
}

// Blocks while the waiting queue is full.
pub(crate) fn send(tx: &Sender<TxnMessage>, msg: TxnMessage) -> Result<()> {
	tx.send(msg).map_err(|_| Error::PipeClosed)
}

#[cfg(test)]
mod tests {
	use std::thread;
	use std::time::Duration;

	use super::*;

	fn msg(id: u64) -> TxnMessage {
		TxnMessage { type_idx: 0, ts: id, txn_req_id: id }
	}

	#[test]
	fn full_queue_blocks_until_drained() {
		let (tx, rx) = bounded(1);
		send(&tx, msg(1)).unwrap();
		let h = thread::spawn(move || send(&tx, msg(2)));
		thread::sleep(Duration::from_millis(50));
		assert!(!h.is_finished());
		assert_eq!(rx.recv().unwrap().txn_req_id, 1);
		h.join().unwrap().unwrap();
		assert_eq!(rx.recv().unwrap().txn_req_id, 2);
	}

	#[test]
	fn closed_queue_is_an_error() {
		let (tx, rx) = bounded(1);
		drop(rx);
		assert!(matches!(send(&tx, msg(1)), Err(Error::PipeClosed)));
	}
}
