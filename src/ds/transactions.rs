use crate::ds::events as ev;
use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Txn{
	/*
		Fields passed from the runtime init status.
	 */
	pub es: Vec<ev::Event>,
}

pub static TXN_TEMPLATES: OnceCell::<Vec<Txn>> = OnceCell::new();

// Transaction request deposited by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TxnMessage {
	pub type_idx: u16,
	pub ts: u64,
	pub txn_req_id: u64,
}

impl Txn {
	// Deserialization function to parse the string into a vector of Txn
	pub fn from_string(input: &str) -> Result<Vec<Self>> {
		Ok(serde_json::from_str(input)?)
	}

	// Templates announced by the init status. Blank status means no templates.
	pub fn templates_from_status(status: &str) -> Result<Vec<Self>> {
		if status.trim().is_empty() {
			return Ok(Vec::new());
		}
		let mut txns = Self::from_string(status)
			.map_err(|e| Error::Template(e.to_string()))?;
		for (idx, txn) in txns.iter_mut().enumerate() {
			txn.process_txn()
				.map_err(|e| Error::Template(format!("txn {}: {}", idx, e)))?;
		}
		Ok(txns)
	}

	/*
		Compose the template:
		1. Add write key to reads, so the udf sees the state it overwrites.
		2. Sort and dedup reads.
		3. Route each event to the udf at its position.
	 */
	pub fn process_txn(&mut self) -> Result<()> {
		for (idx, event) in self.es.iter_mut().enumerate() {
			if event.has_write {
				if event.write.is_empty() {
					return Err(Error::Template(format!("event {} writes an empty key", idx)));
				}
				event.reads.push(event.write.clone());
			}
			event.reads.sort();
			event.reads.dedup();
			event.sa_idx = idx;
		}
		Ok(())
	}
}

impl TxnMessage {
	pub fn parse(raw: &str, templates: &[Txn]) -> Result<Self> {
		let msg: TxnMessage = serde_json::from_str(raw)?;
		if msg.type_idx as usize >= templates.len() {
			return Err(Error::UnknownTemplate(msg.type_idx));
		}
		Ok(msg)
	}
}
