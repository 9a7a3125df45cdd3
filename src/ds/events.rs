use serde::{Deserialize, Serialize};

// One state access of a transaction template.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Event{
	pub reads: Vec<String>,
	#[serde(default)]
	pub write: String,
	#[serde(default)]
	pub has_write: bool,

	// Udf index in the runtime registry. Assigned by position.
	#[serde(skip)]
	pub sa_idx: usize,
}
