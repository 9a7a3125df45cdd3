/*
	Payload layout for state values crossing the boundary.
	Each value is a u32 little-endian length followed by its bytes, in read-key order.
 */

pub fn encode_values(values: &[Vec<u8>]) -> Vec<u8> {
	let total = values.iter().map(|v| 4 + v.len()).sum();
	let mut out = Vec::with_capacity(total);
	for v in values {
		out.extend_from_slice(&(v.len() as u32).to_le_bytes());
		out.extend_from_slice(v);
	}
	out
}
