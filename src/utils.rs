use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

// Function to get current time in nanoseconds
pub fn current_time_ns() -> u64{
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

pub fn bind_to_cpu_core(c: usize) -> Result<()> {
    let core_ids = core_affinity::get_core_ids()
        .ok_or_else(|| Error::ResourceExhausted(String::from("cannot enumerate cpu cores")))?;
    let core = core_ids.get(c)
        .ok_or_else(|| Error::ResourceExhausted(format!("core {} out of {}", c, core_ids.len())))?;
    if !core_affinity::set_for_current(*core) {
        return Err(Error::ResourceExhausted(format!("binding to core {} failed", c)));
    }
    Ok(())
}

// Token count as the i32 argc the runtime expects.
pub fn arg_count(len: usize) -> Result<i32> {
    i32::try_from(len)
        .map_err(|_| Error::Config(format!("{} arguments exceed the runtime argc range", len)))
}
