use std::{collections::HashMap, fs::{self, File}, io::{self, Seek, Write}, path::Path, sync::{atomic::Ordering, Mutex}, thread, time::Duration};

use crossbeam::atomic::AtomicCell;
use once_cell::sync::OnceCell;

use crate::{config, error::{Error, Result}, utils, worker::GRACEFUL_SHUTDOWN};

pub struct Metrics {
	pub ts: u64,
	pub content: String,
}

pub struct ThreadLogger {
	role: ThreadRole,
	history: Mutex<Vec<Metrics>>,
	counter: HashMap<&'static str, AtomicCell<u64>>,
}

impl ThreadLogger {
	pub fn new_executor() -> Self{
		ThreadLogger{
			role: ThreadRole::EXECUTOR,
			history: Mutex::new(Vec::with_capacity(100000)),
			counter: HashMap::from([
				("sa.executed", AtomicCell::new(0)),
				("txn.committed", AtomicCell::new(0)),
				("txn.aborted", AtomicCell::new(0)),
				("txn.error", AtomicCell::new(0)),
			]),
		}
	}
	pub fn new_vnf() -> Self{
		ThreadLogger{
			role: ThreadRole::VNF,
			history: Mutex::new(Vec::new()),
			counter: HashMap::from([
				("worker.started", AtomicCell::new(0)),
				("worker.failed", AtomicCell::new(0)),
			]),
		}
	}
	pub fn log(&self, m: Metrics) {
		if let Ok(mut history) = self.history.lock() {
			history.push(m);
		}
	}
	// Unregistered entries are ignored.
	pub fn inc(&self, entry: &str) {
		if let Some(cnt) = self.counter.get(entry) {
			cnt.fetch_add(1);
		}
	}
	pub fn count(&self, entry: &str) -> u64 {
		self.counter.get(entry).map(|c| c.load()).unwrap_or(0)
	}
}

// Vnf loggers first, executor loggers after.
pub static MONITOR: OnceCell<Vec<ThreadLogger>> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadRole{
	EXECUTOR,
	VNF,
}

pub fn init(log_dir: &str, vnf_threads_num: u16, worker_threads_num: u16) -> Result<()> {
	// Check if log directory exists, create if not.
	if !Path::new(log_dir).exists() {
		fs::create_dir_all(log_dir)?;
		log::info!("Log directory created: {}", log_dir);
	}

	let mut monitors: Vec::<ThreadLogger> = Vec::new();
	(0..vnf_threads_num).for_each(|_| monitors.push(ThreadLogger::new_vnf()));
	(0..worker_threads_num).for_each(|_| monitors.push(ThreadLogger::new_executor()));
	MONITOR.set(monitors).map_err(|_| Error::AlreadyInitialized)
}

// Logger of the thread at slot, when monitoring is on.
pub fn logger(slot: usize) -> Option<&'static ThreadLogger> {
	MONITOR.get().and_then(|m| m.get(slot))
}

pub fn record(slot: usize, event: &str, txn_req_id: u64) {
	if let Some(tl) = logger(slot) {
		let ts = utils::current_time_ns();
		tl.log(Metrics{
			ts,
			content: format!("{},{},{}", txn_req_id, event, ts),
		});
	}
}

pub fn inc(slot: usize, entry: &str) {
	if let Some(tl) = logger(slot) {
		tl.inc(entry);
	}
}

pub fn monitor_thread() -> Result<()> {
	let log_dir = config::current().log_dir;
	let his_file_path = format!("{}/history.csv", log_dir);
	let cnt_file_path = format!("{}/cnt.csv", log_dir);

	// Open log file for writing.
	let mut his_log = File::create(&his_file_path)?;
	let mut cnt_log = File::create(&cnt_file_path)?;
	let loggers = match MONITOR.get() {
		Some(l) => l,
		None => return Ok(()),
	};

	// Collect data and write to log file every 1 second.
	loop {
		if GRACEFUL_SHUTDOWN.load(Ordering::SeqCst) {
			log::info!("Monitor thread shutdown.");
			break;
		}
		dump_log(loggers, &mut his_log, &mut cnt_log)?;

		thread::sleep(Duration::from_secs(1));
	}
	dump_log(loggers, &mut his_log, &mut cnt_log)?;
	Ok(())
}

/*
	History lines are appended once and released. Counters are rewritten as a snapshot on every dump.
 */
pub fn dump_log<H: Write, C: Write + Seek>(loggers: &[ThreadLogger], history_l: &mut H, cnt_l: &mut C) -> io::Result<()> {
	let mut snapshot = String::new();
	for (tid, tl) in loggers.iter().enumerate() {
		let mut entries: Vec<_> = tl.counter.iter().collect();
		entries.sort_by_key(|(k, _)| **k);
		for (k, v) in entries {
			snapshot.push_str(&format!("{},{:?},{},{}\n", tid, tl.role, k, v.load()));
		}

		let mut h = match tl.history.lock() {
			Ok(h) => h,
			Err(poisoned) => poisoned.into_inner(),
		};
		for m in h.iter() {
			writeln!(history_l, "{},{:?},{},{}", tid, tl.role, m.ts, m.content)?;
		}
		h.clear();
	}
	history_l.flush()?;

	cnt_l.seek(io::SeekFrom::Start(0))?;
	cnt_l.write_all(snapshot.as_bytes())?;
	cnt_l.flush()
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn dump_writes_history_once_and_counters_each_time() {
		let loggers = vec![ThreadLogger::new_vnf(), ThreadLogger::new_executor()];
		loggers[1].log(Metrics{ ts: 5, content: String::from("7,commit,5") });
		loggers[1].inc("txn.committed");
		loggers[1].inc("not.registered");

		let mut his = Vec::new();
		let mut cnt = Cursor::new(Vec::new());
		dump_log(&loggers, &mut his, &mut cnt).unwrap();
		dump_log(&loggers, &mut his, &mut cnt).unwrap();

		assert_eq!(String::from_utf8(his).unwrap(), "1,EXECUTOR,5,7,commit,5\n");
		let cnt = String::from_utf8(cnt.into_inner()).unwrap();
		assert!(cnt.contains("1,EXECUTOR,txn.committed,1\n"));
		assert!(cnt.contains("0,VNF,worker.started,0\n"));
		assert_eq!(cnt.lines().count(), 6);
		assert_eq!(loggers[1].count("txn.committed"), 1);
		assert_eq!(loggers[1].count("not.registered"), 0);
		assert!(loggers[1].history.lock().unwrap().is_empty());
	}

	#[test]
	fn dumped_history_is_released() {
		let loggers = vec![ThreadLogger::new_executor()];
		for i in 0..1000 {
			loggers[0].log(Metrics{ ts: i, content: format!("{},claimed,{}", i, i) });
		}
		let mut his = Vec::new();
		let mut cnt = Cursor::new(Vec::new());
		dump_log(&loggers, &mut his, &mut cnt).unwrap();
		assert_eq!(String::from_utf8(his).unwrap().lines().count(), 1000);
		assert_eq!(loggers[0].history.lock().unwrap().len(), 0);
	}

	#[test]
	fn second_init_is_rejected() {
		let dir = std::env::temp_dir().join(format!("db4nfv-monitor-{}", std::process::id()));
		let dir = dir.to_str().unwrap();
		// No slots, so concurrent tests recording into the monitor stay no-ops.
		init(dir, 0, 0).unwrap();
		assert!(matches!(init(dir, 0, 0), Err(Error::AlreadyInitialized)));
		assert!(logger(0).is_none());
	}
}
