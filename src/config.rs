use serde::{Serialize, Deserialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use lazy_static::lazy_static;
use std::sync::RwLock;

use crate::error::{Error, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    // VNF worker threads. Each one blocks inside the runtime.
    pub vnf_threads_num: u16,
    // Executor threads replaying deposited transactions.
    pub worker_threads_num: u16,
    // Deposited transactions waiting for an executor. Deposit blocks when full.
    pub waiting_queue_size: usize,
    // Tokens passed to the runtime init. Overridden by trailing cli args.
    pub sfc_args: Vec<String>,
    // Tokens passed to every vnf worker.
    pub vnf_args: Vec<String>,
    // Pin threads to cores.
    pub bind_cores: bool,
    // Interval between completion polls.
    pub txn_poll_interval_us: u64,
    // Give up polling after this many rounds. None waits forever.
    pub txn_poll_max_rounds: Option<u32>,
    // Verbose output.
    pub verbose: bool,
    // If enable monitor thread.
    pub monitor_enabled: bool,
    // Monitor logging path. Default to be current path.
    pub log_dir: String,
}

lazy_static! {
    pub static ref CONFIG: RwLock<Config> = RwLock::new(Config::default());
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vnf_threads_num: 1,
            worker_threads_num: 2,
            waiting_queue_size: 4096,
            sfc_args: Vec::new(),
            vnf_args: Vec::new(),
            bind_cores: false,
            txn_poll_interval_us: 100,
            txn_poll_max_rounds: None,
            verbose: false,
            monitor_enabled: true,
            log_dir: String::from("./perf"),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads_num == 0 {
            return Err(Error::Config(String::from("worker_threads_num must be at least 1")));
        }
        if self.waiting_queue_size == 0 {
            return Err(Error::Config(String::from("waiting_queue_size must be at least 1")));
        }
        if self.bind_cores {
            let cores = core_affinity::get_core_ids()
                .ok_or_else(|| Error::Config(String::from("cannot enumerate cpu cores")))?
                .len();
            if self.required_cores() > cores {
                return Err(Error::Config(format!(
                    "no sufficient cores for pointed thread nums: need {}, total {}",
                    self.required_cores(), cores
                )));
            }
        }
        Ok(())
    }

    pub fn required_cores(&self) -> usize {
        self.worker_threads_num as usize
            + self.vnf_threads_num as usize // Vnf threads.
            + 1 // Main thread.
            + 1 // Monitor thread.
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "db4nfv-bridge", about = "Drives the DB4NFV vnf runtime through its transactional boundary.")]
pub struct Cli {
    /// Configuration file. A template is written there if missing.
    #[structopt(short, long, parse(from_os_str), default_value = "./config.json")]
    pub file: PathBuf,
    /// Write the default configuration to FILE and exit.
    #[structopt(long)]
    pub dump_config: bool,
    /// Tokens for the runtime init, replacing sfc_args.
    #[structopt(last = true)]
    pub sfc_args: Vec<String>,
}

pub fn dump_config_template(file_path: &Path) -> Result<()> {
    let default_config = Config::default();
    let serialized_config = serde_json::to_string_pretty(&default_config)?;

    fs::write(file_path, serialized_config)?;

    log::info!("Config template has been created at '{}'", file_path.display());
    Ok(())
}

fn read_config_from_file(file_path: &Path) -> Result<Config> {
    let file = File::open(file_path)?;
    let reader = BufReader::new(file);

    // Deserialize the JSON into the Config struct
    let config: Config = serde_json::from_reader(reader)
        .map_err(|e| Error::Config(format!("{}: {}", file_path.display(), e)))?;

    Ok(config)
}

// Load the configuration without touching the global.
pub fn load(file_path: &Path) -> Result<Config> {
    // Check if the config file exists, if not, create a template
    if !file_path.exists() {
        dump_config_template(file_path)?;
    }
    let config = read_config_from_file(file_path)?;
    config.validate()?;
    Ok(config)
}

pub fn init(file_path: &Path) -> Result<()> {
    let config = load(file_path)?;

    fast_log::init(
        fast_log::Config::new()
            .console()
            .level(config.log_level())
            .chan_len(Some(100000)),
    ).map_err(|e| Error::Logging(e.to_string()))?;

    log::info!("== Config Inited.");
    log::debug!("{:?}", config);

    let mut glb = CONFIG.write().map_err(|_| Error::Config(String::from("config lock poisoned")))?;
    *glb = config;
    Ok(())
}

// Snapshot of the global config.
pub fn current() -> Config {
    match CONFIG.read() {
        Ok(c) => c.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
