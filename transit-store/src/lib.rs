pub mod app_config;
pub mod lease;
pub mod memory;
pub mod wallet;

pub use app_config::Config;
pub use lease::{LeaseKey, LeaseMap};
pub use memory::MemStore;
pub use wallet::MemWalletLedger;
