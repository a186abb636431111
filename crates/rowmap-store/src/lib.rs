//! Statement execution for rowmap records
//!
//! [`RecordStore`] builds statements for record types, runs them on a
//! [`SqlExecutor`] and writes each command and its outcome to a
//! [`CommandLog`].
//!
//! ## Engines
//!
//! - [`MemoryExecutor`] - in-process tables, always available
//! - [`SqliteExecutor`] - embedded SQLite, in a file or in memory
//!
//! ## Example
//!
//! ```rust,ignore
//! use rowmap_store::{CommandLog, MemoryExecutor, RecordStore};
//!
//! let store = RecordStore::new(MemoryExecutor::new())
//!     .with_log(CommandLog::open("database_log.txt")?);
//! store.create_table::<Vehicle>("Vehicles").await?;
//! store.insert_all("Vehicles", &vehicles).await?;
//! print!("{}", store.select("Vehicles", "*", "Weight > 2500").await?.render());
//! ```

pub mod executor;
pub mod log;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use executor::{ExecError, ExecOutcome, ResultSet, SqlExecutor, StatementKind};
pub use log::CommandLog;
pub use memory::MemoryExecutor;
pub use sqlite::SqliteExecutor;
pub use store::{RecordStore, StoreError};
