//! Connection descriptors and sample data
//!
//! # Example
//!
//! ```rust
//! use hydrobox_io::{load_dataset, ConnectionDescriptor, Dataset};
//!
//! let q = load_dataset(Dataset::Discharge).unwrap();
//! assert_eq!(q.name(), Some("discharge"));
//!
//! let incomplete = ConnectionDescriptor::new().with_host("localhost");
//! assert!(!incomplete.is_valid());
//! assert!(incomplete.connection_string().is_err());
//! ```

pub mod connection;
pub mod dataset;
pub mod error;

pub use connection::ConnectionDescriptor;
pub use dataset::{load_dataset, parse_timeseries_csv, read_timeseries_csv, Dataset};
pub use error::{Error, Result};
