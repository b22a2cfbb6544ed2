//! Signal simplification
//!
//! ```rust
//! use hydrobox_signal::{simplify, SimplifyOptions};
//!
//! let x = [1.0, 1.0, 2.0, 1.0, 3.0, 3.0];
//! let simple = simplify(&x, &SimplifyOptions::default()).unwrap();
//! assert_eq!(simple, vec![1.0, 3.0]);
//! ```

pub mod simplify;

pub use simplify::{simplify, simplify_array, SimplifyOptions};
