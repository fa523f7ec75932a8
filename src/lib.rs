//! Tallytree - an ordered map of integer ids to positive counters, backed
//! by a red-black tree.
//!
//! # Quick Start
//!
//! ```
//! use tallytree::tree::CountTree;
//!
//! let mut tree = CountTree::from_sorted(&[(10, 5)]).unwrap();
//!
//! assert_eq!(tree.increase(20, 3), 3);
//! assert_eq!(tree.reduce(10, 2), 3);
//! assert_eq!(tree.in_range(0, 100), 6);
//! assert_eq!(tree.next(10), Some((20, 3)));
//!
//! // Driving a weight to zero removes the id.
//! assert_eq!(tree.reduce(10, 3), 0);
//! assert_eq!(tree.previous(20), None);
//! ```

pub mod command;
pub mod error;
pub mod tree;
