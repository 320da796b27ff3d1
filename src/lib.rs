//! Package implement an ordered index over byte-string keys, using a
//! [red-black][wiki-rbt] tree.
//!
//! Following types implement the index for specific use cases:
//!
//! * [RbTree] implements the balancing engine, single threaded,
//!   writes need `&mut self`.
//! * [Tree] wraps [RbTree] behind a reader/writer lock, cloneable
//!   handle that can be shared across threads.
//!
//! Properties
//! ----------
//!
//! - Each entry correspond to a {Key, Value} pair, key is a byte-string.
//! - Keys are ordered lexicographically, byte by byte.
//! - Parametrised over `value-type`, values are never interpreted.
//! - Insert, find and update, via insert(), find(), update() api.
//! - Duplicate keys are rejected, not merged.
//! - Delete is not supported, delete() always fail.
//! - Full table scan, to visit all entries in sorted order.
//! - Height of the tree is bounded by 2*log2(n+1).
//! - No Durability guarantee.
//!
//! Constructing a new [Tree] instance and operating on it:
//!
//! ```
//! use rbidx::Tree;
//!
//! let index: Tree<String> = Tree::new();
//! assert_eq!(index.len(), 0);
//! assert_eq!(index.is_empty(), true);
//!
//! index.insert("key1", "value1".to_string()).unwrap();
//! index.insert("key2", "value2".to_string()).unwrap();
//! assert!(index.insert("key2", "value3".to_string()).is_err());
//!
//! assert_eq!(index.len(), 2);
//!
//! let value = index.find(b"key1").unwrap();
//! assert_eq!(value, "value1".to_string());
//!
//! index.update(b"key2", "value3".to_string()).unwrap();
//! let value = index.find(b"key2").unwrap();
//! assert_eq!(value, "value3".to_string());
//!
//! let mut keys = vec![];
//! index.inorder(|key, _value| keys.push(key.to_vec()));
//! assert_eq!(keys, vec![b"key1".to_vec(), b"key2".to_vec()]);
//! ```
//!
//! [wiki-rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use std::{error, fmt, result};

// Short form to compose Error values.
//
// Here are few possible ways:
//
// ```ignore
// use crate::Error;
// err_at!(KeyNotFound, msg: format!("missing key"));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, validate_tree(root));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, validate_tree(root), format!("after insert"));
// ```
//
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

mod node;
mod rbt;
mod tree;

pub use node::{Color, NodeId};
pub use rbt::{Iter, RbTree};
pub use tree::Tree;

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, typically identifying the
/// error location.
pub enum Error {
    Fatal(String, String),
    DuplicateKey(String, String),
    KeyNotFound(String, String),
    NotImplemented(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, msg) => write!(f, "{} Fatal: {}", p, msg),
            DuplicateKey(p, msg) => write!(f, "{} DuplicateKey: {}", p, msg),
            KeyNotFound(p, msg) => write!(f, "{} KeyNotFound: {}", p, msg),
            NotImplemented(p, msg) => write!(f, "{} NotImplemented: {}", p, msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;
