//! Extract by-name targets from assign filters.
//!
//! An assign filter that only compares object names, such as
//!
//! ```text
//! host.name == "web1" && service.name == "http" || host.name == "web2" && service.name == "http"
//! ```
//!
//! selects a fixed set of objects. This crate recognizes those filters and
//! returns the names they compare against, so callers can look the objects up
//! directly instead of evaluating the filter against every object. Operand
//! order of `==`, `&&` and `||` does not matter, and names may come from
//! string literals or from named constants.
//!
//! # Example
//!
//! ```
//! use filter_expr::{parse, ConstantTable};
//! use filter_targets::{target_hosts, target_services};
//!
//! let filter = parse(r#"host.name == "a" && service.name == "b" || "d" == service.name && host.name == "c""#).unwrap();
//! assert_eq!(target_services(&filter, None), Some(vec![("a", "b"), ("c", "d")]));
//!
//! let constants: ConstantTable = [("WEB", "web1")].into_iter().collect();
//! let filter = parse("host.name == WEB").unwrap();
//! assert_eq!(target_hosts(&filter, Some(&constants)), Some(vec!["web1"]));
//!
//! // Anything else is simply not a by-name filter.
//! let filter = parse(r#"host.name != "a""#).unwrap();
//! assert_eq!(target_hosts(&filter, None), None);
//! ```

mod matcher;
mod targets;

pub use matcher::{
    compared_name, is_name_indexer, resolve, resolve_str, target_host, target_hosts,
    target_service, target_services,
};
pub use targets::{require_targets, TargetError, TargetKind, Targets};
