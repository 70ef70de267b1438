//! Script list resolution.
//!
//! A mod declares its script sources in a `.src` include file: one reference
//! per line, resolved relative to the include file itself. A reference is
//! either another include file (recursed into), a direct `.d` script, or a
//! prefix wildcard (`Story_*.d`) expanded against its directory. The result
//! is a flat, duplicate-free list of absolute script paths in depth-first,
//! first-occurrence order.

mod resolver;
mod wildcard;

pub use resolver::{ResolveError, resolve_script_list, strip_comments};
pub use wildcard::WildcardPattern;
