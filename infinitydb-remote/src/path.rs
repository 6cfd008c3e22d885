//! URL path escaping for key prefixes
//!
//! A request URL ends with a path down into the database, one `/`-separated
//! segment per component. Each segment is the component's token form
//! (strings quoted, `[n]` for an Index, ISO dates) percent-encoded so that
//! only `A-Za-z0-9-_.~` remain literal.

use infinitydb_core::Component;

/// The escaped path segment for one component, without the leading `/`.
pub fn escape_component(component: &Component) -> String {
    urlencoding::encode(&component.to_string()).into_owned()
}

/// The escaped path for a key prefix: `/seg1/seg2...`, or empty.
pub fn escape_path(components: &[Component]) -> String {
    components
        .iter()
        .map(|c| format!("/{}", escape_component(c)))
        .collect()
}
