//! Form widgets.

pub(crate) mod text;
