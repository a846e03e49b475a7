//! Application views.
//! Each module contains definitions of screens and forms related to a
//! subdomain.

pub(crate) mod deploy;
pub(crate) mod manage;
