//! Screen widgets.

pub(crate) mod command_pallet;
pub(crate) mod info;
