//! Extension traits

mod depot;
mod result;
mod updated_since;

pub(crate) use depot::DepotExt as _;
pub(crate) use result::ResultExt as _;
pub(crate) use updated_since::UpdatedSinceExt as _;
