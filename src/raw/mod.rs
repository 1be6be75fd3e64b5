mod arena;
mod handle;
mod limits;
mod node;
mod raw_btree;
mod splice;

pub(crate) use handle::Handle;
pub(crate) use raw_btree::RawBTree;
