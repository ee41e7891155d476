pub mod handle;
pub mod table;

pub use handle::Handle;
pub use table::SlotTable;
