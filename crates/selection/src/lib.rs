// Selection state and grid synchronization
//
// The grid widget owns what is on screen; `SelectionStore` owns what the rest
// of the app believes is selected. `SelectionSync` feeds widget events into the
// store and restores the selection when the widget drops it, without letting
// its own restore re-trigger itself.

pub mod clock;
pub mod command;
pub mod context;
pub mod guard;
pub mod handle;
pub mod store;
pub mod sync;
pub mod testing;

pub use clock::{Clock, RealClock};
pub use command::{begin_command, finish_command, run_command, CommandBackend, CommandError, CommandOutcome};
pub use context::{ContextLimits, SheetContext};
pub use guard::{RestoreGuard, RestoreToken};
pub use handle::{GridEvent, GridHandle, GridRef};
pub use store::SelectionStore;
pub use sync::{SelectionSync, SyncOptions};
