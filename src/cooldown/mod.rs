pub mod clock;
pub mod registry;
pub mod ticker;

pub use clock::{ManualClock, SystemClock, TimeSource};
pub use registry::CooldownRegistry;
pub use ticker::{sweep_tick, CooldownTick, CooldownTicker};
