pub mod calendar;
pub mod directory;

pub use calendar::{InMemoryCalendar, SlotCalendar};
pub use directory::DoctorDirectoryService;
