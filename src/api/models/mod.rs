pub mod appointments;
pub mod doctors;
pub mod feedback;
pub mod medications;
pub mod patients;
pub mod reminders;
pub mod statistics;
pub mod system;

pub use appointments::*;
pub use doctors::*;
pub use feedback::*;
pub use medications::*;
pub use patients::*;
pub use reminders::*;
pub use statistics::*;
pub use system::*;
