pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod exam;
pub mod history;
pub mod patient;
pub mod prescription;
pub mod visit;

pub use appointment::*;
pub use doctor::*;
pub use enums::*;
pub use exam::*;
pub use history::*;
pub use patient::*;
pub use prescription::*;
pub use visit::*;
