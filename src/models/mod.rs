pub mod assessment;
pub mod doctor;
pub mod form;
pub mod patient;

pub use assessment::*;
pub use doctor::*;
pub use form::*;
pub use patient::*;
