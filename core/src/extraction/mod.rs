pub mod pharma;
pub mod tags;

pub use pharma::{AcquisitionContext, RadiopharmaceuticalDose};
pub use tags::*;
