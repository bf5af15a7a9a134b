pub mod constraints;
pub mod generator;
pub mod presets;

pub use constraints::{ConstraintSet, Preset};
pub use generator::generate;
pub use presets::preset_constraints;
