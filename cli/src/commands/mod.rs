//! CLI commands for jointbpe.

pub mod apply;
pub mod learn;
pub mod learn_joint;

pub use apply::ApplyCommand;
pub use learn::LearnCommand;
pub use learn_joint::LearnJointCommand;
