//! Decision tasks: kinds, vote policies and constraints.

mod constraints;
mod decision_task;
mod kind;
mod policy;

pub use constraints::{ALLOWED_SUM_UNITS, Constraints};
pub use decision_task::{DecisionTask, Supervision};
pub use kind::{ResponseFormat, TaskKind};
pub use policy::VotePolicy;
