//! Balance sheet concepts, their figures and the suspicion filter applied to
//! concept selections.

mod figure;
mod suspicion;

pub use figure::{Concept, ConceptFigure, FigureLine};
pub use suspicion::SuspicionFilter;
