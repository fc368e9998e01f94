//! Evaluation rules for type destructors, one module per destructor.

pub mod conditional;
pub mod index_access;
pub mod keyof;
pub mod mapped;
pub mod readonly;
pub mod spread;
