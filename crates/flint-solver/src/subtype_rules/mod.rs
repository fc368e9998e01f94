//! Structural subtype rules, split by the kind of type compared.

mod functions;
mod objects;
mod protocols;
mod unions;
