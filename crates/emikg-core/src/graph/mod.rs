mod batch;
mod literal;
pub mod namespace;
mod serialize;

pub use batch::{inverse_of, TripleBatch};
pub use literal::{blank_node, integer_literal, numeric_or_string, string_literal};
pub use namespace::{encode_local, Namespace, Vocab};
pub use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
pub use serialize::GraphFormat;
