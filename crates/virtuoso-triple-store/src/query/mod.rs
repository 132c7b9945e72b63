pub(crate) mod sparql;
pub(crate) mod sql;
pub mod vocab;
