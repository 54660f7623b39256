pub(crate) mod common;

mod pipeline;
