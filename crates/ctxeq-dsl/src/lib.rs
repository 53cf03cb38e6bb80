#![doc = include_str!("../README.md")]

pub mod ast;
pub mod errors;
pub mod parser;

pub use ast::{BinaryOp, Formula, UnaryOp};
pub use errors::ParseError;
pub use parser::{parse, parse_ctl, parse_ctl_named, parse_named};
