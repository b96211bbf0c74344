pub mod ast;
pub mod errors;
pub mod expression;
pub mod lexer;
pub mod normalizer;
pub mod patterns;
pub mod span;
pub mod statement;
pub mod token;
