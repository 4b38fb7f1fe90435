mod environment;

pub use environment::{Env, Environment};
