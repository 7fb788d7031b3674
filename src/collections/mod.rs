mod hash_pool;
mod xorhash;

pub use hash_pool::*;
pub use xorhash::*;
