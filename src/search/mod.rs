// Search kernels: single byte, byte-set membership, and substring, each
// in both scan directions.

pub mod byte;
pub mod set;
pub mod substring;

pub use byte::{find_byte, rfind_byte};
pub use set::{find_byteset, rfind_byteset};
pub use substring::{find, rfind};
