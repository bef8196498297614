mod bits;
mod codec;
mod decoder;
mod encoder;
mod error;
mod gf;
mod poly;
mod roots;

pub use bits::BitBuf;
pub use codec::Bch;
pub use error::{BchError, BchResult};
