pub mod colors;
pub mod normalize;
pub mod resolve;
pub mod results;
pub mod seats;

pub use colors::party_color;
pub use normalize::canonical_key;
pub use resolve::*;
pub use results::*;
pub use seats::*;
