pub mod conversion;
pub mod definition;
pub mod validate;
pub mod wire;

pub use conversion::*;
pub use definition::*;
pub use validate::*;
pub use wire::*;
