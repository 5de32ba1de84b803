mod model;
mod storage_class;

pub use model::*;
pub use storage_class::*;
