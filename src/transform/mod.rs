pub mod aggregate;
pub mod classify;
pub mod normalize;

pub use aggregate::{bulk, union_by_key, UnionOutput, UnionPlan};
pub use classify::{coerce, coerce_numeric, ColumnSelector, CoercionReport};
pub use normalize::normalize;
