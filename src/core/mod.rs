pub mod attachment;
pub mod contact;
pub mod etl;
pub mod flatten;
pub mod normalize;
pub mod qc;
pub mod tsv;

pub use crate::domain::model::{Backup, Table, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
