pub mod attribute;
pub mod error;
pub mod matching;
pub mod node;
pub mod types;

pub use attribute::{Attribute, Comparator, FeatureConstraint, Value};
pub use error::{ContractError, ContractErrorKind};
pub use node::Contract;
pub use types::ContractType;
