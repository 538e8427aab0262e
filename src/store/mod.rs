/// Generic record store built on the storage engine
///
/// Six entity types share one repository and one query engine. Each entity
/// only contributes its descriptor table (see [`entity!`](crate::entity)).
pub mod entity;
pub mod field;
pub mod query;
pub mod repository;
pub mod validation;

pub use entity::Entity;
pub use field::{Check, FieldDef, FieldKind, FieldRole, FieldType, FieldValue};
pub use query::{Comparison, CompiledFilter, Condition, Direction, Filters, Operator, Projection, SortBy, Sorter};
pub use repository::{Page, Repository};
