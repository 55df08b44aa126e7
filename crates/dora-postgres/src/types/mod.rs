//! Contains constraints, enumerations and other custom types.

mod constants;
mod constraint;
mod enums;
mod filtering;
mod pagination;

pub use constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use constraint::{ConstraintCategory, ConstraintViolation, DeploymentEventConstraints};
pub use enums::DeploymentStatus;
pub use filtering::DeploymentFilter;
pub use pagination::{Cursor, CursorPage, CursorPagination};
