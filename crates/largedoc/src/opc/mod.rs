//! Open Packaging Conventions parts shared by every Office package.

pub mod content_types;
pub mod core_properties;
pub mod extended_properties;
pub mod relationships;

pub use content_types::ContentTypes;
pub use core_properties::CoreProperties;
pub use extended_properties::ExtendedProperties;
pub use relationships::{Relationship, Relationships, TargetMode};
