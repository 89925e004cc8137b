//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod app_settings;
pub mod brand;
pub mod filament;
pub mod reusable_spool;
pub mod spool;

// Re-export specific types to avoid conflicts
pub use app_settings::{
    Column as AppSettingsColumn, Entity as AppSettings, Model as AppSettingsModel,
};
pub use brand::{Column as BrandColumn, Entity as Brand, Model as BrandModel};
pub use filament::{Column as FilamentColumn, Entity as Filament, Model as FilamentModel};
pub use reusable_spool::{
    Column as ReusableSpoolColumn, Entity as ReusableSpool, Model as ReusableSpoolModel,
};
pub use spool::{Column as SpoolColumn, Entity as Spool, Model as SpoolModel};
