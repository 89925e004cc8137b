//! Core business logic - framework-agnostic inventory, allocation and reporting operations.

/// Brand suggestion list
pub mod brand;
/// CSV import and export
pub mod exchange;
/// Filament catalog and the filament stock aggregate
pub mod filament;
/// Stock reports and formatting helpers
pub mod report;
/// Reusable spool body tracking
pub mod reusable;
/// Application settings row
pub mod settings;
/// Spool ledger
pub mod spool;
/// Stock status thresholds
pub mod threshold;
/// Consumption allocator
pub mod usage;
