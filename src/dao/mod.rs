/// Database model definitions.
pub mod models;
/// Storage traits and their backends.
pub mod room_store;
/// Room list import.
pub mod seed;
/// Storage abstraction layer for database operations.
pub mod storage;
