//! Stores: the generic concurrent map and the profile store built on it

pub mod keyed;
pub mod profiles;

pub use keyed::KeyedStore;
pub use profiles::ProfileStore;
