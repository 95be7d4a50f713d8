pub mod region;

pub use region::{GeoPoint, Region};
