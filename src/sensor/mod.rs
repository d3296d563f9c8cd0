//! Heading feedback for the azimuth axis.

mod heading;

pub use heading::{HeadingSample, HeadingSensor};
