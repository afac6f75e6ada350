//! Named, composable adjustment sets applied uniformly to a flow set.

pub mod adjustments;
