//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of node indices
//! with point indices, which live in independently sized index spaces.

use serde::{Deserialize, Serialize};

/// Index into the node arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index into the material point arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointId(pub u32);

/// Index into the element connectivity (bootstrap only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Index into the material set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MaterialId(pub u16);

impl NodeId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl PointId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ElementId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for PointId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for ElementId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u16> for MaterialId {
    fn from(val: u16) -> Self {
        Self(val)
    }
}
