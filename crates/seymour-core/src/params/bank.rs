//! Raw parameter storage shared between control and audio threads

use std::sync::atomic::{AtomicI32, Ordering};

use super::ParameterLayout;
use crate::error::{ParamError, ParamResult};

/// Read access to raw parameter values by flat index
///
/// The engine only ever reads parameters through this trait, so a host can
/// hand over a plain slice, or a [`SharedParams`] bank written from another
/// thread. Unknown indices read as 0.
pub trait ParamSource {
    fn raw(&self, index: usize) -> i32;
}

impl ParamSource for [i32] {
    #[inline]
    fn raw(&self, index: usize) -> i32 {
        self.get(index).copied().unwrap_or(0)
    }
}

impl ParamSource for Vec<i32> {
    #[inline]
    fn raw(&self, index: usize) -> i32 {
        self.as_slice().raw(index)
    }
}

/// Lock-free parameter bank
///
/// Each value is an `AtomicI32` so a UI or MIDI thread can write while the
/// audio thread reads without locking. Writes are clamped to the parameter
/// range on the way in.
pub struct SharedParams {
    values: Box<[AtomicI32]>,
    ranges: Box<[(i32, i32)]>,
}

impl SharedParams {
    /// Create a bank holding the layout's defaults
    pub fn new(layout: &ParameterLayout) -> Self {
        let values = layout
            .params()
            .iter()
            .map(|p| AtomicI32::new(p.default))
            .collect();
        let ranges = layout.params().iter().map(|p| (p.min, p.max)).collect();
        Self { values, ranges }
    }

    /// Number of parameters in the bank
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store a raw value, clamped into range. Returns the stored value.
    pub fn set(&self, index: usize, raw: i32) -> ParamResult<i32> {
        let (min, max) = *self.ranges.get(index).ok_or(ParamError::UnknownIndex {
            index,
            count: self.values.len(),
        })?;
        let clamped = raw.clamp(min, max);
        self.values[index].store(clamped, Ordering::Relaxed);
        Ok(clamped)
    }

    /// Load a raw value
    pub fn get(&self, index: usize) -> Option<i32> {
        self.values.get(index).map(|v| v.load(Ordering::Relaxed))
    }

    /// Copy every value out (for saving or inspection)
    pub fn snapshot(&self) -> Vec<i32> {
        self.values.iter().map(|v| v.load(Ordering::Relaxed)).collect()
    }
}

impl ParamSource for SharedParams {
    #[inline]
    fn raw(&self, index: usize) -> i32 {
        self.get(index).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ChannelParam, GlobalParam};

    #[test]
    fn test_slice_source() {
        let values = vec![3, -4, 5];
        assert_eq!(values.raw(1), -4);
        assert_eq!(values.as_slice().raw(9), 0);
    }

    #[test]
    fn test_shared_params_defaults() {
        let layout = ParameterLayout::new(2);
        let params = SharedParams::new(&layout);
        assert_eq!(params.len(), layout.len());
        assert_eq!(params.snapshot(), layout.defaults());
    }

    #[test]
    fn test_shared_params_set_clamps() {
        let layout = ParameterLayout::new(2);
        let params = SharedParams::new(&layout);

        let pan = layout.channel_param(1, ChannelParam::Pan);
        assert_eq!(params.set(pan, -250).unwrap(), -100);
        assert_eq!(params.raw(pan), -100);

        let lookahead = layout.global_param(GlobalParam::Lookahead);
        assert_eq!(params.set(lookahead, 1).unwrap(), 5);
        assert_eq!(params.set(lookahead, 120).unwrap(), 120);
    }

    #[test]
    fn test_shared_params_unknown_index() {
        let layout = ParameterLayout::new(1);
        let params = SharedParams::new(&layout);
        let err = params.set(layout.len(), 1).unwrap_err();
        assert_eq!(
            err,
            ParamError::UnknownIndex {
                index: layout.len(),
                count: layout.len()
            }
        );
        assert_eq!(params.get(layout.len()), None);
        assert_eq!(params.raw(layout.len()), 0);
    }
}
