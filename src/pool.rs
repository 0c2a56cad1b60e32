//! Actor pool storage.
//!
//! All live actors of the active theme are packed into one flat `f32`
//! buffer, record after record. The layout is deliberate: stepping 700
//! actors per frame walks a single contiguous allocation. Callers never
//! compute field offsets by hand; each variant has a `#[repr(C)]` record
//! struct and the pool hands out typed views of the buffer via
//! `bytemuck` casts.
//!
//! The pool is reallocated only on theme switch (the record layout can
//! change); a viewport resize leaves it untouched.

use bytemuck::{Pod, Zeroable};

/// Record layout for the `default` theme's square particles.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct HaloRecord {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub age: f32,
    pub ttl: f32,
    pub speed: f32,
    pub size: f32,
    pub hue: f32,
}

/// Record layout for the `swirl` theme's noise-steered ribbons.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SwirlRecord {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub age: f32,
    pub ttl: f32,
    pub speed: f32,
    pub radius: f32,
    pub hue: f32,
}

/// Record layout for the `pipeline` theme's grid-turning pipes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PipeRecord {
    pub x: f32,
    pub y: f32,
    pub direction: f32,
    pub speed: f32,
    pub age: f32,
    pub ttl: f32,
    pub width: f32,
    pub hue: f32,
}

/// Record layout for the `aurora` theme's vertical rays.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RayRecord {
    pub x: f32,
    pub y1: f32,
    pub y2: f32,
    pub age: f32,
    pub ttl: f32,
    pub width: f32,
    pub speed: f32,
    pub hue: f32,
}

/// Fixed-capacity flat record store for the active theme's actors.
pub struct ActorPool {
    props: Vec<f32>,
    fields: usize,
    count: usize,
}

impl ActorPool {
    /// Allocate a zeroed pool of `count` records of `fields` floats each.
    ///
    /// Records are populated by the variant's spawn rule immediately after
    /// allocation; a zeroed record is never stepped.
    pub fn new(count: usize, fields: usize) -> Self {
        Self {
            props: vec![0.0; count * fields],
            fields,
            count,
        }
    }

    /// Number of records.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// `f32` fields per record.
    #[inline]
    pub fn fields(&self) -> usize {
        self.fields
    }

    /// Total flat length, `count * fields`.
    #[inline]
    pub fn flat_len(&self) -> usize {
        self.props.len()
    }

    /// View the pool as typed records.
    ///
    /// Panics if `R` does not match the pool's record width; mixing up
    /// record types is a programmer error, not a runtime condition.
    pub fn records<R: Pod>(&self) -> &[R] {
        assert_eq!(
            std::mem::size_of::<R>(),
            self.fields * std::mem::size_of::<f32>(),
            "record type width does not match pool layout",
        );
        bytemuck::cast_slice(&self.props)
    }

    /// Mutable typed view of the pool. Same width check as [`records`](Self::records).
    pub fn records_mut<R: Pod>(&mut self) -> &mut [R] {
        assert_eq!(
            std::mem::size_of::<R>(),
            self.fields * std::mem::size_of::<f32>(),
            "record type width does not match pool layout",
        );
        bytemuck::cast_slice_mut(&mut self.props)
    }

    /// Copy out one record. Panics on an out-of-range index.
    pub fn record<R: Pod>(&self, index: usize) -> R {
        self.records::<R>()[index]
    }

    /// Overwrite one record. Panics on an out-of-range index.
    pub fn set_record<R: Pod>(&mut self, index: usize, record: R) {
        self.records_mut::<R>()[index] = record;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_widths_match_layouts() {
        assert_eq!(std::mem::size_of::<HaloRecord>(), 9 * 4);
        assert_eq!(std::mem::size_of::<SwirlRecord>(), 9 * 4);
        assert_eq!(std::mem::size_of::<PipeRecord>(), 8 * 4);
        assert_eq!(std::mem::size_of::<RayRecord>(), 8 * 4);
    }

    #[test]
    fn test_flat_len() {
        let pool = ActorPool::new(700, 9);
        assert_eq!(pool.flat_len(), 6300);
        assert_eq!(pool.count(), 700);
        assert_eq!(pool.records::<HaloRecord>().len(), 700);
    }

    #[test]
    fn test_record_roundtrip() {
        let mut pool = ActorPool::new(30, 8);
        let rec = PipeRecord {
            x: 12.0,
            y: 34.0,
            direction: 1.5,
            speed: 0.7,
            age: 3.0,
            ttl: 250.0,
            width: 4.0,
            hue: 200.0,
        };
        pool.set_record(29, rec);
        assert_eq!(pool.record::<PipeRecord>(29), rec);
        // Neighboring record untouched.
        assert_eq!(pool.record::<PipeRecord>(28), PipeRecord::default());
    }

    #[test]
    #[should_panic(expected = "record type width")]
    fn test_wrong_record_type_panics() {
        let pool = ActorPool::new(30, 8);
        let _ = pool.records::<HaloRecord>();
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        let pool = ActorPool::new(10, 9);
        let _ = pool.record::<HaloRecord>(10);
    }
}
