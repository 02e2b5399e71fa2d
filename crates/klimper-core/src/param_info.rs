//! Parameter introspection for control surfaces.
//!
//! A control surface (rotary encoder menu, CLI, GUI) discovers what it can
//! adjust through the [`ParameterInfo`] trait. Each parameter is described by a
//! [`ParamDescriptor`] carrying its display names, range, default and the
//! increment applied per encoder detent.
//!
//! Parameters live in atomic cells (see [`AtomicParam`](crate::AtomicParam)),
//! so setters take `&self` and may be called from a control thread while the
//! audio thread reads the same values.
//!
//! # Example
//!
//! ```rust
//! use klimper_core::{AtomicParam, ParamDescriptor, ParameterInfo};
//!
//! struct Gain {
//!     level: AtomicParam,
//! }
//!
//! impl ParameterInfo for Gain {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         (index == 0).then(|| *self.level.descriptor())
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         if index == 0 { self.level.get() } else { 0.0 }
//!     }
//!
//!     fn set_param(&self, index: usize, value: f32) {
//!         if index == 0 { self.level.set(value) }
//!     }
//! }
//!
//! let gain = Gain { level: AtomicParam::new(ParamDescriptor::level("Volume", "Vol", 0.2)) };
//! gain.step_param(0, 3);
//! assert!((gain.get_param(0) - 0.23).abs() < 1e-6);
//! ```

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Seconds, for envelope segment times.
    Seconds,
    /// Hertz, for modulation rates.
    Hertz,
    /// Beats per minute.
    Bpm,
    /// Linear level in `[0, 1]`.
    Level,
    /// No unit.
    #[default]
    None,
}

impl ParamUnit {
    /// Suffix appended to formatted values.
    ///
    /// ```rust
    /// use klimper_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Seconds.suffix(), " s");
    /// assert_eq!(ParamUnit::Level.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Seconds => " s",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Bpm => " bpm",
            ParamUnit::Level | ParamUnit::None => "",
        }
    }
}

/// Describes a single parameter's metadata for display and validation.
///
/// `short_name` should stay within 8 characters so it fits a 16x2 character
/// display next to its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name (e.g. "Attack").
    pub name: &'static str,
    /// Short name for character displays, max 8 characters.
    pub short_name: &'static str,
    /// Unit used when formatting the value.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value at startup.
    pub default: f32,
    /// Increment applied per encoder detent.
    pub step: f32,
}

impl ParamDescriptor {
    /// Level parameter in `[0, 1]` with a 0.01 step.
    pub const fn level(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Level,
            min: 0.0,
            max: 1.0,
            default,
            step: 0.01,
        }
    }

    /// Envelope time in seconds, 1 ms to 10 s, 10 ms step.
    pub const fn seconds(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Seconds,
            min: 0.001,
            max: 10.0,
            default,
            step: 0.01,
        }
    }

    /// Parameter with a custom range and unit.
    pub const fn custom(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
        step: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            step,
        }
    }

    /// Clamps `value` into `[min, max]`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Moves `value` by `steps` increments and clamps the result.
    #[inline]
    pub fn step_by(&self, value: f32, steps: i32) -> f32 {
        self.clamp(value + steps as f32 * self.step)
    }

    /// Converts a plain value to `[0, 1]`.
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }
}

/// Trait for components that expose adjustable parameters.
///
/// Indices are zero-based and stable for the lifetime of the implementor.
pub trait ParameterInfo {
    /// Number of parameters. Valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Descriptor for `index`, or `None` when out of range.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of `index`; `0.0` when out of range.
    fn get_param(&self, index: usize) -> f32;

    /// Sets `index` to `value`, clamped to its range. Out-of-range indices are ignored.
    fn set_param(&self, index: usize, value: f32);

    /// Applies `steps` encoder detents to `index` (negative steps decrease).
    fn step_param(&self, index: usize, steps: i32) {
        if let Some(desc) = self.param_info(index) {
            self.set_param(index, desc.step_by(self.get_param(index), steps));
        }
    }

    /// Finds a parameter by full or short name, ignoring ASCII case.
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|desc| {
                desc.name.eq_ignore_ascii_case(name) || desc.short_name.eq_ignore_ascii_case(name)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_by_clamps_at_bounds() {
        let desc = ParamDescriptor::level("Volume", "Vol", 0.5);
        assert_eq!(desc.step_by(0.99, 5), 1.0);
        assert_eq!(desc.step_by(0.02, -10), 0.0);
        assert!((desc.step_by(0.5, 2) - 0.52).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let desc = ParamDescriptor::custom("Tempo", "BPM", ParamUnit::Bpm, 20.0, 300.0, 80.0, 1.0);
        assert_eq!(desc.normalize(20.0), 0.0);
        assert_eq!(desc.normalize(300.0), 1.0);
        assert_eq!(desc.normalize(1000.0), 1.0);
        assert!((desc.normalize(160.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_short_names_fit_display() {
        let descs = [
            ParamDescriptor::level("Sustain", "Sustain", 0.5),
            ParamDescriptor::seconds("Release", "Release", 0.5),
        ];
        for desc in descs {
            assert!(desc.short_name.len() <= 8, "{} too long", desc.short_name);
        }
    }
}
