//! Weight functions for [`CdfTree`](crate::CdfTree).
//!
//! A weigher maps every key to a non-negative contribution; the tree keeps the
//! sum of these contributions per subtree so that the cumulative weight below
//! any key can be read off in O(log n).

use num_traits::ToPrimitive;

use crate::Error;

/// The weight capability of a [`CdfTree`](crate::CdfTree).
///
/// Weights must be finite and non-negative. The tree checks every weight when a
/// key is inserted and refuses the key with [`Error::InvalidWeight`] otherwise,
/// so a weigher may return NaN to signal a key it cannot weigh.
///
/// Any `Fn(&K) -> f64` closure is a weigher.
pub trait Weigher<K: ?Sized> {
    /// Returns the weight of `key`.
    fn weight(&self, key: &K) -> f64;
}

/// Every key weighs 1, which turns ranks into plain order statistics.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Uniform;

impl<K: ?Sized> Weigher<K> for Uniform {
    #[inline]
    fn weight(&self, _key: &K) -> f64 {
        1.0
    }
}

/// Power-law weights, `w(x) = x^p`.
///
/// Keys are converted with [`ToPrimitive::to_f64`]. A key that cannot be
/// converted, or whose power is not a finite non-negative real (for example a
/// negative key raised to a fractional or odd exponent), weighs NaN and is
/// rejected by the tree.
///
/// # Examples
///
/// ```
/// use cdf_tree::{CdfTree, Power};
///
/// let mut tree = CdfTree::new(Power::new(2.0).unwrap());
/// tree.insert(1, ()).unwrap();
/// tree.insert(2, ()).unwrap();
/// let three = tree.insert(3, ()).unwrap();
///
/// assert_eq!(tree.rank(three), Ok(5.0));
/// assert!(tree.insert(-2, ()).is_ok());
/// assert!(CdfTree::new(Power::new(0.5).unwrap()).insert(-4, ()).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Power {
    exponent: f64,
}

impl Power {
    /// Creates a power-law weigher with exponent `exponent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExponent`] if `exponent` is NaN or infinite.
    pub fn new(exponent: f64) -> Result<Self, Error> {
        if exponent.is_finite() {
            Ok(Self { exponent })
        } else {
            Err(Error::InvalidExponent(exponent))
        }
    }

    /// Returns the exponent.
    #[must_use]
    pub const fn exponent(&self) -> f64 {
        self.exponent
    }
}

impl<K: ToPrimitive> Weigher<K> for Power {
    fn weight(&self, key: &K) -> f64 {
        match key.to_f64() {
            Some(x) => {
                let w = x.powf(self.exponent);
                // powf happily returns negative powers of negative bases.
                if w < 0.0 { f64::NAN } else { w }
            }
            None => f64::NAN,
        }
    }
}

impl<K: ?Sized, F> Weigher<K> for F
where
    F: Fn(&K) -> f64,
{
    #[inline]
    fn weight(&self, key: &K) -> f64 {
        self(key)
    }
}

/// Returns true if `weight` can be folded into an aggregate.
#[inline]
pub(crate) fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}
