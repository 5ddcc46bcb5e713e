use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::driver::DriverArray;
use crate::error::BridgeError;
use crate::marshal;
use crate::value::DynValue;

struct Inner {
    handle: Arc<dyn DriverArray>,
    len: OnceLock<usize>,
}

/// A native SQL array adapted to a 0-based indexable sequence.
///
/// Element access re-enters the driver on every call; nothing is cached
/// except the length, which is immutable for a given array resource.
/// Cloning shares the underlying resource.
#[derive(Clone)]
pub struct SqlArray {
    inner: Arc<Inner>,
}

impl SqlArray {
    pub(crate) fn new(handle: Arc<dyn DriverArray>) -> Self {
        Self {
            inner: Arc::new(Inner {
                handle,
                len: OnceLock::new(),
            }),
        }
    }

    /// Fetch the element at 0-based `index`.
    ///
    /// The native fetch is 1-based; the translation happens here, at the
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::IndexError` if `index` is out of range, or any
    /// error the native fetch raises.
    pub fn get(&self, index: usize) -> Result<DynValue, BridgeError> {
        match self.inner.handle.element(index + 1)? {
            Some(value) => Ok(marshal::to_dyn(value)),
            None => Err(BridgeError::IndexError { index }),
        }
    }

    /// Number of elements. The first call fetches the full array once;
    /// the result is cached afterwards.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the native fetch fails.
    pub fn len(&self) -> Result<usize, BridgeError> {
        if let Some(n) = self.inner.len.get() {
            return Ok(*n);
        }
        let n = self.inner.handle.fetch_all()?.len();
        Ok(*self.inner.len.get_or_init(|| n))
    }

    /// Whether the array has no elements.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the native fetch fails.
    pub fn is_empty(&self) -> Result<bool, BridgeError> {
        Ok(self.len()? == 0)
    }

    /// Materialize every element as a dynamic value.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the native fetch fails.
    pub fn to_vec(&self) -> Result<Vec<DynValue>, BridgeError> {
        Ok(self
            .inner
            .handle
            .fetch_all()?
            .into_iter()
            .map(marshal::to_dyn)
            .collect())
    }

    pub(crate) fn native_handle(&self) -> Arc<dyn DriverArray> {
        Arc::clone(&self.inner.handle)
    }
}

impl fmt::Debug for SqlArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.len.get() {
            Some(n) => write!(f, "SqlArray(len={n})"),
            None => write!(f, "SqlArray(..)"),
        }
    }
}

impl PartialEq for SqlArray {
    /// Arrays compare by resource identity, not by contents.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner.handle, &other.inner.handle)
    }
}
