//! Flat message buffers with a sequential cursor.

use eddy_core::Real;

/// A fixed-length buffer of one face's ghost values.
///
/// Sized once from a [`FacePlan`](crate::FacePlan) and reused by every
/// exchange. Packing and unpacking advance a cursor; a cursor that does
/// not end exactly at [`len`](Self::len) means the producer and the plan
/// disagree. Out-of-range pushes are counted but not stored, so the
/// mismatch surfaces as an error rather than a panic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GhostBuffer {
    data: Vec<Real>,
    cursor: usize,
}

impl GhostBuffer {
    /// A zeroed buffer of `len` values.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
            cursor: 0,
        }
    }

    /// Buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values pushed or taken since the last [`rewind`](Self::rewind).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor back to the start.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Store `value` at the cursor and advance.
    #[inline]
    pub fn push(&mut self, value: Real) {
        if let Some(slot) = self.data.get_mut(self.cursor) {
            *slot = value;
        }
        self.cursor += 1;
    }

    /// The value at the cursor, advancing past it.
    #[inline]
    pub fn take(&mut self) -> Option<Real> {
        let value = self.data.get(self.cursor).copied();
        self.cursor += 1;
        value
    }

    /// Buffer contents.
    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }

    /// Buffer contents, mutably; the receive target of a transfer.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data
    }
}
