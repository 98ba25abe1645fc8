//! [`ConsumptionBehavior`]: the six ways an operator evaluation can treat the
//! provider's cursor and the ownership of its result.

/// Selects whether an evaluation views or takes from the provider, whether
/// the result must be cloned onto the heap, and whether a successful match
/// discards its value entirely.
///
/// | Behavior             | Source kind | Advances cursor? | Allocation preference |
/// |-----------------------|-------------|-------------------|------------------------|
/// | [`DirectView`]        | full slice  | no                | borrow                 |
/// | [`DirectClone`]       | full slice  | no                | always clone           |
/// | [`StreamView`]        | streaming   | no                | borrow                 |
/// | [`StreamTake`]        | streaming   | yes               | borrow if possible     |
/// | [`StreamTakeClone`]   | streaming   | yes               | always clone           |
/// | [`StreamDrop`]        | streaming   | yes               | discard value          |
///
/// [`DirectView`]: ConsumptionBehavior::DirectView
/// [`DirectClone`]: ConsumptionBehavior::DirectClone
/// [`StreamView`]: ConsumptionBehavior::StreamView
/// [`StreamTake`]: ConsumptionBehavior::StreamTake
/// [`StreamTakeClone`]: ConsumptionBehavior::StreamTakeClone
/// [`StreamDrop`]: ConsumptionBehavior::StreamDrop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumptionBehavior {
    /// Borrow from a full in-memory slice; never advances a cursor.
    DirectView,
    /// Clone out of a full in-memory slice; never advances a cursor.
    DirectClone,
    /// Borrow from a streaming provider without advancing its cursor.
    StreamView,
    /// Advance a streaming provider's cursor, borrowing the result if
    /// possible.
    StreamTake,
    /// Advance a streaming provider's cursor, always cloning the result.
    StreamTakeClone,
    /// Advance a streaming provider's cursor and discard the matched value.
    StreamDrop,
}

impl ConsumptionBehavior {
    /// `true` for the two variants that advance the provider's cursor on
    /// success: [`StreamTake`](Self::StreamTake),
    /// [`StreamTakeClone`](Self::StreamTakeClone), and
    /// [`StreamDrop`](Self::StreamDrop).
    #[must_use]
    pub const fn can_take(self) -> bool {
        matches!(self, Self::StreamTake | Self::StreamTakeClone | Self::StreamDrop)
    }

    /// `true` when the result must always be a heap-backed clone, regardless
    /// of whether it could have borrowed the source.
    #[must_use]
    pub const fn always_allocates(self) -> bool {
        matches!(self, Self::DirectClone | Self::StreamTakeClone)
    }

    /// `true` for [`StreamDrop`](Self::StreamDrop), whose matched value is
    /// discarded rather than returned.
    #[must_use]
    pub const fn discards(self) -> bool {
        matches!(self, Self::StreamDrop)
    }

    /// Projects this behavior to its non-consuming twin.
    ///
    /// Used when evaluating a filter sub-operator (see
    /// [`filter_read`](crate::eval::filter_read)), which must never advance
    /// the cursor even when the outer evaluation does.
    #[must_use]
    pub const fn as_view(self) -> Self {
        match self {
            Self::DirectView | Self::DirectClone => Self::DirectView,
            Self::StreamView | Self::StreamTake | Self::StreamTakeClone | Self::StreamDrop => {
                Self::StreamView
            }
        }
    }

    /// `true` for the two "direct" variants backed by a full in-memory
    /// slice rather than a streaming reader.
    #[must_use]
    pub const fn is_direct(self) -> bool {
        matches!(self, Self::DirectView | Self::DirectClone)
    }
}
