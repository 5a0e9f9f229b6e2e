/// The seven states an [`crate::Sm`] can occupy.
///
/// The non-barrier in-flight count is always zero in `Created`,
/// `Opening`, `OpenedBarrier` and `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Opening,
    Opened,
    OpenedDrainingToBarrier,
    OpenedDrainingToClose,
    OpenedBarrier,
    Closing,
}
