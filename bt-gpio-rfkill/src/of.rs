//! Device-tree match table.

/// One `compatible` string the driver binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfDeviceId {
    /// Value of the node's `compatible` property.
    pub compatible: &'static str,
}

impl OfDeviceId {
    /// Creates a match entry.
    pub const fn new(compatible: &'static str) -> Self {
        Self { compatible }
    }
}

/// Nodes this driver attaches to.
///
/// `rockchip,vpu_service` is the video codec's compatible; boards that reuse it
/// for the Bluetooth node bind here. Append an entry for any other chip.
pub const OF_MATCH_TABLE: &[OfDeviceId] = &[OfDeviceId::new("rockchip,vpu_service")];

/// Finds the entry of `table` matching a device with the given compatibles.
///
/// The device lists its compatibles most specific first, so they are tried in
/// that order.
pub fn match_device<'t>(table: &'t [OfDeviceId], compatible: &[&str]) -> Option<&'t OfDeviceId> {
    compatible
        .iter()
        .find_map(|wanted| table.iter().find(|id| id.compatible == *wanted))
}
