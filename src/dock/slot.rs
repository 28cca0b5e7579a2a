use crate::common::config::DockOrder;
use crate::dock::config::DockPosition;
use crate::model::WindowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockSlot {
    pub position: DockPosition,
    pub order: u8,
    pub window: Option<WindowId>,
}

impl DockSlot {
    pub fn new(position: DockPosition, order: u8) -> Self { Self { position, order, window: None } }

    /// Enabled slots in processing order.
    pub fn from_order(order: &DockOrder) -> Vec<DockSlot> {
        let mut slots: Vec<_> = [
            (DockPosition::Left, order.left),
            (DockPosition::Top, order.top),
            (DockPosition::Right, order.right),
            (DockPosition::Bottom, order.bottom),
        ]
        .into_iter()
        .filter(|&(_, order)| order > 0)
        .map(|(position, order)| DockSlot::new(position, order))
        .collect();
        slots.sort_by_key(|slot| slot.order);
        slots
    }
}
