// ==========================================
// 柜内接线导入系统 - 节点角色判定
// ==========================================
// 有序判定:
//   1. 设备名以 'A' 开头        → PLC
//   2. 位置以柜内前缀开头        → 柜内
//   3. 其他                     → 现场
// ==========================================

use crate::domain::{DeviceIdentifier, VertexRole};

/// 缺省柜内位置前缀
pub const DEFAULT_PANEL_LOCATION_PREFIX: &str = "K1.";

#[derive(Debug, Clone)]
pub struct VertexClassifier {
    panel_location_prefix: String,
}

impl VertexClassifier {
    pub fn new(panel_location_prefix: &str) -> Self {
        Self {
            panel_location_prefix: panel_location_prefix.to_string(),
        }
    }

    pub fn classify(&self, id: &DeviceIdentifier) -> VertexRole {
        if id.device.starts_with('A') {
            VertexRole::Plc
        } else if !self.panel_location_prefix.is_empty()
            && id.location.starts_with(&self.panel_location_prefix)
        {
            VertexRole::Panel
        } else {
            VertexRole::Field
        }
    }
}

impl Default for VertexClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL_LOCATION_PREFIX)
    }
}
