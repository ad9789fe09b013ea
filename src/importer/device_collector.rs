// ==========================================
// 柜内接线导入系统 - 设备端子累积
// ==========================================
// 单遍扫描所有行:
//   - source / target 标签各解析一次，按 device_key 累积端子
//   - 两端齐全的行产生一条跨设备接线（PE / N 端子除外）
// 设备的端子集合要到整份文件扫描完才确定，之后才能计算指纹
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{DeviceIdentifier, DeviceRecord, ExternalWire};
use crate::engine::{is_cross_device_eligible, parse, VertexClassifier};
use crate::importer::wiring_importer_trait::RawRecord;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// 累积统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub total_rows: usize,
    pub rows_without_tags: usize,
    pub wires_skipped_protective: usize,
}

pub struct DeviceCollector {
    project_number: String,
    source_column: String,
    target_column: String,
    wire_number_column: String,
    classifier: VertexClassifier,
    devices: BTreeMap<String, DeviceRecord>,
    wires: Vec<ExternalWire>,
    stats: CollectStats,
}

impl DeviceCollector {
    pub fn new(project_number: &str, config: &ImportConfig) -> Self {
        Self {
            project_number: project_number.to_string(),
            source_column: config.source_column.clone(),
            target_column: config.target_column.clone(),
            wire_number_column: config.wire_number_column.clone(),
            classifier: VertexClassifier::new(&config.panel_location_prefix),
            devices: BTreeMap::new(),
            wires: Vec::new(),
            stats: CollectStats::default(),
        }
    }

    /// 记录一个端点，返回解析结果（设备段为空时返回 None）
    fn observe_endpoint(&mut self, tag: &str) -> Option<DeviceIdentifier> {
        let id = parse(tag);
        if !id.has_device() {
            debug!(tag, "标签缺少设备段，忽略");
            return None;
        }

        let key = id.device_key();
        let role = self.classifier.classify(&id);
        let project_number = &self.project_number;
        let record = self
            .devices
            .entry(key)
            .or_insert_with(|| DeviceRecord::from_identifier(&id, project_number, role));
        record.observe_terminal(&id.terminal);
        Some(id)
    }

    /// 处理一行
    pub fn observe_row(&mut self, row: &RawRecord) {
        self.stats.total_rows += 1;

        let source_tag = row.non_empty(&self.source_column).map(str::to_string);
        let target_tag = row.non_empty(&self.target_column).map(str::to_string);

        if source_tag.is_none() && target_tag.is_none() {
            self.stats.rows_without_tags += 1;
            trace!(row = row.row_number, "行缺少 source/target，跳过");
            return;
        }

        let source = source_tag.as_deref().and_then(|t| self.observe_endpoint(t));
        let target = target_tag.as_deref().and_then(|t| self.observe_endpoint(t));

        let (Some(source), Some(target)) = (source, target) else {
            return;
        };

        if !is_cross_device_eligible(&source.terminal, &target.terminal) {
            self.stats.wires_skipped_protective += 1;
            debug!(
                row = row.row_number,
                source = %source.raw,
                target = %target.raw,
                "跳过 PE/N 接线"
            );
            return;
        }

        self.wires.push(ExternalWire {
            row_number: row.row_number,
            wire_number: row.non_empty(&self.wire_number_column).map(str::to_string),
            source_tag: source.raw.trim().to_string(),
            target_tag: target.raw.trim().to_string(),
            source_device_key: source.device_key(),
            source_terminal: source.terminal,
            target_device_key: target.device_key(),
            target_terminal: target.terminal,
        });
    }

    pub fn observe_rows<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        for row in rows {
            self.observe_row(row);
        }
    }

    pub fn stats(&self) -> &CollectStats {
        &self.stats
    }

    /// 结束扫描，交出设备表、接线与统计
    pub fn finish(self) -> (BTreeMap<String, DeviceRecord>, Vec<ExternalWire>, CollectStats) {
        (self.devices, self.wires, self.stats)
    }
}
