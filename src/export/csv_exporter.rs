// ==========================================
// 柜内接线导入系统 - CSV 图数据导出
// ==========================================
// 输出（均带表头，一行一个节点/边）:
//   devices.csv / terminals.csv / types.csv / inner_connections.csv / wires.csv
// 供图数据库批量加载工具使用
// ==========================================

use crate::export::error::{ExportError, ExportResult};
use crate::export::graph_exporter::{terminal_node_id, ExportSummary, GraphExporter, GraphSnapshot};
use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEVICES_FILE: &str = "devices.csv";
pub const TERMINALS_FILE: &str = "terminals.csv";
pub const TYPES_FILE: &str = "types.csv";
pub const INNER_CONNECTIONS_FILE: &str = "inner_connections.csv";
pub const WIRES_FILE: &str = "wires.csv";

const DEVICES_HEADER: [&str; 8] = [
    "device_key",
    "project_number",
    "function",
    "location",
    "device",
    "role",
    "type_label",
    "terminal_count",
];
const TERMINALS_HEADER: [&str; 3] = ["terminal_id", "device_key", "terminal"];
const TYPES_HEADER: [&str; 5] = [
    "type_label",
    "fingerprint",
    "terminal_count",
    "connection_count",
    "created_at",
];
const INNER_CONNECTIONS_HEADER: [&str; 5] = [
    "source_terminal_id",
    "target_terminal_id",
    "device_key",
    "classification",
    "description",
];
const WIRES_HEADER: [&str; 6] = [
    "wire_number",
    "source_terminal_id",
    "target_terminal_id",
    "source_tag",
    "target_tag",
    "row_number",
];

#[derive(Debug, Clone)]
pub struct CsvGraphExporter {
    output_dir: PathBuf,
}

impl CsvGraphExporter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn writer(&self, file_name: &str) -> ExportResult<(Writer<File>, String)> {
        let path = self.output_dir.join(file_name);
        let path_str = path.display().to_string();
        let file = File::create(&path).map_err(|e| ExportError::Write {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        Ok((Writer::from_writer(file), path_str))
    }

    /// 写出一个文件：表头 + 行
    fn write_file<I>(&self, file_name: &str, header: &[&str], rows: I) -> ExportResult<usize>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let (mut wtr, path) = self.writer(file_name)?;
        let to_err = |e: csv::Error| ExportError::Write {
            path: path.clone(),
            message: e.to_string(),
        };

        wtr.write_record(header).map_err(to_err)?;
        let mut count = 0;
        for row in rows {
            wtr.write_record(&row).map_err(to_err)?;
            count += 1;
        }
        wtr.flush().map_err(|e| ExportError::Write {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(count)
    }
}

impl GraphExporter for CsvGraphExporter {
    fn export(&self, snapshot: &GraphSnapshot) -> ExportResult<ExportSummary> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ExportError::OutputDir {
            path: self.output_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let devices = self.write_file(
            DEVICES_FILE,
            &DEVICES_HEADER,
            snapshot.devices.iter().map(|d| {
                vec![
                    d.device_key.clone(),
                    d.project_number.clone(),
                    d.function.clone(),
                    d.location.clone(),
                    d.device.clone(),
                    d.role.as_str().to_string(),
                    d.type_label.clone().unwrap_or_default(),
                    d.terminals.len().to_string(),
                ]
            }),
        )?;

        let terminals = self.write_file(
            TERMINALS_FILE,
            &TERMINALS_HEADER,
            snapshot.devices.iter().flat_map(|d| {
                d.terminals.iter().map(move |t| {
                    vec![terminal_node_id(&d.device_key, t), d.device_key.clone(), t.clone()]
                })
            }),
        )?;

        let types = self.write_file(
            TYPES_FILE,
            &TYPES_HEADER,
            snapshot.types.iter().map(|t| {
                vec![
                    t.type_label.clone(),
                    t.fingerprint.clone(),
                    t.terminal_count.to_string(),
                    t.inner_connections.len().to_string(),
                    t.created_at.to_rfc3339(),
                ]
            }),
        )?;

        let inner_connections = self.write_file(
            INNER_CONNECTIONS_FILE,
            &INNER_CONNECTIONS_HEADER,
            snapshot.devices.iter().flat_map(|d| {
                d.inner_connections.iter().map(move |c| {
                    vec![
                        terminal_node_id(&d.device_key, &c.terminal_a),
                        terminal_node_id(&d.device_key, &c.terminal_b),
                        d.device_key.clone(),
                        c.classification.as_str().to_string(),
                        c.description.clone(),
                    ]
                })
            }),
        )?;

        let wires = self.write_file(
            WIRES_FILE,
            &WIRES_HEADER,
            snapshot.wires.iter().map(|w| {
                vec![
                    w.wire_number.clone().unwrap_or_default(),
                    terminal_node_id(&w.source_device_key, &w.source_terminal),
                    terminal_node_id(&w.target_device_key, &w.target_terminal),
                    w.source_tag.clone(),
                    w.target_tag.clone(),
                    w.row_number.to_string(),
                ]
            }),
        )?;

        let summary = ExportSummary {
            devices,
            terminals,
            types,
            inner_connections,
            wires,
        };
        info!(
            output_dir = %self.output_dir.display(),
            devices = summary.devices,
            terminals = summary.terminals,
            types = summary.types,
            inner_connections = summary.inner_connections,
            wires = summary.wires,
            "图数据导出完成"
        );
        Ok(summary)
    }
}
