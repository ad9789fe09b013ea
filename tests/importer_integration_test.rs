// ==========================================
// 接线导入集成测试
// ==========================================
// 测试目标: 文件 → 设备库/类型库/接线 全流程
// ==========================================


use panel_wiring::domain::ConnectionKind;
use panel_wiring::importer::{ImportError, WiringImporter};
use panel_wiring::logging;
use panel_wiring::repository::{DeviceStore, TypeStore};
use tempfile::tempdir;

const RELAY_ROWS: [&str; 8] = [
    "=F+K1.2-K5:A1,=F+K1.2-X1:1,W1",
    "=F+K1.2-K5:A2,=F+K1.2-X1:2,W2",
    "=F+K1.2-K5:13,=F+K1.2-K6:13,W3",
    "=F+K1.2-K5:14,=F+K1.2-K6:14,W4",
    "=F+K1.2-K6:A1,=F+K1.2-X1:3,W5",
    "=F+K1.2-K6:A2,=F+K1.2-X1:PE,W6",
    "=F+K1.2-K7:1,,W7",
    ",,W8",
];

#[tokio::test]
async fn test_import_pipeline_report() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let rules_path = dir.path().join("rules.json");
    test_helpers::standard_catalog().save(&rules_path).unwrap();

    let importer = test_helpers::create_test_importer(&db_path, &rules_path);
    let csv = test_helpers::write_wiring_csv(dir.path(), "wiring.csv", &RELAY_ROWS);

    let report = importer.import_file(&csv).await.unwrap();

    assert_eq!(report.total_rows, 8);
    assert_eq!(report.rows_without_tags, 1);
    assert_eq!(report.devices_seen, 4);
    assert_eq!(report.devices_excluded, 1, "K7 只有一个端子");
    assert_eq!(report.types_created, 2);
    assert_eq!(report.types_reused, 1);
    assert_eq!(report.connections_inferred, 2);
    assert_eq!(report.wires_recorded, 5);
    assert_eq!(report.wires_skipped_protective, 1);
    assert!(!report.rules_bootstrapped);
    let phases: Vec<&str> = report.phases.iter().map(|p| p.phase.as_str()).collect();
    assert_eq!(
        phases,
        vec![
            "import.parse",
            "import.collect",
            "import.resolve_types",
            "import.infer",
            "import.persist"
        ]
    );

    // K5 / K6 端子形状一致 → 同一类型
    let k5 = importer.device_store().get("=F+K1.2-K5").unwrap().unwrap();
    let k6 = importer.device_store().get("=F+K1.2-K6").unwrap().unwrap();
    assert!(k5.type_label.is_some());
    assert_eq!(k5.type_label, k6.type_label);
    assert_eq!(k6.inner_connections.len(), 2);
    assert_eq!(k6.inner_connections[0].terminal_a, "13");
    assert_eq!(k6.inner_connections[1].classification, ConnectionKind::CoilConnection);

    // PE 端子不产生接线，但仍属于 X1 的端子集合
    let x1 = importer.device_store().get("=F+K1.2-X1").unwrap().unwrap();
    assert!(x1.terminals.contains("PE"));
    assert!(x1.inner_connections.is_empty());

    assert!(importer.device_store().get("=F+K1.2-K7").unwrap().is_none());

    let types = importer.type_store().list().unwrap();
    assert_eq!(types.len(), 2);
    let relay_type = importer
        .type_store()
        .find_by_label(k5.type_label.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(relay_type.fingerprint, r#"["13","14","A1","A2"]"#);
    assert_eq!(relay_type.terminal_count, 4);
    assert_eq!(relay_type.inner_connections, k5.inner_connections);
}

#[tokio::test]
async fn test_reimport_reuses_types_and_merges_terminals() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let rules_path = dir.path().join("rules.json");
    test_helpers::standard_catalog().save(&rules_path).unwrap();
    let importer = test_helpers::create_test_importer(&db_path, &rules_path);

    let first = test_helpers::write_wiring_csv(
        dir.path(),
        "first.csv",
        &["=F+K1.2-K8:A1,=F+K1.2-X2:1,W1", "=F+K1.2-K8:A2,=F+K1.2-X2:2,W2"],
    );
    let report = importer.import_file(&first).await.unwrap();
    assert_eq!(report.types_created, 2);

    // 同一文件再导一次：类型全部复用，接线不重复
    let again = importer.import_file(&first).await.unwrap();
    assert_eq!(again.types_created, 0);
    assert_eq!(again.types_reused, 2);
    assert_eq!(importer.wire_repo().count().unwrap(), 2);

    // 新文件补充端子：与已存端子合并后形成新类型
    let second = test_helpers::write_wiring_csv(
        dir.path(),
        "second.csv",
        &["=F+K1.2-K8:13,=F+K1.2-X2:3,W3"],
    );
    let report = importer.import_file(&second).await.unwrap();
    assert_eq!(report.devices_excluded, 0);
    assert_eq!(report.types_created, 2);

    let k8 = importer.device_store().get("=F+K1.2-K8").unwrap().unwrap();
    let terminals: Vec<&str> = k8.terminals.iter().map(String::as_str).collect();
    assert_eq!(terminals, vec!["13", "A1", "A2"]);
    assert_eq!(importer.type_store().list().unwrap().len(), 4);
}

#[tokio::test]
async fn test_import_batch_is_logged() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let rules_path = dir.path().join("rules.json");
    test_helpers::standard_catalog().save(&rules_path).unwrap();
    let importer = test_helpers::create_test_importer(&db_path, &rules_path);
    let csv = test_helpers::write_wiring_csv(dir.path(), "wiring.csv", &RELAY_ROWS);

    let report = importer.import_file(&csv).await.unwrap();

    let batch = importer
        .batch_repo()
        .find_by_id(&report.batch_id)
        .unwrap()
        .expect("批次记录应存在");
    assert_eq!(batch.project_number, test_helpers::TEST_PROJECT);
    assert!(batch.finished_at.is_some());
    let stored: panel_wiring::ImportReport =
        serde_json::from_str(batch.report_json.as_deref().unwrap()).unwrap();
    assert_eq!(stored, report);
}

#[tokio::test]
async fn test_missing_catalog_bootstraps_then_reinfer() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let rules_path = dir.path().join("rules").join("rules_type_conn.json");
    let importer = test_helpers::create_test_importer(&db_path, &rules_path);
    let csv = test_helpers::write_wiring_csv(dir.path(), "wiring.csv", &RELAY_ROWS);

    let report = importer.import_file(&csv).await.unwrap();
    assert!(report.rules_bootstrapped);
    assert_eq!(report.connections_inferred, 0);
    assert!(rules_path.exists());

    let k5 = importer.device_store().get("=F+K1.2-K5").unwrap().unwrap();
    assert!(k5.inner_connections.is_empty(), "自举的这次不推断");

    // 自举目录: A1-A2 线圈 + 13-14 触点组
    let total = importer.reapply_rules().unwrap();
    assert_eq!(total, 2);
    let k5 = importer.device_store().get("=F+K1.2-K5").unwrap().unwrap();
    assert_eq!(k5.inner_connections.len(), 2);
    assert!(k5
        .inner_connections
        .iter()
        .any(|c| c.classification == ConnectionKind::ContactConnection));
}

#[tokio::test]
async fn test_reinfer_without_catalog_fails() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let importer = test_helpers::create_test_importer(&db_path, &dir.path().join("absent.json"));

    let err = importer.reapply_rules().unwrap_err();
    assert!(matches!(err, ImportError::RuleCatalogMissing(_)));
}

#[tokio::test]
async fn test_unsupported_file_is_rejected() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let importer = test_helpers::create_test_importer(&db_path, &dir.path().join("rules.json"));
    let path = dir.path().join("wiring.txt");
    std::fs::write(&path, "source,target\n").unwrap();

    let err = importer.import_file(&path).await.unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

#[tokio::test]
async fn test_new_catalog_updates_earlier_devices_of_same_type() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let rules_path = dir.path().join("rules.json");
    test_helpers::standard_catalog().save(&rules_path).unwrap();
    let importer = test_helpers::create_test_importer(&db_path, &rules_path);

    let first = test_helpers::write_wiring_csv(
        dir.path(),
        "a.csv",
        &["=F+L-K1:A1,=F+L-X1:1,W1", "=F+L-K1:A2,=F+L-X1:2,W2"],
    );
    importer.import_file(&first).await.unwrap();

    // 改写目录描述后导入同形状的新设备
    let mut catalog = test_helpers::standard_catalog();
    catalog.rules[0].description = "coil v2".to_string();
    catalog.save(&rules_path).unwrap();
    let second = test_helpers::write_wiring_csv(
        dir.path(),
        "b.csv",
        &["=F+L-K2:A1,=F+L-X2:1,W3", "=F+L-K2:A2,=F+L-X2:2,W4"],
    );
    let report = importer.import_file(&second).await.unwrap();
    assert_eq!(report.types_reused, 2);

    let k1 = importer.device_store().get("=F+L-K1").unwrap().unwrap();
    let k2 = importer.device_store().get("=F+L-K2").unwrap().unwrap();
    assert_eq!(k1.type_label, k2.type_label);
    assert_eq!(k1.inner_connections[0].description, "coil v2");
    assert_eq!(k1.inner_connections, k2.inner_connections);

    let relay_type = importer
        .type_store()
        .find_by_label(k1.type_label.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(relay_type.inner_connections, k1.inner_connections);
}

#[tokio::test]
async fn test_import_survives_non_utf8_cell() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let rules_path = dir.path().join("rules.json");
    test_helpers::standard_catalog().save(&rules_path).unwrap();
    let importer = test_helpers::create_test_importer(&db_path, &rules_path);

    let path = dir.path().join("latin1.csv");
    let mut content = format!("{}\n", test_helpers::CSV_HEADER).into_bytes();
    content.extend_from_slice(b"=F+L-K1:A1,=F+L-X1:1,W1\n");
    content.extend_from_slice(b"=F+L-K1:A2,=F+L-X1:2,W\xe42\n");
    content.extend_from_slice(b"=F+L-K1:13,=F+L-X1:3,W3\n");
    std::fs::write(&path, content).unwrap();

    let report = importer.import_file(&path).await.unwrap();
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.wires_recorded, 3);

    let k1 = importer.device_store().get("=F+L-K1").unwrap().unwrap();
    let terminals: Vec<&str> = k1.terminals.iter().map(String::as_str).collect();
    assert_eq!(terminals, vec!["13", "A1", "A2"]);
}
