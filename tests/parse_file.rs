use std::io::{Cursor, Write};

use approx::assert_relative_eq;
use candbc_parser::{
    ByteOrder, CollectingObserver, DbcParseError, Diagnostic, EnvVarKind, MuxRole, Parser,
    PropertyValue, ValueKind, codec, dbc,
};
use tempfile::NamedTempFile;

const VEHICLE: &str = r#"VERSION "1.0"

NS_ :
	CM_
	BA_DEF_

BS_:

BU_: MCU GTW BMS

VAL_TABLE_ T 3 "Unknown" 2 "Ajar" 1 "Open" 0 "Closed" ;

BO_ 1041 DOORS_SEATBELTS: 8 MCU
 SG_ DOOR_FL : 0|2@1+ (1,0) [0|3] "" GTW
 SG_ DOOR_FR : 2|2@1+ (1,0) [0|3] "" GTW,BMS

BO_ 1043 MCU_gpsVehicleSpeed: 8 MCU
 SG_ MCU_longitude : 7|28@0- (1E-006,0) [-134.217728|134.217727] "deg" GTW

BO_ 100 MUX_MSG: 8 BMS
 SG_ Mux_1 M : 0|8@1+ (1,0) [0|255] "" GTW
 SG_ Mux_2 m3M : 8|8@1+ (1,0) [0|255] "" GTW
 SG_ Value : 16|16@1- (0.1,-40) [-40|100] "C" GTW

BO_TX_BU_ 1041 : GTW;

EV_ WakeUp: 0 [0|1] "" 0 1 DUMMY_NODE_VECTOR3 BMS;

CM_ "Vehicle network";
CM_ BU_ BMS "Battery management";
CM_ BO_ 1043 "GPS data;
sent every 100 ms";
CM_ SG_ 100 Value "Pack temperature";
BA_DEF_ BO_ "GenMsgCycleTime" INT 0 65535;
BA_DEF_ SG_ "GenSigStartValue" FLOAT 0 0;
BA_DEF_ "BusType" STRING ;
BA_DEF_DEF_ "GenMsgCycleTime" 1000;
BA_DEF_DEF_ "GenSigStartValue" 0;
BA_DEF_DEF_ "BusType" "";
BA_ "BusType" "CAN FD";
BA_ "GenMsgCycleTime" BO_ 1043 100;
BA_ "GenSigStartValue" SG_ 100 Value 600;
VAL_ 1041 DOOR_FL T ;
VAL_ 1041 DOOR_FR 1 "Open" 0 "Closed" ;
SG_MUL_VAL_ 100 Mux_2 Mux_1 3-3, 5-10;
"#;

fn dbc_file(content: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".dbc")
        .tempfile()
        .expect("create temp file");
    file.write_all(content).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[test]
fn parses_file_from_disk() {
    let file = dbc_file(VEHICLE.as_bytes());
    let mut failures = CollectingObserver::new();
    let db = Parser::new()
        .observer(&mut failures)
        .parse_path(file.path())
        .expect("parse file");
    assert!(failures.is_empty(), "{:?}", failures.failures());

    assert_eq!(db.comment(), "Vehicle network");
    assert_eq!(db.nodes().len(), 3);
    assert_eq!(db.node("BMS").unwrap().comment, "Battery management");
    assert_eq!(db.node("BMS").unwrap().environment_variables, vec!["WakeUp"]);
    assert_eq!(
        db.global_properties()["BusType"].value,
        PropertyValue::String("CAN FD".into())
    );

    // messages come out ordered by ID
    let ids: Vec<u32> = db.messages().map(|m| m.id).collect();
    assert_eq!(ids, vec![100, 1041, 1043]);

    let doors = db.message(1041).unwrap();
    assert_eq!(doors.name, "DOORS_SEATBELTS");
    assert_eq!(doors.transmitter, "MCU");
    assert_eq!(doors.additional_transmitters, vec!["GTW"]);
    assert_eq!(doors.cycle_time, Some(1000));
    let door_fl = doors.signal("DOOR_FL").unwrap();
    assert_eq!(door_fl.value_label(2), Some("Ajar"));
    assert_eq!(door_fl.value_table.len(), 4);
    let door_fr = doors.signal("DOOR_FR").unwrap();
    assert_eq!(door_fr.receivers, vec!["GTW", "BMS"]);
    assert_eq!(door_fr.value_label(1), Some("Open"));

    let gps = db.message(1043).unwrap();
    assert_eq!(gps.comment, "GPS data;\nsent every 100 ms");
    assert_eq!(gps.cycle_time, Some(100));
    let lon = gps.signal("MCU_longitude").unwrap();
    assert_eq!(lon.byte_order, ByteOrder::Motorola);
    assert_eq!(lon.value_kind, ValueKind::Signed);
    assert_relative_eq!(lon.min, -134.217728);
    assert_relative_eq!(lon.max, 134.217727);
    assert_eq!(lon.unit, "deg");

    let mux = db.message(100).unwrap();
    assert!(mux.is_multiplexed());
    assert_eq!(mux.multiplexor().unwrap().name, "Mux_1");
    let mux_2 = mux.signal("Mux_2").unwrap();
    assert_eq!(mux_2.multiplexing_info().role, MuxRole::MultiplexedMultiplexor);
    let ext = mux_2.extended_multiplexing.as_ref().unwrap();
    assert_eq!(ext.multiplexor, "Mux_1");
    assert_eq!(ext.values().collect::<Vec<_>>(), vec![3, 5, 6, 7, 8, 9, 10]);
    let value = mux.signal("Value").unwrap();
    assert_eq!(value.comment, "Pack temperature");
    assert_relative_eq!(value.initial_value.unwrap(), 20.0, epsilon = 1e-9);

    let wake = db.environment_variable("WakeUp").unwrap();
    assert_eq!(wake.kind(), EnvVarKind::Integer);
    assert_eq!(wake.nodes, vec!["BMS"]);
}

#[test]
fn decodes_signals_of_parsed_file() {
    let db = dbc::from_str(VEHICLE);

    let lon = db.message(1043).unwrap().signal("MCU_longitude").unwrap();
    // -12.345678 deg
    let frame = codec::pack(-12.345678, lon);
    assert_relative_eq!(codec::unpack(frame, lon), -12.345678);
    assert_eq!(codec::unpack_state(frame, lon), -12_345_678);

    let value = db.message(100).unwrap().signal("Value").unwrap();
    let mut payload = [0u8; 8];
    codec::pack_into(&mut payload, 21.5, value);
    assert_eq!(u16::from_le_bytes([payload[2], payload[3]]), 615);
    assert_relative_eq!(codec::unpack_bytes(&payload, value), 21.5);
}

#[test]
fn reports_problems_with_line_numbers() {
    let text = "BU_: A\nBO_ 1 M: 8 A\nBO_ 1 M2: 8 A\nVAL_ 2 S 0 \"x\";\nBA_ \"Nope\" 1;\n";
    let file = dbc_file(text.as_bytes());
    let mut failures = CollectingObserver::new();
    Parser::new()
        .observer(&mut failures)
        .parse_path(file.path())
        .expect("parse file");

    let got: Vec<(usize, Diagnostic)> = failures
        .into_failures()
        .into_iter()
        .map(|f| (f.line, f.diagnostic))
        .collect();
    assert_eq!(got.len(), 3);
    assert_eq!(got[0], (3, Diagnostic::DuplicatedMessage { id: 1 }));
    assert_eq!(got[1], (4, Diagnostic::MessageIdNotFound { id: 2 }));
    assert_eq!(got[2].0, 5);
    assert!(matches!(got[2].1, Diagnostic::PropertyNameNotFound { .. }));
}

#[test]
fn decodes_windows_1252_by_default() {
    let file = dbc_file(b"BU_: ECU\nCM_ BU_ ECU \"K\xFChlmittel 90\xB0C\";\n");
    let db = dbc::from_file(file.path()).expect("parse file");
    assert_eq!(db.node("ECU").unwrap().comment, "Kühlmittel 90°C");
}

#[test]
fn accepts_upper_case_extension() {
    let mut file = tempfile::Builder::new()
        .suffix(".DBC")
        .tempfile()
        .expect("create temp file");
    file.write_all(b"BU_: ECU\n").expect("write temp file");
    let db = dbc::from_file(file.path()).expect("parse file");
    assert!(db.node("ECU").is_some());
}

#[test]
fn rejects_other_extensions() {
    let file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("create temp file");
    let err = dbc::from_file(file.path()).unwrap_err();
    assert!(matches!(err, DbcParseError::InvalidExtension { .. }));
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = dbc::from_file(dir.path().join("missing.dbc")).unwrap_err();
    assert!(matches!(err, DbcParseError::OpenFile { .. }));
    assert!(err.to_string().contains("missing.dbc"));
}

#[test]
fn reader_and_text_entry_points_agree() {
    let from_reader = dbc::from_reader(Cursor::new(VEHICLE.as_bytes())).expect("parse reader");
    let from_text = dbc::from_str(VEHICLE);
    let file = dbc_file(VEHICLE.as_bytes());
    let from_path = dbc::from_file(file.path()).expect("parse file");
    assert_eq!(from_reader, from_text);
    assert_eq!(from_path, from_text);
}
