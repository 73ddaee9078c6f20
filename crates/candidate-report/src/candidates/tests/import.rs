use std::io::Write;

use crate::candidates::import::{
    parse_submissions, records_from_path, records_from_reader, ImportError,
};
use crate::candidates::intake::IntakeViolation;

const CSV_WITH_SKILLS: &str = "\
name,email,institution,program,average,skills
Ana,ana@example.com,Universidad A,Física,8.2,Rust; SQL
Bo,bo@example.com,Universidad C,Química,9.0,
";

#[test]
fn imports_rows_in_file_order() {
    let records = records_from_reader(CSV_WITH_SKILLS.as_bytes()).expect("valid csv");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Ana");
    assert_eq!(records[0].average, 8.2);
    assert_eq!(
        records[0].skills,
        Some(vec!["Rust".to_string(), "SQL".to_string()])
    );
    assert_eq!(records[1].name, "Bo");
    assert_eq!(records[1].skills, None);
}

#[test]
fn accepts_legacy_spanish_headers() {
    let csv = "\
nombre,correo,institucion,carrera,promedio,habilidades
Luis,luis@example.org,Universidad B,Derecho,7.9,Oratoria
";

    let records = records_from_reader(csv.as_bytes()).expect("legacy headers");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].program, "Derecho");
    assert_eq!(records[0].skills, Some(vec!["Oratoria".to_string()]));
}

#[test]
fn reports_first_rejected_row() {
    let csv = "\
name,email,institution,program,average
Ana,ana@example.com,Universidad A,Física,8.2
Bo,not-an-email,Universidad B,Química,11
Cy,,Universidad B,Química,9
";

    match records_from_reader(csv.as_bytes()) {
        Err(ImportError::Rejected { row, rejection }) => {
            assert_eq!(row, 2);
            assert_eq!(rejection.violations.len(), 2);
            assert!(matches!(
                rejection.violations[0],
                IntakeViolation::InvalidEmail { .. }
            ));
            assert!(matches!(
                rejection.violations[1],
                IntakeViolation::AverageOutOfRange { .. }
            ));
        }
        other => panic!("expected rejected row, got {other:?}"),
    }
}

#[test]
fn blank_cells_become_missing_fields() {
    let csv = "\
name,email,institution,program,average
Ana,ana@example.com,,Física,
";

    let submissions = parse_submissions(csv.as_bytes()).expect("parses");

    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].institution, None);
    assert_eq!(submissions[0].average, None);
}

#[test]
fn reads_from_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(CSV_WITH_SKILLS.as_bytes()).expect("write csv");

    let records = records_from_path(file.path()).expect("import from path");
    assert_eq!(records.len(), 2);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = records_from_path(dir.path().join("absent.csv"));
    assert!(matches!(result, Err(ImportError::Io(_))));
}
