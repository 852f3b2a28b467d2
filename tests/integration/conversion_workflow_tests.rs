/*!
 * Integration tests for converting a saved teacher plan from disk
 */

use anyhow::Result;
use dsb_bot::bot::store_student_plans;
use dsb_bot::converter::PlanConverter;
use dsb_bot::file_utils::FileManager;

use crate::common::{self, full_row, row, teacher_plan, TEST_HEADER};

/// Test the full path: template and teacher plan from disk, student plans to disk
#[test]
fn test_convertFromDisk_shouldWriteOnePlanPerDay() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let template = common::create_test_file(temp_dir.path(), "plan_style.html", TEST_HEADER)?;
    let input = common::create_test_file(
        temp_dir.path(),
        "lehrer.htm",
        &teacher_plan(&[
            (
                "3.11.2025 Montag",
                vec![
                    row("10b", "Vertretung"),
                    row("7a", "Spam"),
                    full_row(["Meier", "4", "7a", "Bio", "N1", "Roth", "", "Entfall", ""]),
                ],
            ),
            ("4.11.2025 Dienstag", vec![row("E1", "Verlegung"), row("6c", "Tausch")]),
        ]),
    )?;

    let converter = PlanConverter::new(&template);
    let documents = converter.convert(&FileManager::read_to_string(&input)?);
    assert_eq!(documents.len(), 2);

    let out_dir = temp_dir.path().join("out");
    let written = store_student_plans(&documents, &out_dir)?;

    assert_eq!(written, vec![out_dir.join("2025-11-03.html"), out_dir.join("2025-11-04.html")]);

    let monday = common::table_rows(&FileManager::read_to_string(&written[0])?);
    let classes: Vec<&str> = monday.iter().skip(1).map(|r| r[0].as_str()).collect();
    assert_eq!(classes, vec!["7a", "10b"]);
    assert_eq!(monday[1][3], "Roth");

    let tuesday = FileManager::read_to_string(&written[1])?;
    assert_eq!(common::count(&tuesday, "html"), 1);
    assert!(tuesday.contains("<title>Vertretungsplan</title>"));
    assert_eq!(common::data_row_classes(&tuesday), vec!["list odd", "list even"]);
    Ok(())
}

/// Test that undated documents are skipped and the first document per date wins
#[test]
fn test_storeStudentPlans_withDuplicatesAndUndated() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let converter = PlanConverter::with_template(common::test_template());
    let documents = converter.convert(&teacher_plan(&[
        ("3.11.2025 Montag (Seite 1)", vec![row("5a", "Vertretung")]),
        ("3.11.2025 Montag (Seite 2)", vec![row("6a", "Vertretung")]),
        ("Aushang", vec![row("7a", "Vertretung")]),
    ]));
    assert_eq!(documents.len(), 3);

    let written = store_student_plans(&documents, temp_dir.path())?;

    assert_eq!(written, vec![temp_dir.path().join("2025-11-03.html")]);
    let saved = FileManager::read_to_string(&written[0])?;
    assert!(saved.contains("Seite 1"));
    Ok(())
}
