// src/transfer/table.rs

//! Flat question tables imported into one subject: CSV text or the first
//! sheet of an `.xlsx` workbook, either with a header row.

use std::io::Cursor;

use calamine::{Reader, Xlsx};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::question::{AnswerLetter, Question, QuestionStatus, new_question_id},
    transfer::ImportPlan,
};

/// One table row. Column names follow the pack format (`Q`, `1`..`4`, `A`,
/// `explain`) with the longer spellings accepted as aliases.
#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(rename = "Q", alias = "Question", alias = "Content")]
    content: String,
    #[serde(rename = "1", alias = "OptionA", default)]
    option_a: String,
    #[serde(rename = "2", alias = "OptionB", default)]
    option_b: String,
    #[serde(rename = "3", alias = "OptionC", default)]
    option_c: String,
    #[serde(rename = "4", alias = "OptionD", default)]
    option_d: String,
    #[serde(rename = "A", alias = "Correct", alias = "Answer", default)]
    correct: Option<String>,
    #[serde(rename = "explain", alias = "Explanation", default)]
    explanation: Option<String>,
}

/// Parses `data` into questions for `subject_id`.
///
/// Any malformed row fails the whole table; rows with blank question text
/// are skipped. A table without usable rows is an error.
pub fn plan(data: &str, subject_id: &str) -> Result<ImportPlan, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut plan = ImportPlan::default();
    for (index, record) in reader.deserialize::<TableRow>().enumerate() {
        let row = record?;
        let line = index + 2;

        if row.content.is_empty() {
            tracing::debug!("Skipping table row {} without question text", line);
            plan.skipped += 1;
            continue;
        }

        let correct_answer = match row.correct.as_deref() {
            Some(letter) => letter.parse::<AnswerLetter>().map_err(|_| {
                AppError::BadRequest(format!("Row {} has invalid answer '{}'", line, letter))
            })?,
            None => AnswerLetter::A,
        };

        plan.questions.push(Question {
            id: new_question_id(),
            subject_id: subject_id.to_string(),
            content: row.content,
            image: None,
            option_a: row.option_a,
            option_b: row.option_b,
            option_c: row.option_c,
            option_d: row.option_d,
            option_images: None,
            correct_answer,
            explanation: row.explanation,
            explanation_image: None,
            status: QuestionStatus::Unlearned,
        });
    }

    if plan.questions.is_empty() {
        return Err(AppError::BadRequest("The table has no questions".to_string()));
    }
    Ok(plan)
}

/// Every `.xlsx` file is a zip archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Parses an uploaded table, telling workbooks from CSV text by content.
pub fn plan_upload(data: &[u8], subject_id: &str) -> Result<ImportPlan, AppError> {
    if data.starts_with(ZIP_MAGIC) {
        return plan_workbook(data, subject_id);
    }
    let text = std::str::from_utf8(data)
        .map_err(|_| AppError::BadRequest("Table is neither UTF-8 text nor an .xlsx workbook".to_string()))?;
    plan(text, subject_id)
}

/// Parses the first sheet of an `.xlsx` workbook the same way as a CSV table.
pub fn plan_workbook(data: &[u8], subject_id: &str) -> Result<ImportPlan, AppError> {
    let mut workbook = Xlsx::new(Cursor::new(data))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::BadRequest("The workbook has no sheets".to_string()))??;

    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in range.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(format!("table buffer: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::InternalServerError(format!("table buffer: {}", e)))?;

    tracing::debug!("Workbook sheet read: {} row(s)", range.height());
    plan(&text, subject_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_short_headers() {
        let data = "Q,1,2,3,4,A,explain\n\
                    Largest bone?,Femur,Tibia,Ulna,Radius,a,Thigh bone\n\
                    Smallest bone?,Stapes,Incus,Malleus,Femur,,\n";
        let plan = plan(data, "sub-1").unwrap();

        assert_eq!(plan.questions.len(), 2);
        let first = &plan.questions[0];
        assert_eq!(first.subject_id, "sub-1");
        assert_eq!(first.option_d, "Radius");
        assert_eq!(first.explanation.as_deref(), Some("Thigh bone"));
        assert_eq!(plan.questions[1].correct_answer, AnswerLetter::A);
        assert_eq!(plan.questions[1].explanation, None);
    }

    #[test]
    fn reads_long_headers_and_skips_blank_rows() {
        let data = "Question,OptionA,OptionB,OptionC,OptionD,Answer,Explanation\n\
                    Heart chambers?,2,3,4,5,C,\n\
                    ,,,,,,\n";
        let plan = plan(data, "sub-1").unwrap();
        assert_eq!(plan.questions.len(), 1);
        assert_eq!(plan.questions[0].correct_answer, AnswerLetter::C);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn bad_letter_or_empty_table_is_rejected() {
        assert!(plan("Q,A\nWhat?,Z\n", "sub-1").is_err());
        assert!(plan("Q,1,2,3,4,A\n", "sub-1").is_err());
        assert!(plan("Name,Value\nfoo,bar\n", "sub-1").is_err());
    }

    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell.parse::<f64>() {
                    Ok(n) => sheet.write_number(r as u32, c as u16, n).unwrap(),
                    Err(_) => sheet.write_string(r as u32, c as u16, *cell).unwrap(),
                };
            }
        }
        book.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_first_sheet_of_workbook() {
        let data = workbook(&[
            &["Question", "OptionA", "OptionB", "OptionC", "OptionD", "Answer", "Explanation"],
            &["Bones in the hand?", "27", "12", "8", "5", "A", "Carpals included"],
            &["Heart chambers?", "2", "3", "4", "5", "C", ""],
        ]);
        let plan = plan_upload(&data, "sub-1").unwrap();

        assert_eq!(plan.questions.len(), 2);
        assert_eq!(plan.questions[0].option_a, "27");
        assert_eq!(plan.questions[0].explanation.as_deref(), Some("Carpals included"));
        assert_eq!(plan.questions[1].correct_answer, AnswerLetter::C);
    }

    #[test]
    fn broken_workbook_is_rejected() {
        let err = plan_upload(b"PK\x03\x04not really a zip", "sub-1").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(plan_upload(&[0xff, 0xfe, 0x00], "sub-1").is_err());
    }
}
