use chrono::{DateTime, SecondsFormat, Utc};

use formwell_domain::{FieldValue, Form, Submission};

/// Renders submissions as CSV: an id and timestamp column followed by one
/// column per form field, in field order. Rows are separated by `\n`.
#[must_use]
pub fn render_submissions_csv(form: &Form, submissions: &[Submission]) -> String {
    let mut lines = Vec::with_capacity(submissions.len() + 1);

    let header = ["Submission ID".to_owned(), "Submitted At".to_owned()]
        .into_iter()
        .chain(form.fields().iter().map(|field| field.label().to_owned()))
        .map(|cell| escape_cell(cell.as_str()))
        .collect::<Vec<_>>();
    lines.push(header.join(","));

    for submission in submissions {
        let row = [
            submission.id().to_string(),
            submission
                .submitted_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ]
        .into_iter()
        .map(|cell| escape_cell(cell.as_str()))
        .chain(
            form.fields()
                .iter()
                .map(|field| value_cell(submission.data().get(field.id()))),
        )
        .collect::<Vec<_>>();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Download file name: lowercased form name with every non-alphanumeric
/// character replaced by `_`, plus a millisecond timestamp.
#[must_use]
pub fn export_file_name(form_name: &str, now: DateTime<Utc>) -> String {
    let stem: String = form_name
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    format!("{stem}_submissions_{}.csv", now.timestamp_millis())
}

fn value_cell(value: Option<&FieldValue>) -> String {
    match value {
        // Selections are always quoted so the joined list stays one cell.
        Some(FieldValue::ChoiceSet(choices)) => quote(choices.join(", ").as_str()),
        Some(value) => escape_cell(value.to_string().as_str()),
        None => String::new(),
    }
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '\n', '\r', '"']) {
        quote(cell)
    } else {
        cell.to_owned()
    }
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
