use std::collections::HashSet;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use super::error::SeedError;

/// One validated line of the seed file:
/// `project_id,email_id,app_code,dashboard_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRow {
    pub project_id: String,
    pub email_id: String,
    pub app_code: String,
    pub dashboard_url: String,
}

/// Parse and validate the whole seed file, header row skipped. Any row
/// with an empty project_id, email_id or app_code, and any repeated
/// app_code, rejects the entire load; there is no partial acceptance.
pub fn parse_seed_csv(data: &[u8]) -> Result<Vec<SeedRow>, SeedError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    let mut app_codes = HashSet::new();

    for (number, record) in reader.records().enumerate() {
        let record = record?;
        let field = |index: usize| record.get(index).unwrap_or("").trim().to_string();

        let row = SeedRow {
            project_id: field(0),
            email_id: field(1),
            app_code: field(2),
            dashboard_url: field(3),
        };

        // Data rows start on line 2, after the header.
        let line = number + 2;
        if row.project_id.is_empty() {
            return Err(SeedError::EmptyField {
                line,
                column: "project_id",
            });
        }
        if row.email_id.is_empty() {
            return Err(SeedError::EmptyField {
                line,
                column: "email_id",
            });
        }
        if row.app_code.is_empty() {
            return Err(SeedError::EmptyField {
                line,
                column: "app_code",
            });
        }
        if !app_codes.insert(row.app_code.clone()) {
            return Err(SeedError::DuplicateAppCode(row.app_code));
        }

        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "\
project_id,email_id,app_code,dashboard_url
project-a,team-a@example.com,app-a,https://dashboards.example.com/a
project-b,team-b@example.com,app-b,https://dashboards.example.com/b
";

    #[test]
    fn parses_valid_file_and_skips_header() {
        let rows = parse_seed_csv(VALID.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].project_id, "project-a");
        assert_eq!(rows[0].app_code, "app-a");
        assert_eq!(rows[1].email_id, "team-b@example.com");
    }

    #[test]
    fn empty_email_rejects_the_load() {
        let csv = "\
project_id,email_id,app_code,dashboard_url
project-a,,app-a,https://dashboards.example.com/a
";
        match parse_seed_csv(csv.as_bytes()) {
            Err(SeedError::EmptyField { line, column }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "email_id");
            }
            other => panic!("expected EmptyField, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_app_code_rejects_the_load() {
        let csv = "\
project_id,email_id,app_code,dashboard_url
project-a,team-a@example.com,app-a,https://dashboards.example.com/a
project-b,team-b@example.com,app-a,https://dashboards.example.com/b
";
        match parse_seed_csv(csv.as_bytes()) {
            Err(SeedError::DuplicateAppCode(code)) => assert_eq!(code, "app-a"),
            other => panic!("expected DuplicateAppCode, got {:?}", other),
        }
    }

    #[test]
    fn missing_dashboard_column_is_tolerated() {
        let csv = "\
project_id,email_id,app_code,dashboard_url
project-a,team-a@example.com,app-a
";
        let rows = parse_seed_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].dashboard_url, "");
    }
}
