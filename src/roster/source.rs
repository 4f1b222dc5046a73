//! Roster loading from spreadsheet exports.
//!
//! Each role track points at one or more CSV exports of the roster sheets.
//! Only the email column is read; every other column is ignored.

use super::EmailRoleIndex;
use crate::config::RosterConfig;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to open roster file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse roster file {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("roster file {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

/// Build the index from every configured track.
pub fn load(config: &RosterConfig) -> Result<EmailRoleIndex, RosterError> {
    let mut index = EmailRoleIndex::new();
    for track in &config.tracks {
        for path in &track.files {
            let file = std::fs::File::open(path).map_err(|source| RosterError::Io {
                path: path.clone(),
                source,
            })?;
            let emails = read_emails(file, &config.email_column, path)?;
            debug!(role = %track.role, path = %path.display(), count = emails.len(), "Loaded roster file");
            index.extend(&track.role, emails);
        }
    }
    for (role, count) in index.roles() {
        info!(role = %role, emails = count, "Roster track loaded");
    }
    Ok(index)
}

/// Read the email column from CSV data. Blank cells are skipped.
pub fn read_emails<R: Read>(
    reader: R,
    column: &str,
    path: &Path,
) -> Result<Vec<String>, RosterError> {
    let csv_err = |source| RosterError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?;
    let Some(col) = headers.iter().position(|h| h.eq_ignore_ascii_case(column)) else {
        return Err(RosterError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        });
    };

    let mut emails = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        if let Some(email) = record.get(col)
            && !email.is_empty()
        {
            emails.push(email.to_string());
        }
    }
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterTrack;
    use std::io::Write;

    #[test]
    fn reads_email_column_among_others() {
        let data = "name,Email,track\nAlice, alice@example.com ,x\nBob,,y\nCarol,carol@example.com,z\n";
        let emails = read_emails(data.as_bytes(), "email", Path::new("mem.csv")).unwrap();
        assert_eq!(emails, vec!["alice@example.com", "carol@example.com"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let data = "name,mail\nAlice,a@b.c\n";
        let err = read_emails(data.as_bytes(), "email", Path::new("mem.csv")).unwrap_err();
        assert!(matches!(err, RosterError::MissingColumn { .. }));
    }

    #[test]
    fn two_files_feed_one_role() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("ca.csv");
        let second = dir.path().join("ca2.csv");
        writeln!(std::fs::File::create(&first).unwrap(), "email\none@example.com").unwrap();
        writeln!(std::fs::File::create(&second).unwrap(), "email\nTWO@example.com").unwrap();

        let config = RosterConfig {
            email_column: "email".into(),
            tracks: vec![RosterTrack {
                role: "Campus Ambassador".into(),
                files: vec![first, second],
            }],
        };
        let index = load(&config).unwrap();
        assert_eq!(index.roles_for_email("two@example.com"), vec!["Campus Ambassador"]);
        assert_eq!(index.roles_for_email("one@example.com"), vec!["Campus Ambassador"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let config = RosterConfig {
            email_column: "email".into(),
            tracks: vec![RosterTrack {
                role: "Mentor".into(),
                files: vec![PathBuf::from("/nonexistent/mentor.csv")],
            }],
        };
        let err = load(&config).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mentor.csv"));
    }
}
