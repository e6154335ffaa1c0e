//! CSV export of recorded submissions.
//!
//! Output format: UTF-8 with a leading byte-order mark, `;` as delimiter,
//! CRLF between rows, and a fixed 19-column header. Cells are quoted only
//! when they contain the delimiter, a double quote or a line break.

use chrono::{DateTime, SecondsFormat, Utc};
use std::borrow::Cow;

use crate::models::{Excursion, Teilnehmer};

/// Field delimiter.
pub const DELIMITER: char = ';';

/// Row separator.
pub const ROW_SEPARATOR: &str = "\r\n";

/// Byte-order mark so spreadsheet tools detect UTF-8.
pub const BOM: char = '\u{feff}';

/// Column order of the export.
pub const HEADERS: [&str; 19] = [
    "teilnehmer_id",
    "status",
    "submitted_at",
    "updated_at",
    "exkursion_id",
    "exkursion_titel",
    "vorname",
    "nachname",
    "ausweisart",
    "ausweisnr",
    "handy",
    "email",
    "matrikelnr",
    "reiseart",
    "gruppe",
    "notfall_name",
    "notfall_beziehung",
    "notfall_telefon",
    "note",
];

/// Quotes `value` if it contains `delimiter`, `"`, `\n` or `\r`.
///
/// Quoted cells have their inner quotes doubled.
pub fn escape_cell(value: &str, delimiter: char) -> Cow<'_, str> {
    let needs_quotes = value
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Projects one submission onto the export columns.
///
/// `live` is the excursion currently stored under the submission's
/// `exkursion_id`; its title wins over the embedded snapshot's.
pub fn teilnehmer_row(entry: &Teilnehmer, live: Option<&Excursion>) -> [String; 19] {
    let person = &entry.persoenlich;
    let titel = live
        .map(|e| e.titel.clone())
        .or_else(|| entry.exkursion_snapshot.as_ref().map(|s| s.titel.clone()))
        .unwrap_or_default();

    [
        entry.id.clone(),
        entry.status.to_string(),
        timestamp(&entry.submitted_at),
        timestamp(&entry.updated_at),
        entry.exkursion_id.clone(),
        titel,
        person.vorname.clone(),
        person.nachname.clone(),
        person.ausweisart.to_string(),
        person.ausweisnr.clone(),
        person.handy.clone(),
        person.email.clone(),
        person.matrikelnr.clone(),
        person.reiseart.map(|r| r.to_string()).unwrap_or_default(),
        person.gruppe.map(|g| g.to_string()).unwrap_or_default(),
        entry.notfall.name.clone(),
        entry.notfall.beziehung.clone(),
        entry.notfall.telefon.clone(),
        entry.note.clone(),
    ]
}

fn join_row<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    let delimiter = DELIMITER.to_string();
    cells
        .into_iter()
        .map(|cell| escape_cell(cell, DELIMITER))
        .collect::<Vec<_>>()
        .join(delimiter.as_str())
}

/// Builds the CSV document for `teilnehmer` in collection order.
///
/// When `excursion_id` is set and not blank, only submissions for that
/// excursion are included. Titles are looked up in `excursions`.
pub fn export_teilnehmer_csv(
    teilnehmer: &[Teilnehmer],
    excursions: &[Excursion],
    excursion_id: Option<&str>,
) -> String {
    let excursion_id = excursion_id.filter(|id| !id.trim().is_empty());
    let mut lines = vec![join_row(HEADERS)];

    for entry in teilnehmer
        .iter()
        .filter(|t| excursion_id.map_or(true, |id| t.exkursion_id == id))
    {
        let live = excursions.iter().find(|e| e.id == entry.exkursion_id);
        let row = teilnehmer_row(entry, live);
        lines.push(join_row(row.iter().map(String::as_str)));
    }

    format!("{}{}", BOM, lines.join(ROW_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Confirmations, ExkursionRef, Gruppenart, NotfallKontakt, Persoenlich, Reiseart,
        TeilnehmerStatus,
    };

    /// Splits CSV text back into cells, honouring quotes.
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut cell = String::new();
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        cell.push('"');
                        chars.next();
                    }
                    '"' => in_quotes = false,
                    _ => cell.push(c),
                }
                continue;
            }
            match c {
                '"' => in_quotes = true,
                ';' => row.push(std::mem::take(&mut cell)),
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                _ => cell.push(c),
            }
        }
        row.push(cell);
        rows.push(row);
        rows
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn teilnehmer(id: &str, exkursion_id: &str) -> Teilnehmer {
        Teilnehmer {
            id: id.into(),
            exkursion_id: exkursion_id.into(),
            persoenlich: Persoenlich {
                vorname: "Ada".into(),
                nachname: "Lovelace".into(),
                email: "ada@example.com".into(),
                ..Default::default()
            },
            notfall: NotfallKontakt {
                name: "Byron".into(),
                beziehung: "Vater".into(),
                telefon: "+49 30 1234".into(),
            },
            note: String::new(),
            confirmations: Confirmations::default(),
            status: TeilnehmerStatus::Eingegangen,
            submitted_at: at("2025-05-01T10:00:00Z"),
            updated_at: at("2025-05-02T11:30:00.250Z"),
            exkursion_snapshot: None,
        }
    }

    fn excursion(id: &str, titel: &str) -> Excursion {
        Excursion {
            id: id.into(),
            titel: titel.into(),
            datum: "2025-06-01".into(),
            ort: "Zermatt".into(),
            beschreibung: None,
            kapazitaet: None,
            archived: false,
            created_at: at("2025-04-01T00:00:00Z"),
            updated_at: at("2025-04-01T00:00:00Z"),
        }
    }

    #[test]
    fn test_escape_cell_plain() {
        assert_eq!(escape_cell("Zermatt", ';'), "Zermatt");
        assert_eq!(escape_cell("", ';'), "");
        assert!(matches!(escape_cell("a,b", ';'), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_cell_quotes_when_needed() {
        assert_eq!(escape_cell("a;b", ';'), "\"a;b\"");
        assert_eq!(escape_cell("sag \"hallo\"", ';'), "\"sag \"\"hallo\"\"\"");
        assert_eq!(escape_cell("zeile1\nzeile2", ';'), "\"zeile1\nzeile2\"");
        assert_eq!(escape_cell("zeile1\r\nzeile2", ';'), "\"zeile1\r\nzeile2\"");
        assert_eq!(escape_cell("a,b", ','), "\"a,b\"");
    }

    #[test]
    fn test_header_only_when_empty() {
        let csv = export_teilnehmer_csv(&[], &[], None);
        assert!(csv.starts_with('\u{feff}'));
        assert_eq!(&csv[BOM.len_utf8()..], HEADERS.join(";"));
    }

    #[test]
    fn test_row_values_and_format() {
        let mut entry = teilnehmer("t-1", "E1");
        entry.persoenlich.reiseart = Some(Reiseart::Sonstige);
        entry.persoenlich.gruppe = Some(Gruppenart::Keine);

        let csv = export_teilnehmer_csv(&[entry], &[excursion("E1", "Alpine Trip")], None);
        let rows = parse_csv(&csv[BOM.len_utf8()..]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "t-1");
        assert_eq!(rows[1][1], "eingegangen");
        assert_eq!(rows[1][2], "2025-05-01T10:00:00.000Z");
        assert_eq!(rows[1][3], "2025-05-02T11:30:00.250Z");
        assert_eq!(rows[1][5], "Alpine Trip");
        assert_eq!(rows[1][8], "Personalausweis");
        assert_eq!(rows[1][13], "Noch nicht festgelegt/Sonstige");
        assert_eq!(rows[1][14], "-");
        assert_eq!(rows[1][17], "+49 30 1234");
        assert!(csv.contains("\r\n"));
    }

    #[test]
    fn test_title_falls_back_to_snapshot_then_empty() {
        let mut with_snapshot = teilnehmer("t-1", "GONE");
        with_snapshot.exkursion_snapshot = Some(ExkursionRef {
            id: "GONE".into(),
            titel: "Alte Exkursion".into(),
            ..Default::default()
        });
        let without = teilnehmer("t-2", "GONE");

        let live = excursion("E1", "Neu");
        assert_eq!(teilnehmer_row(&with_snapshot, None)[5], "Alte Exkursion");
        assert_eq!(teilnehmer_row(&without, None)[5], "");

        with_snapshot.exkursion_id = "E1".into();
        assert_eq!(teilnehmer_row(&with_snapshot, Some(&live))[5], "Neu");
    }

    #[test]
    fn test_filter_preserves_order() {
        let entries = vec![
            teilnehmer("t-1", "E1"),
            teilnehmer("t-2", "E2"),
            teilnehmer("t-3", "E1"),
        ];

        let csv = export_teilnehmer_csv(&entries, &[], Some("E1"));
        let rows = parse_csv(&csv[BOM.len_utf8()..]);

        let ids: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["t-1", "t-3"]);
    }

    #[test]
    fn test_blank_filter_exports_everything() {
        let entries = vec![teilnehmer("t-1", "E1"), teilnehmer("t-2", "E2")];

        for filter in [Some(""), Some("  "), None] {
            let csv = export_teilnehmer_csv(&entries, &[], filter);
            let rows = parse_csv(&csv[BOM.len_utf8()..]);
            assert_eq!(rows.len(), 3, "filter {:?}", filter);
        }
    }

    #[test]
    fn test_roundtrip_with_special_characters() {
        let mut tricky = teilnehmer("t-1", "E1");
        tricky.note = "Allergie; \"Nüsse\"\r\nbitte beachten".into();
        tricky.persoenlich.nachname = "O'Neil; jr.".into();
        tricky.notfall.beziehung = "Mutter\nund Vater".into();
        let plain = teilnehmer("t-2", "E1");
        let entries = vec![tricky, plain];

        let csv = export_teilnehmer_csv(&entries, &[], None);
        let rows = parse_csv(&csv[BOM.len_utf8()..]);

        assert_eq!(rows[0], HEADERS.map(String::from).to_vec());
        assert_eq!(rows.len(), entries.len() + 1);
        for (row, entry) in rows[1..].iter().zip(&entries) {
            assert_eq!(row.len(), HEADERS.len());
            assert_eq!(row, &teilnehmer_row(entry, None).to_vec());
        }
    }
}
