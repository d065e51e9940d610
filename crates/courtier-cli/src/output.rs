//! Plain-text tables for list output.

use chrono::{Local, NaiveDate};

use courtier_core::models::{Agency, Client, Insurance};
use courtier_core::utils::{format_amount, format_date, format_phone, truncate_string};

/// Widest a cell may get before being truncated
const MAX_CELL_WIDTH: usize = 32;

/// Gap between columns
const COLUMN_GAP: &str = "  ";

/// A record that can be shown as one table row.
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Client {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nom", "Email", "Téléphone", "Agence"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name(),
            self.email.clone(),
            format_phone(&self.phone),
            self.agency_name
                .clone()
                .unwrap_or_else(|| format!("#{}", self.agency)),
        ]
    }
}

impl TableRow for Agency {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nom", "Ville"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.city.clone()]
    }
}

impl TableRow for Insurance {
    fn headers() -> &'static [&'static str] {
        &["ID", "Type", "Montant", "Début", "Fin", "Client", "Statut"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.insurance_type.clone(),
            format_amount(&self.amount),
            format_date(self.start_date),
            format_date(self.end_date),
            self.client_full_name
                .clone()
                .unwrap_or_else(|| format!("#{}", self.client)),
            policy_status(self, Local::now().date_naive()).to_string(),
        ]
    }
}

fn policy_status(insurance: &Insurance, today: NaiveDate) -> &'static str {
    if insurance.is_active_on(today) {
        "Active"
    } else if today < insurance.start_date {
        "À venir"
    } else {
        "Expirée"
    }
}

/// Render rows as an aligned table with a header line.
pub fn render_table<T: TableRow>(rows: &[T]) -> String {
    let headers: Vec<String> = T::headers().iter().map(|h| h.to_string()).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.cells()
                .iter()
                .map(|cell| truncate_string(cell, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(headers.as_slice())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP),
    );
    lines.extend(body.iter().map(|row| format_line(row.as_slice())));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_render_agency_table() {
        let agencies = vec![
            Agency {
                id: 1,
                name: "Agence Lyon".to_string(),
                city: "Lyon".to_string(),
            },
            Agency {
                id: 12,
                name: "Nantes".to_string(),
                city: "Nantes".to_string(),
            },
        ];
        let table = render_table(&agencies);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID  Nom          Ville");
        assert_eq!(lines[1], "--  -----------  ------");
        assert_eq!(lines[2], "1   Agence Lyon  Lyon");
        assert_eq!(lines[3], "12  Nantes       Nantes");
    }

    #[test]
    fn test_empty_table_has_headers() {
        let table = render_table::<Agency>(&[]);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_policy_status() {
        let insurance = Insurance {
            id: 1,
            insurance_type: "Auto".to_string(),
            amount: "300".to_string(),
            start_date: date(2025, 1, 1),
            end_date: date(2026, 1, 1),
            client: 1,
            agency: 1,
            client_full_name: None,
        };
        assert_eq!(policy_status(&insurance, date(2024, 6, 1)), "À venir");
        assert_eq!(policy_status(&insurance, date(2025, 6, 1)), "Active");
        assert_eq!(policy_status(&insurance, date(2026, 1, 1)), "Expirée");
    }
}
