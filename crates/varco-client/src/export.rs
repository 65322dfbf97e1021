// CSV export for the admin review screen.
//
// One row per visit, display times in the register's fixed timezone, with
// the same column order the old spreadsheet handouts used.
use crate::VisitRecord;
use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const HEADER: [&str; 9] = [
    "Nome", "Ditta", "Email", "Referente", "Zona", "Codice", "Entrata", "Uscita", "Privacy",
];

pub fn visits_to_csv(visits: &[VisitRecord], tz: Tz) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).context("write csv header")?;
    for visit in visits {
        writer
            .write_record([
                visit.nome.as_str(),
                visit.ditta.as_str(),
                visit.email.as_str(),
                visit.referente.as_deref().unwrap_or("-"),
                visit.zona.as_deref().unwrap_or("-"),
                visit.codice_univoco.as_str(),
                &format_instant(visit.ora_entrata, tz),
                &visit
                    .ora_uscita
                    .map(|uscita| format_instant(uscita, tz))
                    .unwrap_or_else(|| "-".to_string()),
                if visit.privacy_accettata { "Sì" } else { "No" },
            ])
            .context("write csv row")?;
    }
    let bytes = writer.into_inner().context("flush csv")?;
    String::from_utf8(bytes).context("csv is utf-8")
}

fn format_instant(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%d/%m/%Y %H:%M").to_string()
}
