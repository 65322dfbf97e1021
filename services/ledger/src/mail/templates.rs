//! HTML bodies for the register's notification emails.
//!
//! The layout mirrors the cards the reception kiosk prints: dark header,
//! highlighted access code, plain footer. Display times are rendered in the
//! register's fixed timezone, not UTC.
use super::OutboundEmail;
use crate::model::Visit;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const FOOTER: &str = "ArTen S.r.l. — Registro Visitatori Digitale";

fn format_date(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%d/%m/%Y").to_string()
}

fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

fn header() -> String {
    "<div style=\"background:#111;color:#fff;padding:24px;border-radius:12px;text-align:center;\">\
       <h1 style=\"color:#16A34A;margin:0 0 8px;\">ArTen</h1>\
       <p style=\"margin:0;color:#888;\">Registro Visitatori</p>\
     </div>"
        .to_string()
}

/// Entry confirmation carrying the re-entry code and its QR rendering.
pub fn entry_confirmation(visit: &Visit, tz: Tz) -> OutboundEmail {
    let codice = visit.codice_univoco.as_str();
    let html_body = format!(
        "<div style=\"font-family:Arial,sans-serif;max-width:500px;margin:0 auto;padding:20px;\">\
           {header}\
           <div style=\"padding:24px 0;\">\
             <p>Gentile <strong>{nome}</strong>,</p>\
             <p>Il suo ingresso è stato registrato con successo.</p>\
             <div style=\"background:#f0fdf4;border:2px solid #16A34A;border-radius:12px;padding:20px;text-align:center;margin:16px 0;\">\
               <p style=\"margin:0 0 4px;color:#666;font-size:12px;\">IL SUO CODICE ACCESSO</p>\
               <p style=\"margin:0;font-size:32px;font-weight:bold;color:#16A34A;letter-spacing:4px;\">{codice}</p>\
             </div>\
             <div style=\"text-align:center;margin:16px 0;\">\
               <p style=\"margin:0 0 8px;color:#666;font-size:12px;text-transform:uppercase;letter-spacing:2px;\">OPPURE SCANSIONA IL QR CODE</p>\
               <img src=\"https://api.qrserver.com/v1/create-qr-code/?data={codice}&size=200x200&bgcolor=ffffff&color=000000\" alt=\"QR Code {codice}\" style=\"width:200px;height:200px;border-radius:8px;\">\
             </div>\
             <p><strong>Data:</strong> {data}<br><strong>Ora:</strong> {ora}</p>\
             <p style=\"color:#666;font-size:13px;\">Conservi questo codice per accessi futuri.</p>\
           </div>\
           <div style=\"border-top:1px solid #eee;padding-top:16px;color:#999;font-size:11px;text-align:center;\">{FOOTER}</div>\
         </div>",
        header = header(),
        nome = visit.nome,
        data = format_date(visit.ora_entrata, tz),
        ora = format_time(visit.ora_entrata, tz),
    );
    OutboundEmail {
        to: visit.email.clone(),
        subject: format!("Conferma Ingresso - {codice}"),
        html_body,
    }
}

/// Exit confirmation sent after a successful check-out.
pub fn exit_confirmation(visit: &Visit, exited_at: DateTime<Utc>, tz: Tz) -> OutboundEmail {
    let codice = visit.codice_univoco.as_str();
    let html_body = format!(
        "<div style=\"font-family:Arial,sans-serif;max-width:500px;margin:0 auto;padding:20px;\">\
           {header}\
           <div style=\"padding:24px 0;\">\
             <p>Gentile <strong>{nome}</strong>,</p>\
             <p>La sua uscita è stata registrata con successo.</p>\
             <p><strong>Data:</strong> {data}<br><strong>Ora uscita:</strong> {ora}</p>\
             <p>Grazie per la visita. A presto!</p>\
           </div>\
           <div style=\"border-top:1px solid #eee;padding-top:16px;color:#999;font-size:11px;text-align:center;\">{FOOTER}</div>\
         </div>",
        header = header(),
        nome = visit.nome,
        data = format_date(exited_at, tz),
        ora = format_time(exited_at, tz),
    );
    OutboundEmail {
        to: visit.email.clone(),
        subject: format!("Conferma Uscita - {codice}"),
        html_body,
    }
}

/// Operator summary for the presence sweep: one table row per visitor still
/// inside at the time of the sweep.
pub fn presence_alert(
    still_present: &[Visit],
    now: DateTime<Utc>,
    tz: Tz,
    admin_email: &str,
) -> OutboundEmail {
    let count = still_present.len();
    let (visitor_suffix, present_suffix) = if count == 1 { ("e", "e") } else { ("i", "i") };
    let rows: String = still_present
        .iter()
        .map(|visit| {
            format!(
                "<tr>\
                   <td style=\"padding:8px 12px;border-bottom:1px solid #eee;\">{nome}</td>\
                   <td style=\"padding:8px 12px;border-bottom:1px solid #eee;\">{ditta}</td>\
                   <td style=\"padding:8px 12px;border-bottom:1px solid #eee;\">{referente}</td>\
                   <td style=\"padding:8px 12px;border-bottom:1px solid #eee;\">{entrata}</td>\
                   <td style=\"padding:8px 12px;border-bottom:1px solid #eee;\">{codice}</td>\
                 </tr>",
                nome = visit.nome,
                ditta = visit.ditta,
                referente = visit.referente.as_deref().unwrap_or("-"),
                entrata = format_time(visit.ora_entrata, tz),
                codice = visit.codice_univoco.as_str(),
            )
        })
        .collect();
    let html_body = format!(
        "<div style=\"font-family:Arial,sans-serif;max-width:600px;margin:0 auto;padding:20px;\">\
           {header}\
           <div style=\"padding:24px 0;\">\
             <div style=\"background:#fef3c7;border:2px solid #f59e0b;border-radius:12px;padding:16px;text-align:center;margin-bottom:16px;\">\
               <p style=\"margin:0;font-size:18px;font-weight:bold;color:#92400e;\">⚠️ Attenzione: {count} visitator{visitor_suffix} ancora present{present_suffix}</p>\
               <p style=\"margin:4px 0 0;color:#92400e;font-size:13px;\">{data} — ore {ora}</p>\
             </div>\
             <table style=\"width:100%;border-collapse:collapse;font-size:13px;\">\
               <thead>\
                 <tr style=\"background:#f3f4f6;\">\
                   <th style=\"padding:8px 12px;text-align:left;\">Nome</th>\
                   <th style=\"padding:8px 12px;text-align:left;\">Ditta</th>\
                   <th style=\"padding:8px 12px;text-align:left;\">Referente</th>\
                   <th style=\"padding:8px 12px;text-align:left;\">Entrata</th>\
                   <th style=\"padding:8px 12px;text-align:left;\">Codice</th>\
                 </tr>\
               </thead>\
               <tbody>{rows}</tbody>\
             </table>\
             <p style=\"color:#666;font-size:12px;margin-top:16px;\">Questi visitatori risultano ancora all'interno della struttura. Si prega di verificare e, se necessario, registrare la loro uscita.</p>\
           </div>\
           <div style=\"border-top:1px solid #eee;padding-top:16px;color:#999;font-size:11px;text-align:center;\">{FOOTER}</div>\
         </div>",
        header = header(),
        data = format_date(now, tz),
        ora = format_time(now, tz),
    );
    OutboundEmail {
        to: admin_email.to_string(),
        subject: format!(
            "⚠️ {count} visitator{visitor_suffix} ancora present{present_suffix} — {data}",
            data = format_date(now, tz)
        ),
        html_body,
    }
}
