// Admin console for the visit ledger.
//
// Subcommand driver over the typed client: day listings, CSV export, manual
// check-in/check-out, code re-entry, and referee maintenance. The API base
// URL comes from VARCO_API (default http://localhost:8080).
use anyhow::{bail, Context};
use chrono::NaiveDate;
use chrono_tz::Tz;
use varco_client::{CheckInForm, VarcoClient};
use varco_common::ids::{RefereeId, VisitId};

const USAGE: &str = "\
varco-console <command>

  list [YYYY-MM-DD]                 visits for a day (default today)
  export [YYYY-MM-DD]               same, as CSV on stdout
  checkin <nome> <ditta> <email> [referente] [zona]
  checkout <id>                     close a visit
  code <ARTEN-xxxx>                 re-entry by access code
  referees                          list active referees
  referee-add <nome> [email]        add a referee
  referee-rm <id>                   soft-delete a referee
  health                            ledger diagnostics
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let base_url =
        std::env::var("VARCO_API").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let tz: Tz = std::env::var("VARCO_TZ")
        .unwrap_or_else(|_| "Europe/Rome".to_string())
        .parse()
        .map_err(|err| anyhow::anyhow!("parse VARCO_TZ: {err}"))?;
    let client = VarcoClient::new(base_url);

    match args.first().map(String::as_str) {
        Some("list") => {
            let date = parse_optional_date(args.get(1))?;
            let visits = client.visits(date).await?;
            if visits.is_empty() {
                println!("Nessuna visita registrata.");
                return Ok(());
            }
            for visit in visits {
                let uscita = visit
                    .ora_uscita
                    .map(|t| t.with_timezone(&tz).format("%H:%M").to_string())
                    .unwrap_or_else(|| "PRESENTE".to_string());
                println!(
                    "{}  {:8}  {} — {} ({})  entrata {}  uscita {}",
                    visit.id,
                    visit.codice_univoco,
                    visit.nome,
                    visit.ditta,
                    visit.referente.as_deref().unwrap_or("-"),
                    visit.ora_entrata.with_timezone(&tz).format("%H:%M"),
                    uscita,
                );
            }
        }
        Some("export") => {
            let date = parse_optional_date(args.get(1))?;
            let visits = client.visits(date).await?;
            print!("{}", varco_client::export::visits_to_csv(&visits, tz)?);
        }
        Some("checkin") => {
            let [nome, ditta, email] = mandatory(&args[1..], ["nome", "ditta", "email"])?;
            let outcome = client
                .check_in(&CheckInForm {
                    nome,
                    ditta,
                    email,
                    referente: args.get(4).cloned(),
                    zona: args.get(5).cloned(),
                    privacy_accettata: true,
                    ..CheckInForm::default()
                })
                .await?;
            println!(
                "Ingresso registrato: {} (codice {})",
                outcome.visitor.nome, outcome.codice
            );
        }
        Some("checkout") => {
            let id: VisitId = single_arg(&args[1..], "id")?
                .parse()
                .context("parse visit id")?;
            let visitor = client.check_out(&id).await?;
            println!("Uscita registrata per {}", visitor.nome);
        }
        Some("code") => {
            let payload = single_arg(&args[1..], "codice")?;
            let outcome = client.code_login_scanned(&payload).await?;
            println!("{}", outcome.message);
        }
        Some("referees") => {
            for referee in client.referees().await? {
                println!(
                    "{}  {} <{}>",
                    referee.id,
                    referee.nome,
                    referee.email.as_deref().unwrap_or("-")
                );
            }
        }
        Some("referee-add") => {
            let nome = single_arg(&args[1..], "nome")?;
            let referee = client.add_referee(&nome, args.get(2).map(String::as_str)).await?;
            println!("Referente aggiunto: {} ({})", referee.nome, referee.id);
        }
        Some("referee-rm") => {
            let id: RefereeId = single_arg(&args[1..], "id")?
                .parse()
                .context("parse referee id")?;
            client.remove_referee(&id).await?;
            println!("Referente rimosso");
        }
        Some("health") => {
            let report = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            eprint!("{USAGE}");
            std::process::exit(2);
        }
    }
    Ok(())
}

fn parse_optional_date(arg: Option<&String>) -> anyhow::Result<Option<NaiveDate>> {
    arg.map(|raw| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("parse date {raw}"))
    })
    .transpose()
}

fn single_arg(args: &[String], name: &str) -> anyhow::Result<String> {
    match args.first() {
        Some(value) => Ok(value.clone()),
        None => bail!("missing argument: {name}"),
    }
}

fn mandatory<const N: usize>(args: &[String], names: [&str; N]) -> anyhow::Result<[String; N]> {
    if args.len() < N {
        bail!("missing arguments: {}", names.join(" "));
    }
    Ok(std::array::from_fn(|index| args[index].clone()))
}
