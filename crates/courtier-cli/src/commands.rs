//! Command parsing and execution.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use courtier_core::api::{ListQuery, Resource, ResourceService};
use courtier_core::auth::{AuthService, Navigator, SessionStore, LOGIN_ROUTE};
use courtier_core::{ApiClient, Config};

use crate::output::{render_table, TableRow};

pub const USAGE: &str = "\
Usage: courtier <commande>

Commandes :
  login [utilisateur]                      Se connecter
  logout                                   Se déconnecter
  status                                   Afficher l'état de la session
  stats                                    Compter clients, agences et assurances
  list <ressource> [options]               Lister (--search, --ordering, --page, --agency, --client)
  show <ressource> <id>                    Afficher un enregistrement
  create <ressource> champ=valeur...       Créer un enregistrement
  update <ressource> <id> champ=valeur...  Modifier un enregistrement
  delete <ressource> <id>                  Supprimer un enregistrement

Ressources : clients, agencies, insurances";

/// Fields holding the id of another record
const REFERENCE_FIELDS: [&str; 2] = ["agency", "client"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Clients,
    Agencies,
    Insurances,
}

impl ResourceKind {
    fn route(&self) -> &'static str {
        match self {
            ResourceKind::Clients => "/clients",
            ResourceKind::Agencies => "/agencies",
            ResourceKind::Insurances => "/insurances",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "clients" | "client" => Ok(ResourceKind::Clients),
            "agencies" | "agency" | "agences" | "agence" => Ok(ResourceKind::Agencies),
            "insurances" | "insurance" | "assurances" | "assurance" => Ok(ResourceKind::Insurances),
            other => Err(anyhow!("Ressource inconnue : {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceAction {
    List(ListQuery),
    Show(i64),
    Create(Vec<(String, String)>),
    Update(i64, Vec<(String, String)>),
    Delete(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Login { username: Option<String> },
    Logout,
    Status,
    Stats,
    Resource {
        resource: ResourceKind,
        action: ResourceAction,
    },
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        match name.as_str() {
            "help" | "--help" | "-h" => Ok(Command::Help),
            "login" => Ok(Command::Login {
                username: rest.first().cloned(),
            }),
            "logout" => Ok(Command::Logout),
            "status" => Ok(Command::Status),
            "stats" => Ok(Command::Stats),
            "list" | "show" | "create" | "update" | "delete" => {
                let (resource, rest) = rest
                    .split_first()
                    .ok_or_else(|| anyhow!("Ressource manquante"))?;
                let resource: ResourceKind = resource.parse()?;
                let action = match name.as_str() {
                    "list" => ResourceAction::List(parse_list_options(rest)?),
                    "show" => ResourceAction::Show(parse_id(rest.first())?),
                    "create" => ResourceAction::Create(parse_fields(rest)?),
                    "update" => {
                        let id = parse_id(rest.first())?;
                        ResourceAction::Update(id, parse_fields(&rest[1..])?)
                    }
                    _ => ResourceAction::Delete(parse_id(rest.first())?),
                };
                Ok(Command::Resource { resource, action })
            }
            other => bail!("Commande inconnue : {}", other),
        }
    }

    /// Screen the command corresponds to, for login redirects.
    fn route(&self) -> &'static str {
        match self {
            Command::Login { .. } => LOGIN_ROUTE,
            Command::Resource { resource, .. } => resource.route(),
            _ => "/",
        }
    }
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    let raw = arg.ok_or_else(|| anyhow!("Identifiant manquant"))?;
    raw.parse()
        .map_err(|_| anyhow!("Identifiant invalide : {}", raw))
}

fn parse_list_options(args: &[String]) -> Result<ListQuery> {
    let mut query = ListQuery::new();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("Valeur manquante pour {}", flag))?;
        query = match flag.as_str() {
            "--search" => query.search(value.as_str()),
            "--ordering" => query.ordering(value.as_str()),
            "--page" => query.page(
                value
                    .parse()
                    .map_err(|_| anyhow!("Page invalide : {}", value))?,
            ),
            "--agency" => query.filter("agency", value),
            "--client" => query.filter("client", value),
            other => bail!("Option inconnue : {}", other),
        };
    }
    Ok(query)
}

fn parse_fields(args: &[String]) -> Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(anyhow!("Champ attendu sous la forme champ=valeur : {}", arg)),
        })
        .collect()
}

/// Merge `fields` over `base` and deserialize the result as a form.
fn build_form<F>(base: Option<Value>, fields: &[(String, String)]) -> Result<F>
where
    F: DeserializeOwned + Serialize,
{
    let mut map = match base {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in fields {
        map.insert(key.clone(), field_value(key, value));
    }

    let form: F = serde_json::from_value(Value::Object(map))
        .map_err(|e| anyhow!("Champs invalides : {}", e))?;

    let accepted = serde_json::to_value(&form)?;
    let unknown: BTreeSet<&str> = fields
        .iter()
        .map(|(key, _)| key.as_str())
        .filter(|key| accepted.get(key).is_none())
        .collect();
    if !unknown.is_empty() {
        bail!(
            "Champ inconnu : {}",
            unknown.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(form)
}

fn field_value(key: &str, value: &str) -> Value {
    if REFERENCE_FIELDS.contains(&key) {
        if let Ok(id) = value.trim().parse::<i64>() {
            return Value::from(id);
        }
    }
    Value::String(value.to_string())
}

// ============================================================================
// Navigation
// ============================================================================

/// Tracks the command's "screen"; landing on login prints a hint.
struct CliNavigator {
    route: Mutex<String>,
}

impl CliNavigator {
    fn new(route: &str) -> Self {
        Self {
            route: Mutex::new(route.to_string()),
        }
    }
}

impl Navigator for CliNavigator {
    fn current_route(&self) -> String {
        self.route.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn navigate(&self, route: &str) {
        if let Ok(mut current) = self.route.lock() {
            *current = route.to_string();
        }
        if route == LOGIN_ROUTE {
            eprintln!("Reconnectez-vous avec `courtier login`.");
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

pub async fn execute(command: Command, mut config: Config) -> Result<()> {
    let session = SessionStore::from_config(&config)?;
    let navigator = Arc::new(CliNavigator::new(command.route()));
    let api = ApiClient::new(&config, session)?.with_navigator(navigator);

    match command {
        Command::Help => println!("{}", USAGE),
        Command::Login { username } => login(&api, &mut config, username).await?,
        Command::Logout => {
            AuthService::new(api).logout()?;
            println!("Déconnecté.");
        }
        Command::Status => {
            let state = if api.session().is_authenticated() {
                "connecté"
            } else {
                "non connecté"
            };
            println!("API : {}", api.base_url());
            println!("Session : {}", state);
        }
        Command::Stats => {
            let stats = api.stats().await?;
            println!("Clients    : {}", stats.clients);
            println!("Agences    : {}", stats.agencies);
            println!("Assurances : {}", stats.insurances);
        }
        Command::Resource { resource, action } => match resource {
            ResourceKind::Clients => run_action(api.clients(), action).await?,
            ResourceKind::Agencies => run_action(api.agencies(), action).await?,
            ResourceKind::Insurances => run_action(api.insurances(), action).await?,
        },
    }
    Ok(())
}

async fn login(api: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(username) => username,
        None => prompt("Nom d'utilisateur : ")?,
    };
    let password = rpassword::prompt_password("Mot de passe : ")
        .context("Failed to read password")?;

    AuthService::new(api.clone())
        .login(&username, &password)
        .await?;

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
    println!("Connecté.");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run_action<T>(service: ResourceService<T>, action: ResourceAction) -> Result<()>
where
    T: Resource + TableRow + Serialize,
    T::Form: DeserializeOwned + for<'a> From<&'a T>,
{
    match action {
        ResourceAction::List(query) => {
            let records = service.get_all_with(&query).await?;
            println!("{}", render_table(&records));
        }
        ResourceAction::Show(id) => {
            let record = service.get_by_id(id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        ResourceAction::Create(fields) => {
            let form: T::Form = build_form(None, &fields)?;
            let record = service.create(&form).await?;
            println!("{}", render_table(std::slice::from_ref(&record)));
        }
        ResourceAction::Update(id, fields) => {
            // Start from the current record so only the given fields change
            let current = service.get_by_id(id).await?;
            let base = serde_json::to_value(T::Form::from(&current))?;
            let form: T::Form = build_form(Some(base), &fields)?;
            let record = service.update(id, &form).await?;
            println!("{}", render_table(std::slice::from_ref(&record)));
        }
        ResourceAction::Delete(id) => {
            service.delete(id).await?;
            println!("Supprimé : #{}", id);
        }
    }
    Ok(())
}
