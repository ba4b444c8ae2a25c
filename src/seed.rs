//! Sample data seeding
//!
//! Generates a realistic client book for development and demos: fifty
//! clients with addresses, risk profiles and preferences, then a second
//! enrichment pass that assigns relationship managers by account tier.

use crate::models::{
    Address, ClientRecord, InvestmentPreferences, RelationshipManager, RiskProfile, RiskTolerance,
};
use crate::store::DocumentStore;
use crate::Result;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use tracing::info;

pub const CLIENT_COUNT: usize = 50;

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Sarah", "David", "Lisa", "Robert", "Emma", "William", "Olivia",
    "James", "Sophia", "Alexander", "Isabella", "Benjamin", "Charlotte", "Daniel", "Amelia",
    "Matthew", "Mia", "Christopher", "Harper", "Andrew", "Evelyn", "Joshua", "Abigail",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
];

const CITIES: &[(&str, &str)] = &[
    ("New York", "NY"),
    ("Los Angeles", "CA"),
    ("Chicago", "IL"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
    ("Philadelphia", "PA"),
    ("San Antonio", "TX"),
    ("San Diego", "CA"),
    ("Dallas", "TX"),
    ("San Jose", "CA"),
    ("Austin", "TX"),
    ("Jacksonville", "FL"),
    ("Fort Worth", "TX"),
    ("Columbus", "OH"),
    ("Charlotte", "NC"),
    ("San Francisco", "CA"),
    ("Indianapolis", "IN"),
    ("Seattle", "WA"),
    ("Denver", "CO"),
    ("Boston", "MA"),
];

const STREET_NAMES: &[&str] = &[
    "Main", "Oak", "Pine", "Elm", "First", "Second", "Park", "Washington",
];
const STREET_SUFFIXES: &[&str] = &["St", "Ave", "Blvd", "Dr", "Ln"];

const SECTORS: &[&str] = &[
    "technology",
    "healthcare",
    "finance",
    "energy",
    "real estate",
    "consumer goods",
    "utilities",
];

const MANAGERS: &[(&str, &str, &str)] = &[
    ("Sarah Johnson", "RM001", "High Net Worth"),
    ("Michael Chen", "RM002", "Corporate Clients"),
    ("Jennifer Davis", "RM003", "Retirement Planning"),
    ("David Rodriguez", "RM004", "Investment Advisory"),
    ("Lisa Thompson", "RM005", "Estate Planning"),
    ("Robert Wilson", "RM006", "Private Banking"),
    ("Emily Martinez", "RM007", "Wealth Management"),
    ("James Anderson", "RM008", "Portfolio Management"),
];

const HIGH_TIER_SPECIALTIES: &[&str] = &["High Net Worth", "Private Banking", "Wealth Management"];
const MID_TIER_SPECIALTIES: &[&str] =
    &["Investment Advisory", "Portfolio Management", "Estate Planning"];
const BASE_TIER_SPECIALTIES: &[&str] = &["Retirement Planning", "Corporate Clients"];

/// Generate one synthetic client record.
fn generate_client(index: usize, rng: &mut impl Rng) -> ClientRecord {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("John");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    let (city, state) = CITIES.choose(rng).copied().unwrap_or(("New York", "NY"));
    let now = Utc::now();

    let tolerance = match rng.gen_range(0..3) {
        0 => RiskTolerance::Low,
        1 => RiskTolerance::Medium,
        _ => RiskTolerance::High,
    };

    let sector_count = rng.gen_range(2..=4);
    let preferred_sectors: Vec<String> = SECTORS
        .choose_multiple(rng, sector_count)
        .map(|s| s.to_string())
        .collect();

    ClientRecord {
        client_id: format!("CLT{}", 1000 + index),
        name: format!("{first} {last}"),
        email: format!("{}.{}@email.com", first.to_lowercase(), last.to_lowercase()),
        phone: format!(
            "+1-{}-{}-{}",
            rng.gen_range(200..=999),
            rng.gen_range(100..=999),
            rng.gen_range(1000..=9999)
        ),
        age: rng.gen_range(25..=75),
        address: Address {
            street: format!(
                "{} {} {}",
                rng.gen_range(100..=9999),
                STREET_NAMES.choose(rng).copied().unwrap_or("Main"),
                STREET_SUFFIXES.choose(rng).copied().unwrap_or("St"),
            ),
            city: city.to_string(),
            state: state.to_string(),
            zip: format!("{}", rng.gen_range(10000..=99999)),
        },
        account_value: rng.gen_range(10_000..=5_000_000) as f64,
        risk_profile: RiskProfile {
            tolerance,
            score: rng.gen_range(1..=10),
            assessment_date: now - Duration::days(rng.gen_range(1..=365)),
        },
        investment_preferences: InvestmentPreferences {
            preferred_sectors,
            esg_focused: rng.gen_bool(0.5),
            international_exposure: rng.gen_bool(0.5),
        },
        created_date: now - Duration::days(rng.gen_range(1..=1000)),
        last_contact: now - Duration::days(rng.gen_range(1..=90)),
        relationship_manager: None,
    }
}

/// Pick a manager for an account value tier.
fn manager_for_tier(account_value: f64, rng: &mut impl Rng) -> RelationshipManager {
    let specialties = if account_value >= 2_000_000.0 {
        HIGH_TIER_SPECIALTIES
    } else if account_value >= 1_000_000.0 {
        MID_TIER_SPECIALTIES
    } else {
        BASE_TIER_SPECIALTIES
    };

    let eligible: Vec<&(&str, &str, &str)> = MANAGERS
        .iter()
        .filter(|(_, _, specialty)| specialties.contains(specialty))
        .collect();
    let (name, employee_id, specialty) = eligible
        .choose(rng)
        .copied()
        .copied()
        .unwrap_or(MANAGERS[0]);

    RelationshipManager {
        name: name.to_string(),
        employee_id: employee_id.to_string(),
        specialty: specialty.to_string(),
        contact_email: format!("{}@wealthmanagement.com", name.to_lowercase().replace(' ', ".")),
        assigned_date: Some(Utc::now()),
    }
}

/// Clear and repopulate the clients collection, then run the manager
/// enrichment pass.
pub async fn seed_clients(store: &dyn DocumentStore) -> Result<usize> {
    let mut rng = rand::thread_rng();

    let cleared = store.clear("clients").await?;
    info!(cleared, "cleared existing client data");

    let clients: Vec<ClientRecord> = (0..CLIENT_COUNT)
        .map(|i| generate_client(i, &mut rng))
        .collect();
    let docs: Vec<serde_json::Value> = clients.iter().map(ClientRecord::to_document).collect();
    let inserted = store.insert_many("clients", &docs).await?;
    info!(inserted, "inserted sample clients");

    let mut assigned = 0usize;
    for client in &clients {
        let manager = manager_for_tier(client.account_value, &mut rng);
        let doc = json!({
            "name": manager.name,
            "employee_id": manager.employee_id,
            "specialty": manager.specialty,
            "contact_email": manager.contact_email,
            "assigned_date": manager.assigned_date,
        });
        if store
            .assign_manager("clients", &client.client_id, &doc)
            .await?
        {
            assigned += 1;
        }
    }
    info!(assigned, "assigned relationship managers");

    Ok(inserted)
}
