//! # Seed Data Generator
//!
//! Creates a demo organization for development: two outlets, a seafood menu
//! with a few continuous-supply items, and an admin login.
//!
//! ## Usage
//! ```bash
//! cargo run -p stockhub-db --bin seed
//!
//! # Custom database and admin password, plus today's stock
//! cargo run -p stockhub-db --bin seed -- --db ./data/stockhub.db --password s3cret-pass --with-stock
//! ```
//!
//! Prints the organization id, which the login endpoint needs.

use anyhow::{bail, Context};
use chrono::Utc;
use std::env;
use stockhub_core::validation::validate_password;
use stockhub_core::{DistributionEntry, MenuItem, Outlet, Role, UserProfile};
use stockhub_db::{hash_password, Database, DbConfig};
use uuid::Uuid;

/// (name, category, unit, price in minor units, requires daily stock)
const MENU: &[(&str, &str, &str, i64, bool)] = &[
    ("Prawn Fry", "Seafood", "plate", 42000, true),
    ("Crab Masala", "Seafood", "plate", 55000, true),
    ("Fish Curry Meals", "Meals", "plate", 18000, true),
    ("Squid Roast", "Seafood", "plate", 38000, true),
    ("Seer Fish Tawa", "Seafood", "piece", 32000, true),
    ("Parotta", "Breads", "pcs", 3000, false),
    ("Steamed Rice", "Meals", "plate", 6000, false),
    ("Lime Soda", "Beverages", "glass", 5000, false),
    ("Chai", "Beverages", "cup", 2000, false),
];

const OUTLETS: &[(&str, &str, i64)] = &[
    ("Beach Road", "Marina, Chennai", 24),
    ("Anna Nagar", "2nd Avenue, Chennai", 16),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockhub_dev.db");
    let mut password = String::from("stockhub-admin");
    let mut with_stock = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-stock" => with_stock = true,
            "--help" | "-h" => {
                println!("StockHub Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./stockhub_dev.db)");
                println!("  -p, --password <PASS>  Admin password (default: stockhub-admin)");
                println!("      --with-stock       Also set today's master stock and distribute it");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => bail!("Unknown argument: {}", other),
        }
        i += 1;
    }

    validate_password(&password).context("Admin password rejected")?;

    println!("StockHub Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("Failed to open database")?;
    println!("✓ Connected, migrations applied");

    let existing = db.organizations().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} organization(s)", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        for org in existing {
            println!("  {} {}", org.id, org.name);
        }
        return Ok(());
    }

    let now = Utc::now();
    let org = db.organizations().create("Harbor Kitchens").await?;
    println!("✓ Organization: {} ({})", org.name, org.id);

    let mut outlets = Vec::new();
    for (name, location, tables) in OUTLETS {
        let outlet = Outlet {
            id: Uuid::new_v4().to_string(),
            organization_id: org.id.clone(),
            name: name.to_string(),
            location: Some(location.to_string()),
            table_count: *tables,
            created_at: now,
        };
        db.outlets().insert(&outlet).await?;
        outlets.push(outlet);
    }
    println!("✓ {} outlets", outlets.len());

    let mut menu = Vec::new();
    for (name, category, unit, price, tracked) in MENU {
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            organization_id: org.id.clone(),
            name: name.to_string(),
            category: category.to_string(),
            unit: unit.to_string(),
            base_price_cents: *price,
            is_market_priced: *category == "Seafood",
            requires_daily_stock: *tracked,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.menu().insert(&item).await?;
        menu.push(item);
    }
    println!("✓ {} menu items", menu.len());

    let admin = UserProfile {
        id: Uuid::new_v4().to_string(),
        organization_id: org.id.clone(),
        full_name: "Demo Admin".to_string(),
        role: Role::Admin,
        outlet_id: None,
        username: Some("admin".to_string()),
        password_hash: Some(hash_password(&password)?),
        created_at: now,
    };
    db.profiles().insert(&admin).await?;

    for (idx, outlet) in outlets.iter().enumerate() {
        let staff = UserProfile {
            id: Uuid::new_v4().to_string(),
            organization_id: org.id.clone(),
            full_name: format!("{} Cashier", outlet.name),
            role: Role::Staff,
            outlet_id: Some(outlet.id.clone()),
            username: Some(format!("cashier{}", idx + 1)),
            password_hash: Some(hash_password(&password)?),
            created_at: now,
        };
        db.profiles().insert(&staff).await?;
    }
    println!("✓ Logins: admin, cashier1, cashier2 (all share the given password)");

    if with_stock {
        let today = now.date_naive();
        for item in menu.iter().filter(|m| m.requires_daily_stock) {
            db.master_stock()
                .upsert(&org.id, &item.id, today, 100, None)
                .await?;
            for outlet in &outlets {
                db.distributions()
                    .append(&DistributionEntry::new(
                        &org.id, &outlet.id, &item.id, today, 30, &admin.id, now,
                    ))
                    .await?;
            }
        }
        println!("✓ Master stock 100 per tracked item for {}, 30 to each outlet", today);
    }

    println!();
    println!("✓ Seed complete! Organization id: {}", org.id);

    db.close().await;
    Ok(())
}
