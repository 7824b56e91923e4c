//! # Seed Data Generator
//!
//! Populates the database with products and reviews for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default), a handful of reviews each
//! cargo run -p catalog-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p catalog-db --bin seed -- --count 2000
//!
//! # Specify database path (otherwise CATALOG_DATABASE_PATH or ./catalog.db)
//! cargo run -p catalog-db --bin seed -- --db ./data/catalog.db
//! ```
//!
//! ## Generated Data
//! - Products named `{Adjective} {Item}` across a few categories
//! - 0..=4 reviews per product, ratings 1..=5, authors from a fixed list

use std::env;

use catalog_core::{FilterParams, NewProduct, NewReview, SearchTerms};
use catalog_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Product categories with item names for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Coffee",
        &[
            "Espresso Beans",
            "Cold Brew Concentrate",
            "Decaf Roast",
            "Single Origin Beans",
            "Instant Coffee",
            "Coffee Pods",
        ],
    ),
    (
        "Tea",
        &[
            "Green Tea",
            "Earl Grey",
            "Chamomile",
            "Matcha Powder",
            "Oolong",
            "Rooibos",
        ],
    ),
    (
        "Kitchen",
        &[
            "French Press",
            "Pour Over Kettle",
            "Burr Grinder",
            "Milk Frother",
            "Coffee Scale",
            "Paper Filters",
        ],
    ),
    (
        "Tableware",
        &[
            "Ceramic Mug",
            "Travel Tumbler",
            "Glass Teapot",
            "Espresso Cups",
            "Serving Tray",
            "Coasters",
        ],
    ),
];

const ADJECTIVES: &[&str] = &[
    "Classic", "Premium", "Organic", "Compact", "Deluxe", "Everyday", "Artisan", "Bold",
];

const AUTHORS: &[&str] = &[
    "ana", "bo", "cy", "dee", "eli", "fay", "gus", "hana", "ivo", "jun",
];

const REVIEW_TEXTS: &[&str] = &[
    "Exactly what I hoped for, would buy again",
    "Good value but the packaging was damaged",
    "Does the job, nothing special",
    "Stopped working after a month",
    "Great quality and fast delivery",
    "Smaller than expected",
    "My go-to for mornings",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Catalog Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: $CATALOG_DATABASE_PATH or ./catalog.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = DbConfig::from_env()?;
    if let Some(path) = db_path {
        config.database_path = path.into();
    }

    println!("Catalog Seed Data Generator");
    println!("===========================");
    println!("Database: {}", config.database_path.display());
    println!("Products: {}", count);
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let products = db.products();
    let reviews = db.reviews();

    let existing = products.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products and reviews...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut review_count = 0;

    'outer: for adjective in ADJECTIVES {
        for (category, items) in CATEGORIES {
            for item in items.iter() {
                if generated >= count {
                    break 'outer;
                }

                let draft = generate_product(adjective, item, category, generated);
                let product = match products.insert(&draft).await {
                    Ok(product) => product,
                    Err(e) => {
                        eprintln!("Failed to insert {}: {}", draft.name, e);
                        continue;
                    }
                };
                generated += 1;

                for review in generate_reviews(product.id, generated) {
                    match reviews.insert(&review).await {
                        Ok(_) => review_count += 1,
                        Err(e) => eprintln!("Failed to insert review for {}: {}", product.id, e),
                    }
                }

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} products and {} reviews in {:?}",
        generated, review_count, elapsed
    );
    info!(products = generated, reviews = review_count, "Seed finished");

    println!();
    println!("Verifying FTS index...");
    let filters = products.filters(&FilterParams::default())?;

    let (_, meta) = products
        .get_all(&filters, &SearchTerms::new().with("name", "espresso"))
        .await?;
    println!("  Product name 'espresso': {} results", meta.total_records);

    let (_, meta) = products
        .get_all(&filters, &SearchTerms::new().with("category", "kitchen"))
        .await?;
    println!("  Product category 'kitchen': {} results", meta.total_records);

    let filters = reviews.filters(&FilterParams::default())?;
    let (_, meta) = reviews
        .get_all(&filters, &SearchTerms::new().with("review_text", "quality"))
        .await?;
    println!("  Review text 'quality': {} results", meta.total_records);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalog=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Generates a single product with realistic data.
fn generate_product(adjective: &str, item: &str, category: &str, seed: usize) -> NewProduct {
    let name = format!("{} {}", adjective, item);

    NewProduct {
        description: format!("{} from our {} range, batch {:04}", name, category.to_lowercase(), seed),
        image_url: format!("images/{}.png", name.to_lowercase().replace(' ', "-")),
        category: category.to_string(),
        name,
    }
}

/// Generates 0..=4 reviews for a product, deterministic in `seed`.
fn generate_reviews(product_id: i64, seed: usize) -> Vec<NewReview> {
    (0..seed % 5)
        .map(|n| {
            let k = seed * 7 + n * 3;
            NewReview {
                product_id,
                author: AUTHORS[k % AUTHORS.len()].to_string(),
                rating: (k % 5) as i64 + 1,
                review_text: REVIEW_TEXTS[k % REVIEW_TEXTS.len()].to_string(),
            }
        })
        .collect()
}
