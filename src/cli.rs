//! # CLI
//!
//! Commands:
//! - serve: boot the HTTP server
//! - import: parse a TSV offer file and seed the store before serving a
//!   summary of what was read
//!
//! `main` delegates here; all boot logic lives in this module.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::app::build_app;
use crate::config::AppConfig;
use crate::domain::offer::{City, Convenience, Coordinates, CreateOffer, Offer, PlaceType};
use crate::domain::user::{RegisterUser, User, UserKind};
use crate::pipeline::MountError;
use crate::store::{OfferRepository, StoreError, UserRepository};

/// Lodgely, a rental offers backend
#[derive(Parser, Debug)]
#[command(name = "lodgely")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured bind port
        #[arg(long)]
        port: Option<u16>,
        /// TSV file of offers to seed the store with on boot
        #[arg(long)]
        import: Option<PathBuf>,
    },

    /// Parse a TSV offer file and report what it contains
    Import {
        /// Path to the TSV file
        path: PathBuf,
    },
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("route registry rejected: {0}")]
    Mount(#[from] MountError),
    #[error("store failure during seeding: {0}")]
    Seed(#[from] StoreError),
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

/// Parse arguments and run the selected command to completion.
pub async fn run() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        None => serve(None, None, None).await,
        Some(Command::Serve { host, port, import }) => serve(host, port, import).await,
        Some(Command::Import { path }) => import(&path),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(
    host: Option<String>,
    port: Option<u16>,
    seed: Option<PathBuf>,
) -> CliResult<()> {
    let mut config = AppConfig::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let app = build_app(&config)?;

    if let Some(path) = seed {
        let offers = read_offer_file(&path)?;
        seed_store(&app.store.offers, &app.store.users, offers).await?;
    }

    let addr = config.socket_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(CliError::Serve)?;
    axum::serve(listener, app.router)
        .await
        .map_err(CliError::Serve)
}

fn import(path: &Path) -> CliResult<()> {
    let offers = read_offer_file(path)?;
    for offer in &offers {
        tracing::info!(name = %offer.name, city = ?offer.city, price = offer.price, "parsed offer");
    }
    tracing::info!(count = offers.len(), "import file is well-formed");
    Ok(())
}

/// Insert parsed offers under a single generated author account.
async fn seed_store(
    offers: &Arc<crate::store::memory::MemoryOfferRepository>,
    users: &Arc<crate::store::memory::MemoryUserRepository>,
    parsed: Vec<ParsedOffer>,
) -> Result<(), StoreError> {
    let author = users
        .create(User::new(
            RegisterUser {
                name: "Seeder".to_string(),
                email: "seed@lodgely.local".to_string(),
                avatar_url: None,
                kind: UserKind::Pro,
                password: String::new(),
            },
            String::new(),
        ))
        .await?;

    let count = parsed.len();
    for offer in parsed {
        offers
            .create(Offer::from_create(offer.into_create(author.id)))
            .await?;
    }
    tracing::info!(count, "seeded offers");
    Ok(())
}

/// One TSV line, parsed but not yet bound to an author
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOffer {
    pub name: String,
    pub description: String,
    pub city: City,
    pub preview_image: String,
    pub place_images: Vec<String>,
    pub is_premium: bool,
    pub place_type: PlaceType,
    pub rooms: u8,
    pub guests: u8,
    pub price: u32,
    pub conveniences: Vec<Convenience>,
    pub location: Coordinates,
}

impl ParsedOffer {
    fn into_create(self, author_id: Uuid) -> CreateOffer {
        CreateOffer {
            name: self.name,
            description: self.description,
            city: self.city,
            preview_image: self.preview_image,
            place_images: self.place_images,
            is_premium: self.is_premium,
            place_type: self.place_type,
            rooms: self.rooms,
            guests: self.guests,
            price: self.price,
            conveniences: self.conveniences,
            author_id,
            location: self.location,
        }
    }
}

fn read_offer_file(path: &Path) -> CliResult<Vec<ParsedOffer>> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut offers = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        offers.push(parse_offer_line(line).map_err(|message| CliError::Parse {
            line: index + 1,
            message,
        })?);
    }
    Ok(offers)
}

/// Columns, tab-separated:
/// name, description, city, previewImage, placeImages(;), isPremium,
/// type, rooms, guests, price, conveniences(;), latitude, longitude
pub fn parse_offer_line(line: &str) -> Result<ParsedOffer, String> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != 13 {
        return Err(format!("expected 13 columns, found {}", columns.len()));
    }

    Ok(ParsedOffer {
        name: columns[0].to_string(),
        description: columns[1].to_string(),
        city: named_variant(columns[2], "city")?,
        preview_image: columns[3].to_string(),
        place_images: split_list(columns[4]),
        is_premium: parse_column(columns[5], "isPremium")?,
        place_type: named_variant(columns[6], "type")?,
        rooms: parse_column(columns[7], "rooms")?,
        guests: parse_column(columns[8], "guests")?,
        price: parse_column(columns[9], "price")?,
        conveniences: split_list(columns[10])
            .into_iter()
            .map(|name| named_variant(&name, "conveniences"))
            .collect::<Result<_, _>>()?,
        location: Coordinates {
            latitude: parse_column(columns[11], "latitude")?,
            longitude: parse_column(columns[12], "longitude")?,
        },
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_column<T: std::str::FromStr>(raw: &str, column: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("column {column} has invalid value {raw:?}"))
}

fn named_variant<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|_| format!("column {column} has unknown value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "Canal view loft\tBright loft right on the canal with a wide view.\tAmsterdam\thttps://img.example.com/preview.jpg\ta.jpg;b.jpg;c.jpg;d.jpg;e.jpg;f.jpg\ttrue\tapartment\t3\t4\t12000\tBreakfast;Air conditioning\t52.37\t4.89";

    #[test]
    fn test_parse_offer_line() {
        let offer = parse_offer_line(LINE).unwrap();
        assert_eq!(offer.name, "Canal view loft");
        assert_eq!(offer.city, City::Amsterdam);
        assert_eq!(offer.place_type, PlaceType::Apartment);
        assert_eq!(offer.place_images.len(), 6);
        assert_eq!(
            offer.conveniences,
            vec![Convenience::Breakfast, Convenience::AirConditioning]
        );
        assert_eq!(offer.location.latitude, 52.37);
    }

    #[test]
    fn test_parse_rejects_wrong_column_count() {
        let error = parse_offer_line("just\ttwo").unwrap_err();
        assert!(error.contains("13 columns"));
    }

    #[test]
    fn test_parse_rejects_unknown_city() {
        let line = LINE.replace("Amsterdam", "Atlantis");
        let error = parse_offer_line(&line).unwrap_err();
        assert!(error.contains("city"));
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.tsv");
        std::fs::write(&path, format!("{LINE}\n\n{LINE}\n")).unwrap();
        let offers = read_offer_file(&path).unwrap();
        assert_eq!(offers.len(), 2);
    }
}
