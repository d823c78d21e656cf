//! Innkeep operator CLI
//!
//! Administrative commands for running a venue fleet: schema migration,
//! venue and API key provisioning, tier configuration, promo management,
//! and customer lifecycle operations.

use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jiff::Timestamp;
use smallvec::SmallVec;
use uuid::Uuid;

use innkeep_app::{
    auth::{generate_api_key, hash_api_key},
    context::{AppConfig, AppContext},
    database,
    domain::{
        promos::{
            checks::parse_valid_days,
            data::NewPromo,
            records::{PromoKind, PromoUuid},
        },
        tiers::{data::NewVenueTierConfig, records::StaffRates},
        venues::{data::NewVenue, records::VenueUuid},
    },
};

#[derive(Debug, Parser)]
#[command(name = "innkeep-app", about = "Innkeep operator CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db(DbCommand),

    /// Venue administration
    Venue(VenueCommand),

    /// Tier catalog and per-venue configuration
    Tier(TierCommand),

    /// Customer lifecycle operations
    Customer(CustomerCommand),

    /// Promo management
    Promo(PromoCommand),
}

#[derive(Debug, Args)]
struct DbCommand {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    /// Apply pending schema migrations
    Migrate,
}

#[derive(Debug, Args)]
struct VenueCommand {
    #[command(subcommand)]
    command: VenueSubcommand,
}

#[derive(Debug, Subcommand)]
enum VenueSubcommand {
    Create(CreateVenueArgs),
    Deactivate(VenueRefArgs),
}

#[derive(Debug, Args)]
struct CreateVenueArgs {
    /// Venue display name
    #[arg(long)]
    name: String,
}

#[derive(Debug, Args)]
struct VenueRefArgs {
    /// Venue UUID
    #[arg(long)]
    venue: Uuid,
}

#[derive(Debug, Args)]
struct TierCommand {
    #[command(subcommand)]
    command: TierSubcommand,
}

#[derive(Debug, Subcommand)]
enum TierSubcommand {
    /// Insert the default Member/Loyalty/Regular catalog
    Seed,

    /// Set a venue's threshold and rates for one tier
    Configure(ConfigureTierArgs),

    /// Set a venue's staff discount rates
    StaffRates(StaffRatesArgs),
}

#[derive(Debug, Args)]
struct ConfigureTierArgs {
    #[arg(long)]
    venue: Uuid,

    /// Tier slug (member, loyalty, regular)
    #[arg(long)]
    tier: String,

    /// Visits required inside the rolling window
    #[arg(long)]
    visits: i64,

    /// Rolling window length in days
    #[arg(long, default_value_t = 28)]
    window_days: i32,

    /// Drinks discount percentage
    #[arg(long)]
    wet: f64,

    /// Food discount percentage
    #[arg(long)]
    dry: f64,
}

#[derive(Debug, Args)]
struct StaffRatesArgs {
    #[arg(long)]
    venue: Uuid,

    #[arg(long)]
    wet: f64,

    #[arg(long)]
    dry: f64,
}

#[derive(Debug, Args)]
struct CustomerCommand {
    #[command(subcommand)]
    command: CustomerSubcommand,
}

#[derive(Debug, Subcommand)]
enum CustomerSubcommand {
    /// Soft-delete a customer and deactivate their identifiers
    Deactivate(CustomerRefArgs),
}

#[derive(Debug, Args)]
struct CustomerRefArgs {
    /// Customer UUID
    #[arg(long)]
    customer: Uuid,
}

#[derive(Debug, Args)]
struct PromoCommand {
    #[command(subcommand)]
    command: PromoSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromoSubcommand {
    Create(CreatePromoArgs),

    /// Grant a customer targeted visibility into a promo
    Assign(AssignPromoArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PromoKindArg {
    /// Boosts an existing tier discount
    LoyaltyBonus,

    /// Fixed discount replacing any tier discount
    PromoCode,
}

#[derive(Debug, Args)]
struct CreatePromoArgs {
    #[arg(long)]
    code: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, value_enum)]
    kind: PromoKindArg,

    /// Restrict to one venue; omit for all venues
    #[arg(long)]
    venue: Option<Uuid>,

    /// Drinks discount percentage (promo-code kind)
    #[arg(long)]
    wet: Option<f64>,

    /// Food discount percentage (promo-code kind)
    #[arg(long)]
    dry: Option<f64>,

    /// Discount multiplier (loyalty-bonus kind)
    #[arg(long)]
    multiplier: Option<f64>,

    /// Additive drinks percentage (loyalty-bonus kind, wins over multiplier)
    #[arg(long)]
    add_wet: Option<f64>,

    /// Additive food percentage (loyalty-bonus kind, wins over multiplier)
    #[arg(long)]
    add_dry: Option<f64>,

    /// Minimum spend in minor units
    #[arg(long)]
    min_spend: Option<i64>,

    /// RFC 3339 timestamp
    #[arg(long)]
    valid_from: Option<String>,

    /// RFC 3339 timestamp
    #[arg(long)]
    valid_until: Option<String>,

    /// Wall-clock time, e.g. 11:30:00
    #[arg(long)]
    time_start: Option<String>,

    /// Wall-clock time, e.g. 14:30:00
    #[arg(long)]
    time_end: Option<String>,

    /// Comma-separated short weekday names, e.g. Mon,Tue,Wed
    #[arg(long)]
    valid_days: Option<String>,

    #[arg(long)]
    max_uses: Option<i64>,

    #[arg(long)]
    max_uses_per_customer: Option<i64>,

    #[arg(long)]
    requires_membership: bool,
}

#[derive(Debug, Args)]
struct AssignPromoArgs {
    #[arg(long)]
    customer: Uuid,

    /// Promo code
    #[arg(long)]
    code: String,

    /// RFC 3339 assignment expiry
    #[arg(long)]
    expires_at: Option<String>,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if let Commands::Db(DbCommand {
        command: DbSubcommand::Migrate,
    }) = &cli.command
    {
        return migrate(&cli.database_url).await;
    }

    let app = AppContext::from_database_url(&cli.database_url, AppConfig::default())
        .await
        .map_err(|error| format!("failed to initialize: {error}"))?;

    match cli.command {
        Commands::Db(_) => unreachable!("handled above"),
        Commands::Venue(VenueCommand { command }) => match command {
            VenueSubcommand::Create(args) => create_venue(&app, args).await,
            VenueSubcommand::Deactivate(args) => {
                app.venues
                    .deactivate_venue(VenueUuid::from_uuid(args.venue))
                    .await
                    .map_err(|error| format!("failed to deactivate venue: {error}"))?;

                println!("venue deactivated");

                Ok(())
            }
        },
        Commands::Tier(TierCommand { command }) => match command {
            TierSubcommand::Seed => {
                let inserted = app
                    .tiers
                    .seed_tiers()
                    .await
                    .map_err(|error| format!("failed to seed tiers: {error}"))?;

                println!("tiers inserted: {inserted}");

                Ok(())
            }
            TierSubcommand::Configure(args) => {
                app.tiers
                    .configure_venue_tier(
                        VenueUuid::from_uuid(args.venue),
                        NewVenueTierConfig {
                            tier_slug: args.tier,
                            visits_required: args.visits,
                            window_days: args.window_days,
                            wet_discount: args.wet,
                            dry_discount: args.dry,
                        },
                    )
                    .await
                    .map_err(|error| format!("failed to configure tier: {error}"))?;

                println!("tier configured");

                Ok(())
            }
            TierSubcommand::StaffRates(args) => {
                app.tiers
                    .set_staff_rates(
                        VenueUuid::from_uuid(args.venue),
                        StaffRates {
                            wet_discount: args.wet,
                            dry_discount: args.dry,
                        },
                    )
                    .await
                    .map_err(|error| format!("failed to set staff rates: {error}"))?;

                println!("staff rates set");

                Ok(())
            }
        },
        Commands::Customer(CustomerCommand { command }) => match command {
            CustomerSubcommand::Deactivate(args) => {
                app.customers
                    .deactivate(args.customer.into())
                    .await
                    .map_err(|error| format!("failed to deactivate customer: {error}"))?;

                println!("customer deactivated");

                Ok(())
            }
        },
        Commands::Promo(PromoCommand { command }) => match command {
            PromoSubcommand::Create(args) => create_promo(&app, args).await,
            PromoSubcommand::Assign(args) => {
                let expires_at = parse_timestamp(args.expires_at.as_deref(), "--expires-at")?;

                app.promos
                    .assign_promo(args.customer.into(), &args.code, expires_at)
                    .await
                    .map_err(|error| format!("failed to assign promo: {error}"))?;

                println!("promo assigned");

                Ok(())
            }
        },
    }
}

async fn migrate(database_url: &str) -> Result<(), String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    println!("migrations applied");

    Ok(())
}

async fn create_venue(app: &AppContext, args: CreateVenueArgs) -> Result<(), String> {
    let api_key = generate_api_key();

    let venue = app
        .venues
        .create_venue(NewVenue {
            uuid: VenueUuid::new(),
            name: args.name,
            api_key_hash: hash_api_key(&api_key),
        })
        .await
        .map_err(|error| format!("failed to create venue: {error}"))?;

    println!("venue_uuid: {}", venue.uuid);
    println!("venue_name: {}", venue.name);
    println!("api_key: {api_key}");
    println!("store this key now; it is only shown once");

    Ok(())
}

async fn create_promo(app: &AppContext, args: CreatePromoArgs) -> Result<(), String> {
    let kind = match args.kind {
        PromoKindArg::LoyaltyBonus => PromoKind::LoyaltyBonus {
            multiplier: args.multiplier,
            add_wet: args.add_wet.unwrap_or(0.0),
            add_dry: args.add_dry.unwrap_or(0.0),
        },
        PromoKindArg::PromoCode => PromoKind::PromoCode {
            wet_discount: args.wet.unwrap_or(0.0),
            dry_discount: args.dry.unwrap_or(0.0),
        },
    };

    let valid_days = match args.valid_days.as_deref() {
        Some(raw) => parse_valid_days(raw).map_err(|error| error.to_string())?,
        None => SmallVec::new(),
    };

    let promo = app
        .promos
        .create_promo(NewPromo {
            uuid: PromoUuid::new(),
            code: args.code,
            name: args.name,
            description: args.description,
            kind,
            venue_uuid: args.venue.map(VenueUuid::from_uuid),
            min_spend: args.min_spend,
            valid_from: parse_timestamp(args.valid_from.as_deref(), "--valid-from")?,
            valid_until: parse_timestamp(args.valid_until.as_deref(), "--valid-until")?,
            time_start: parse_time(args.time_start.as_deref(), "--time-start")?,
            time_end: parse_time(args.time_end.as_deref(), "--time-end")?,
            valid_days,
            max_uses: args.max_uses,
            max_uses_per_customer: args.max_uses_per_customer,
            requires_membership: args.requires_membership,
        })
        .await
        .map_err(|error| format!("failed to create promo: {error}"))?;

    println!("promo_uuid: {}", promo.uuid);
    println!("promo_code: {}", promo.code);

    Ok(())
}

fn parse_timestamp(value: Option<&str>, flag: &str) -> Result<Option<Timestamp>, String> {
    value
        .map(|value| {
            value
                .parse::<Timestamp>()
                .map_err(|error| format!("{flag}: {error}"))
        })
        .transpose()
}

fn parse_time(value: Option<&str>, flag: &str) -> Result<Option<jiff::civil::Time>, String> {
    value
        .map(|value| {
            value
                .parse::<jiff::civil::Time>()
                .map_err(|error| format!("{flag}: {error}"))
        })
        .transpose()
}
