//! CLI module for the AutoRentX command-line client.
//!
//! Provides subcommands for the rental backend:
//! - `signup` / `login` / `logout` / `whoami` - account and session
//! - `cars ...` - browse the fleet, and manage it as an admin
//! - `quote` / `book` - price a rental and request it
//! - `bookings ...` - your bookings, or every booking as an admin
//! - `pay` - start paying for a booking
//! - `image-url` / `config check` - helpers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::client::{ApiClient, BookingDraft};
use crate::config::Config;
use crate::images::{self, PLACEHOLDER_AVATAR, PLACEHOLDER_CAR};
use crate::models::{
    status_tone, Booking, BookingAction, Car, CarUpdate, Credentials, NewCar, Registration,
    StatusTone,
};
use crate::quote;
use crate::session::{AuthState, Session};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "autorentx")]
#[command(author, version, about = "Rent cars from the AutoRentX fleet", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "autorentx.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend URL (overrides the config file)
    #[arg(long, env = "AUTORENTX_API_URL")]
    pub api_url: Option<String>,

    /// Session file (overrides the config file)
    #[arg(long, env = "AUTORENTX_SESSION")]
    pub session: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Signup(SignupArgs),

    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AUTORENTX_PASSWORD")]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Fleet commands
    #[command(subcommand)]
    Cars(CarsCommands),

    /// Price a rental without booking it
    Quote {
        /// Daily rate
        #[arg(long)]
        rate: f64,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },

    /// Request a booking for a car
    Book {
        /// Car ID
        car: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Pickup location
        #[arg(long)]
        pickup: String,
        /// Drop location
        #[arg(long)]
        drop: String,
    },

    /// Booking commands
    #[command(subcommand)]
    Bookings(BookingsCommands),

    /// Start paying for a booking and print the payment client secret
    Pay {
        /// Booking ID
        booking: String,
    },

    /// Resolve an image path to an absolute URL
    ImageUrl {
        /// Raw path as stored by the backend
        path: String,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long, env = "AUTORENTX_PASSWORD")]
    pub password: String,
    /// Profile picture to upload
    #[arg(long)]
    pub profile_pic: Option<PathBuf>,
}

/// Cars subcommands
#[derive(Subcommand, Debug)]
pub enum CarsCommands {
    /// List all cars
    List,
    /// Show details for a car
    Show {
        /// Car ID
        id: String,
    },
    /// Add a car to the fleet (admin)
    Create(CreateCarArgs),
    /// Change fields of a car (admin)
    Update(UpdateCarArgs),
    /// Remove a car (admin)
    Delete {
        /// Car ID
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct CreateCarArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub brand: String,
    #[arg(long = "type", default_value = "SUV")]
    pub car_type: String,
    #[arg(long)]
    pub price_per_day: f64,
    #[arg(long, default_value = "Petrol")]
    pub fuel_type: String,
    #[arg(long, default_value = "Manual")]
    pub transmission: String,
    /// List the car as unavailable
    #[arg(long)]
    pub unavailable: bool,
    /// Image file to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct UpdateCarArgs {
    /// Car ID
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long = "type")]
    pub car_type: Option<String>,
    #[arg(long)]
    pub price_per_day: Option<f64>,
    #[arg(long)]
    pub fuel_type: Option<String>,
    #[arg(long)]
    pub transmission: Option<String>,
    #[arg(long)]
    pub available: Option<bool>,
}

/// Bookings subcommands
#[derive(Subcommand, Debug)]
pub enum BookingsCommands {
    /// List your bookings
    Mine,
    /// List every booking (admin)
    All,
    /// Approve a booking (admin)
    Approve {
        /// Booking ID
        id: String,
    },
    /// Mark a booking as cancelled (admin)
    Cancel {
        /// Booking ID
        id: String,
    },
    /// Update a booking with a JSON object of fields
    Update {
        /// Booking ID
        id: String,
        /// Fields to change, e.g. '{"dropLocation":"Airport"}'
        #[arg(long)]
        json: String,
    },
    /// Delete a booking
    Delete {
        /// Booking ID
        id: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Configuration with command-line overrides applied
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(path) = &cli.session {
        config.session.path = path.clone();
    }
    Ok(config)
}

fn create_client(config: &Config) -> Result<ApiClient> {
    let session = Session::open(&config.session.path).with_context(|| {
        format!(
            "Failed to open session file {}",
            config.session.path.display()
        )
    })?;
    ApiClient::new(&config.api, session).context("Failed to create HTTP client")
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Config(ConfigCommands::Check) => return cmd_config_check(cli),
        Commands::Quote { rate, start, end } => return cmd_quote(*rate, start, end),
        Commands::ImageUrl { path } => {
            match images::resolve_image_url(&config.api.base_url, Some(path)) {
                Some(url) => println!("{}", url),
                None => anyhow::bail!("No image path given"),
            }
            return Ok(());
        }
        _ => {}
    }

    let client = create_client(config)?;

    match &cli.command {
        Commands::Signup(args) => cmd_signup(&client, args).await,
        Commands::Login { email, password } => cmd_login(&client, email, password).await,
        Commands::Logout => {
            client.sign_out()?;
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => cmd_whoami(&client),
        Commands::Cars(CarsCommands::List) => cmd_cars_list(&client).await,
        Commands::Cars(CarsCommands::Show { id }) => cmd_cars_show(&client, id).await,
        Commands::Cars(CarsCommands::Create(args)) => cmd_cars_create(&client, args).await,
        Commands::Cars(CarsCommands::Update(args)) => cmd_cars_update(&client, args).await,
        Commands::Cars(CarsCommands::Delete { id }) => {
            client.session().require_admin()?;
            client.delete_car(id).await?;
            println!("[OK] Car {} deleted", id);
            Ok(())
        }
        Commands::Book {
            car,
            start,
            end,
            pickup,
            drop,
        } => {
            let draft = BookingDraft {
                car_id: car.clone(),
                start_date: start.clone(),
                end_date: end.clone(),
                pickup_location: pickup.clone(),
                drop_location: drop.clone(),
            };
            cmd_book(&client, &draft).await
        }
        Commands::Bookings(BookingsCommands::Mine) => {
            let bookings = client.my_bookings().await?;
            if bookings.is_empty() {
                println!("You have no bookings yet.");
                return Ok(());
            }
            print_bookings(&client, &bookings, false);
            Ok(())
        }
        Commands::Bookings(BookingsCommands::All) => {
            client.session().require_admin()?;
            let bookings = client.list_bookings().await?;
            if bookings.is_empty() {
                println!("No bookings found.");
                return Ok(());
            }
            print_bookings(&client, &bookings, true);
            Ok(())
        }
        Commands::Bookings(BookingsCommands::Approve { id }) => {
            cmd_booking_action(&client, id, BookingAction::Approve).await
        }
        Commands::Bookings(BookingsCommands::Cancel { id }) => {
            cmd_booking_action(&client, id, BookingAction::Cancel).await
        }
        Commands::Bookings(BookingsCommands::Update { id, json }) => {
            client.session().require_login()?;
            let body: serde_json::Value =
                serde_json::from_str(json).context("--json must be a JSON object")?;
            if !body.is_object() {
                anyhow::bail!("--json must be a JSON object");
            }
            client.update_booking(id, &body).await?;
            println!("[OK] Booking {} updated", id);
            Ok(())
        }
        Commands::Bookings(BookingsCommands::Delete { id }) => {
            client.session().require_login()?;
            client.delete_booking(id).await?;
            println!("[OK] Booking {} deleted", id);
            Ok(())
        }
        Commands::Pay { booking } => cmd_pay(&client, config, booking).await,
        Commands::Config(_) | Commands::Quote { .. } | Commands::ImageUrl { .. } => Ok(()),
    }
}

async fn cmd_signup(client: &ApiClient, args: &SignupArgs) -> Result<()> {
    let registration = Registration {
        full_name: args.full_name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        password: args.password.clone(),
        profile_pic: args.profile_pic.clone(),
    };

    client.register_user(&registration).await?;

    println!("[OK] Account created for {}", args.email);
    println!();
    println!("Sign in with: autorentx login --email {}", args.email);
    Ok(())
}

async fn cmd_login(client: &ApiClient, email: &str, password: &str) -> Result<()> {
    let credentials = Credentials {
        email: email.to_string(),
        password: password.to_string(),
    };

    let state = client.sign_in(&credentials).await?;
    let name = client
        .session()
        .user()
        .and_then(|u| u.full_name())
        .unwrap_or_else(|| email.to_string());

    println!("[OK] Welcome back, {}", name);
    println!();
    match state {
        AuthState::AuthenticatedAdmin => {
            println!("Admin dashboard:");
            println!("  autorentx cars list | create | update | delete");
            println!("  autorentx bookings all | approve | cancel | delete");
        }
        _ => {
            println!("Dashboard:");
            println!("  autorentx cars list");
            println!("  autorentx book <car-id> --start ... --end ...");
            println!("  autorentx bookings mine");
        }
    }
    println!();
    Ok(())
}

fn cmd_whoami(client: &ApiClient) -> Result<()> {
    let session = client.session();
    let state = session.state();

    if !state.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }

    println!();
    println!("=== Profile ===");
    println!();
    println!("Role:     {}", state);
    if let Some(user) = session.user() {
        println!("Name:     {}", user.full_name().as_deref().unwrap_or("-"));
        println!("Email:    {}", user.email().as_deref().unwrap_or("-"));
        println!("Phone:    {}", user.phone().as_deref().unwrap_or("-"));
        println!("ID:       {}", user.id().as_deref().unwrap_or("-"));
        println!(
            "Picture:  {}",
            images::image_or_placeholder(
                client.base_url(),
                user.profile_pic().as_deref(),
                PLACEHOLDER_AVATAR
            )
        );
    }
    if let Some(checkout) = session.checkout() {
        println!();
        println!(
            "Pending checkout: booking {} for {}",
            checkout.booking_id,
            format_inr(checkout.amount)
        );
    }
    println!();
    Ok(())
}

async fn cmd_cars_list(client: &ApiClient) -> Result<()> {
    let cars = client.list_cars().await?;

    if cars.is_empty() {
        println!("No cars found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<26}  {:<24}  {:<10}  {:<8}  {:<10}  {:>10}  {:<13}",
        "ID", "CAR", "TYPE", "FUEL", "GEARBOX", "PER DAY", "AVAILABILITY"
    );
    println!("{}", "-".repeat(114));

    for car in &cars {
        println!(
            "{:<26}  {:<24}  {:<10}  {:<8}  {:<10}  {:>10}  {:<13}",
            car.id().as_deref().unwrap_or("-"),
            truncate(&car.display_name(), 24),
            truncate(car.car_type().as_deref().unwrap_or("-"), 10),
            truncate(car.fuel_type().as_deref().unwrap_or("-"), 8),
            truncate(car.transmission().as_deref().unwrap_or("-"), 10),
            format_inr(car.price_per_day()),
            availability(car)
        );
    }

    println!();
    Ok(())
}

async fn cmd_cars_show(client: &ApiClient, id: &str) -> Result<()> {
    let car = client.car(id).await?;
    print_car(client, &car);
    Ok(())
}

fn print_car(client: &ApiClient, car: &Car) {
    println!();
    println!("=== {} ===", car.display_name());
    println!();
    println!("ID:           {}", car.id().as_deref().unwrap_or("-"));
    println!("Type:         {}", car.car_type().as_deref().unwrap_or("-"));
    println!("Fuel Type:    {}", car.fuel_type().as_deref().unwrap_or("-"));
    println!("Transmission: {}", car.transmission().as_deref().unwrap_or("-"));
    println!("Price Per Day: {}", format_inr(car.price_per_day()));
    println!("Available:    {}", availability(car));
    println!(
        "Image:        {}",
        images::image_or_placeholder(client.base_url(), car.image().as_deref(), PLACEHOLDER_CAR)
    );
    println!();
}

async fn cmd_cars_create(client: &ApiClient, args: &CreateCarArgs) -> Result<()> {
    client.session().require_admin()?;

    let car = NewCar {
        name: args.name.clone(),
        brand: args.brand.clone(),
        car_type: args.car_type.clone(),
        price_per_day: args.price_per_day,
        fuel_type: args.fuel_type.clone(),
        transmission: args.transmission.clone(),
        available: !args.unavailable,
        image: args.image.clone(),
    };

    client.create_car(&car).await?;
    println!("[OK] Added {} {} to the fleet", car.brand, car.name);
    Ok(())
}

async fn cmd_cars_update(client: &ApiClient, args: &UpdateCarArgs) -> Result<()> {
    client.session().require_admin()?;

    let update = CarUpdate {
        name: args.name.clone(),
        brand: args.brand.clone(),
        car_type: args.car_type.clone(),
        price_per_day: args.price_per_day,
        fuel_type: args.fuel_type.clone(),
        transmission: args.transmission.clone(),
        available: args.available,
    };

    if update.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field, e.g. --price-per-day 2800");
    }

    client.update_car(&args.id, &update).await?;
    println!("[OK] Car {} updated", args.id);
    Ok(())
}

fn cmd_quote(rate: f64, start: &str, end: &str) -> Result<()> {
    let q = quote::quote(rate, start, end);
    if q.is_empty() {
        println!("Estimated rental: choose dates (end must be after start)");
    } else {
        println!("Estimated rental: {}", format_days(q.days));
    }
    println!("Total price:      {}", format_inr(q.total_price));
    Ok(())
}

async fn cmd_book(client: &ApiClient, draft: &BookingDraft) -> Result<()> {
    let receipt = client.book_car(draft).await?;

    println!();
    println!("[OK] Booking request sent! We'll notify you once it's approved.");
    println!();
    println!("Car:      {}", receipt.car.display_name());
    println!(
        "Dates:    {} -> {} ({})",
        receipt.request.start_date,
        receipt.request.end_date,
        format_days(receipt.quote.days)
    );
    println!("Pickup:   {}", receipt.request.pickup_location);
    println!("Drop:     {}", receipt.request.drop_location);
    println!("Total:    {}", format_inr(receipt.quote.total_price));
    println!();
    println!("Use 'autorentx bookings mine' to follow its status.");
    println!();
    Ok(())
}

async fn cmd_booking_action(client: &ApiClient, id: &str, action: BookingAction) -> Result<()> {
    client.session().require_admin()?;
    client.approve_cancel_request(id, action).await?;

    let verb = match action {
        BookingAction::Approve => "approved",
        BookingAction::Cancel => "marked as cancelled",
    };
    println!("[OK] Booking {} {}", id, verb);
    Ok(())
}

async fn cmd_pay(client: &ApiClient, config: &Config, booking_id: &str) -> Result<()> {
    let intent = client
        .start_checkout(booking_id, config.payments.currency_minor_units)
        .await?;

    println!();
    println!("[OK] Payment started for booking {}", intent.booking_id);
    println!();
    println!(
        "Amount:        {} ({} minor units)",
        format_inr(intent.amount as f64 / f64::from(config.payments.currency_minor_units.max(1))),
        intent.amount
    );
    println!("Client secret: {}", intent.client_secret);
    println!();
    println!("Complete the payment in the checkout form using this client secret.");
    println!();
    Ok(())
}

fn print_bookings(client: &ApiClient, bookings: &[Booking], admin: bool) {
    println!();
    for booking in bookings {
        let car = booking.car();
        let car_name = car
            .embedded()
            .map(|c| c.display_name())
            .or_else(|| car.id().map(|id| format!("Car {}", id)))
            .unwrap_or_else(|| "Car".to_string());

        println!(
            "{}  {}",
            booking.id().as_deref().unwrap_or("-"),
            car_name
        );

        if admin {
            println!(
                "  Customer: {} {}",
                booking.user_name().as_deref().unwrap_or("-"),
                booking.user_email().as_deref().unwrap_or("")
            );
        }

        if let Some(details) = car.embedded() {
            println!(
                "  Car:      {} | {}",
                details.fuel_type().as_deref().unwrap_or("-"),
                details.transmission().as_deref().unwrap_or("-")
            );
            println!(
                "  Image:    {}",
                images::image_or_placeholder(
                    client.base_url(),
                    details.image().as_deref(),
                    images::PLACEHOLDER_CAR_SMALL
                )
            );
        }

        println!(
            "  Dates:    {} -> {}",
            booking.start_date().as_deref().map(short_date).unwrap_or("-"),
            booking.end_date().as_deref().map(short_date).unwrap_or("-")
        );
        if let Some(pickup) = booking.pickup_location() {
            println!("  Pickup:   {}", pickup);
        }
        if let Some(drop) = booking.drop_location() {
            println!("  Drop:     {}", drop);
        }
        if let Some(note) = booking.note() {
            println!("  Note:     {}", note);
        }
        println!("  Total:    {}", format_inr(booking.total()));

        let status = booking.booking_status();
        let payment = booking.payment_status();
        println!(
            "  Status:   {} Booking: {}   {} Payment: {}",
            tone_icon(status_tone(&status)),
            status.to_uppercase(),
            tone_icon(status_tone(&payment)),
            payment.to_uppercase()
        );
        println!();
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn availability(car: &Car) -> &'static str {
    if car.is_available() {
        "Available"
    } else {
        "Not Available"
    }
}

fn tone_icon(tone: StatusTone) -> &'static str {
    match tone {
        StatusTone::Settled => "[OK]",
        StatusTone::Pending => "[..]",
        StatusTone::Rejected => "[!!]",
    }
}

/// Date part of an ISO timestamp (`2024-01-03T00:00:00.000Z` -> `2024-01-03`)
fn short_date(raw: &str) -> &str {
    raw.split('T').next().unwrap_or(raw)
}

fn format_days(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

/// Rupee amount with Indian digit grouping (₹1,25,000 or ₹2,499.99)
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if negative && cents > 0 { "-" } else { "" };
    if fraction == 0 {
        format!("{}₹{}", sign, grouped)
    } else {
        format!("{}₹{}.{:02}", sign, grouped, fraction)
    }
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Validate configuration file
fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("The default configuration will be used.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", config.api.base_url);
            println!("  Timeout:      {}s", config.api.timeout_secs);
            println!("  User Agent:   {}", config.api.user_agent);
            println!();
            println!("Session:");
            println!("  File:         {}", config.session.path.display());
            println!();
            println!("Payments:");
            println!(
                "  Minor units:  {} per rupee",
                config.payments.currency_minor_units
            );
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();

            let mut warnings = Vec::new();
            if config.api.base_url.starts_with("http://")
                && !config.api.base_url.contains("localhost")
                && !config.api.base_url.contains("127.0.0.1")
            {
                warnings.push("Base URL is not HTTPS - tokens and passwords travel in plaintext");
            }
            if config.payments.currency_minor_units == 0 {
                warnings.push("payments.currency_minor_units is 0 - every payment amount will be 0");
            }

            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  [!] {}", warning);
                }
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            anyhow::bail!("Invalid configuration file");
        }
    }
}
