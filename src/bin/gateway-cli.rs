use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Exercise the booking gateway's actions from a terminal", long_about = None)]
struct Cli {
    /// Gateway action endpoint.
    #[arg(short, long, default_value = "http://localhost:8080/api")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the gateway is up
    Status,
    /// List a barber's services
    Services {
        #[arg(long)]
        barber: String,
    },
    /// List free slots for a barber on a date
    Slots {
        #[arg(long)]
        barber: String,
        #[arg(long)]
        date: String,
    },
    /// List dates that still have free slots
    Summary {
        #[arg(long)]
        barber: String,
    },
    /// Cancel a booking (prints the rendered page)
    Cancel {
        #[arg(long)]
        booking_id: String,
    },
    /// Create a booking
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        barber: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Status => {
            let root = cli.url.trim_end_matches('/').trim_end_matches("/api");
            client.get(format!("{}/health", root)).send().await?
        }
        Commands::Services { barber } => {
            client
                .get(&cli.url)
                .query(&[("action", "getServices"), ("barber", barber.as_str())])
                .send()
                .await?
        }
        Commands::Slots { barber, date } => {
            client
                .get(&cli.url)
                .query(&[("action", "slots"), ("barber", barber.as_str()), ("date", date.as_str())])
                .send()
                .await?
        }
        Commands::Summary { barber } => {
            client
                .get(&cli.url)
                .query(&[("action", "slotsSummary"), ("barber", barber.as_str())])
                .send()
                .await?
        }
        Commands::Cancel { booking_id } => {
            client
                .get(&cli.url)
                .query(&[("action", "cancel"), ("bookingId", booking_id.as_str())])
                .send()
                .await?
        }
        Commands::Book { name, email, phone, service, barber, date, time } => {
            let booking = json!({
                "name": name,
                "email": email,
                "phone": phone,
                "service": service,
                "barber": barber,
                "dateStr": date,
                "timeStr": time,
            });
            client.post(&cli.url).json(&booking).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
